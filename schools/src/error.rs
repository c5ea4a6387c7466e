//! Error types for the schools library.

use thiserror::Error;

/// Rejected client input.
///
/// The display strings are the messages returned to API clients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A field is missing, name or address is empty after trimming, or a
    /// coordinate is not a finite number.
    #[error("Invalid input data")]
    InvalidInput,

    /// Query point latitude or longitude was not supplied.
    #[error("Latitude and longitude parameters are required")]
    MissingCoordinates,

    /// Query point latitude or longitude did not parse as a number.
    #[error("Invalid latitude or longitude")]
    InvalidCoordinates,

    /// Latitude outside [-90, 90].
    #[error("Latitude must be between -90 and 90 degrees")]
    LatitudeOutOfRange { lat: f64 },

    /// Longitude outside [-180, 180].
    #[error("Longitude must be between -180 and 180 degrees")]
    LongitudeOutOfRange { lon: f64 },
}

/// Errors that can occur when registering or listing schools.
#[derive(Error, Debug)]
pub enum SchoolError {
    /// Malformed, missing or out-of-range input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record store failed. Never retried.
    #[error("{0}")]
    Storage(#[from] sqlx::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SchoolError {
    /// Whether this error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SchoolError::Validation(_))
    }
}

/// Result type alias using [`SchoolError`].
pub type Result<T> = std::result::Result<T, SchoolError>;
