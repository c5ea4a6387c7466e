//! Great-circle distance between coordinates.
//!
//! Distances are computed with the haversine formula on a spherical Earth,
//! rounded to whole meters and reported in kilometers.
//!
//! # Example
//!
//! ```
//! use schools::{distance_km, Coordinate};
//!
//! let origin = Coordinate::new(0.0, 0.0);
//! let east = Coordinate::new(0.0, 1.0);
//!
//! let km = distance_km(origin, east);
//! assert!((km - 111.19).abs() < 0.5);
//! assert_eq!(distance_km(origin, origin), 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A point on the Earth's surface in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without validation.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting values outside the physical ranges.
    ///
    /// Latitude is checked before longitude.
    ///
    /// # Examples
    ///
    /// ```
    /// use schools::{Coordinate, ValidationError};
    ///
    /// assert!(Coordinate::validated(35.5, 138.7).is_ok());
    /// assert_eq!(
    ///     Coordinate::validated(95.0, 0.0),
    ///     Err(ValidationError::LatitudeOutOfRange { lat: 95.0 })
    /// );
    /// ```
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange { lat: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange { lon: longitude });
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Parse a query point from raw query-string values.
    ///
    /// Missing or empty values are reported before unparseable ones, and
    /// unparseable ones before range violations.
    pub fn from_query(
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let (lat, lon) = match (non_empty(latitude), non_empty(longitude)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(ValidationError::MissingCoordinates),
        };

        let lat = parse_number(lat).ok_or(ValidationError::InvalidCoordinates)?;
        let lon = parse_number(lon).ok_or(ValidationError::InvalidCoordinates)?;

        Self::validated(lat, lon)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Parse a decimal number, treating NaN as unparseable.
///
/// The whole value must be numeric: `12abc` is rejected rather than read as
/// 12. `inf` parses and is then reported by the range check.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Great-circle distance between two coordinates in meters, rounded to the
/// nearest meter.
///
/// Inputs are not validated.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let half_dlat = (b.latitude - a.latitude).to_radians() / 2.0;
    let half_dlon = (b.longitude - a.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    (EARTH_RADIUS_METERS * central_angle).round()
}

/// Great-circle distance between two coordinates in kilometers.
///
/// Computed at meter precision, so results are multiples of 0.001 km.
/// Symmetric, and zero for identical points.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_meters(a, b) / 1000.0
}
