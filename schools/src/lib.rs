//! # Schools - Distance-Ranked School Registry
//!
//! Library for registering schools and listing them by great-circle distance
//! from a query point.
//!
//! ## Features
//!
//! - **Haversine distance**: meter-precision great-circle distance in kilometers
//! - **Stable ranking**: schools at equal distance keep their stored order
//! - **Pluggable storage**: SQLite via sqlx, or an in-memory store for tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use schools::{Coordinate, NewSchool, SchoolServiceBuilder};
//!
//! let service = SchoolServiceBuilder::new("sqlite://schools.db").build().await?;
//!
//! let id = service
//!     .create(NewSchool::new("Oak Elementary", "1 Oak St", 40.0, -75.0))
//!     .await?;
//!
//! let nearby = service.list_by_distance(Coordinate::new(40.1, -75.1)).await?;
//! for ranked in &nearby {
//!     println!("{} ({:.3} km)", ranked.school.name, ranked.distance);
//! }
//! ```

pub mod distance;
pub mod error;
pub mod school;
pub mod service;
pub mod store;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use distance::{distance_km, haversine_meters, Coordinate, EARTH_RADIUS_METERS};
pub use error::{Result, SchoolError, ValidationError};
pub use school::{rank_by_distance, NewSchool, RankedSchool, School};
pub use service::{SchoolService, SchoolServiceBuilder, MEMORY_DATABASE_URL};
pub use store::{MemorySchoolStore, SchoolStore, SqliteSchoolStore};
