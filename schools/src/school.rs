//! School records and distance ranking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::distance::{distance_km, Coordinate};
use crate::error::ValidationError;

/// A registered school.
///
/// The `id` is assigned once at creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl School {
    /// Location of this school.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Input for registering a school. The id is never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewSchool {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    /// Validate and normalize the input.
    ///
    /// Name and address are trimmed and must be non-empty; coordinates must be
    /// finite. With `strict` set, coordinates must also lie within ±90/±180.
    ///
    /// # Examples
    ///
    /// ```
    /// use schools::NewSchool;
    ///
    /// let school = NewSchool::new("  Oak Elementary ", "1 Oak St", 40.0, -75.0)
    ///     .validate(false)
    ///     .unwrap();
    /// assert_eq!(school.name, "Oak Elementary");
    ///
    /// // Out-of-range coordinates are only rejected in strict mode
    /// assert!(NewSchool::new("A", "B", 999.0, 0.0).validate(false).is_ok());
    /// assert!(NewSchool::new("A", "B", 999.0, 0.0).validate(true).is_err());
    /// ```
    pub fn validate(self, strict: bool) -> Result<Self, ValidationError> {
        let name = self.name.trim();
        let address = self.address.trim();

        if name.is_empty()
            || address.is_empty()
            || !self.latitude.is_finite()
            || !self.longitude.is_finite()
        {
            return Err(ValidationError::InvalidInput);
        }

        if strict {
            Coordinate::validated(self.latitude, self.longitude)?;
        }

        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }

    /// Attach an identifier, producing the record to persist.
    pub(crate) fn into_school(self, id: Uuid) -> School {
        School {
            id,
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A school annotated with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSchool {
    #[serde(flatten)]
    pub school: School,
    /// Distance from the query point in kilometers.
    pub distance: f64,
}

/// Annotate each school with its distance from `source` and sort ascending.
///
/// The sort is stable: schools at equal distance keep their input order.
pub fn rank_by_distance(schools: Vec<School>, source: Coordinate) -> Vec<RankedSchool> {
    let mut ranked: Vec<RankedSchool> = schools
        .into_iter()
        .map(|school| {
            let distance = distance_km(source, school.coordinate());
            RankedSchool { school, distance }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}
