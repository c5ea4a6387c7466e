//! GeoJSON export of school listings.
//!
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use schools::geojson::ranked_to_feature_collection;
//!
//! let ranked = service.list_by_distance(Coordinate::new(40.0, -75.0)).await?;
//! let collection = ranked_to_feature_collection(&ranked);
//! println!("{}", collection);
//! ```

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::school::{RankedSchool, School};

/// Convert a school into a Point feature.
///
/// Coordinates follow GeoJSON order `[longitude, latitude]`. Properties hold
/// `name`, `address` and, when given, `distance_km`.
pub fn school_feature(school: &School, distance_km: Option<f64>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(school.name.as_str()));
    properties.insert(
        "address".to_string(),
        JsonValue::from(school.address.as_str()),
    );
    if let Some(distance) = distance_km {
        properties.insert("distance_km".to_string(), JsonValue::from(distance));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            school.longitude,
            school.latitude,
        ]))),
        id: Some(Id::String(school.id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Convert schools into a feature collection, preserving order.
pub fn schools_to_feature_collection(schools: &[School]) -> FeatureCollection {
    collection(schools.iter().map(|s| school_feature(s, None)))
}

/// Convert ranked schools into a feature collection, nearest first.
pub fn ranked_to_feature_collection(ranked: &[RankedSchool]) -> FeatureCollection {
    collection(
        ranked
            .iter()
            .map(|r| school_feature(&r.school, Some(r.distance))),
    )
}

fn collection(features: impl Iterator<Item = Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.collect(),
        foreign_members: None,
    }
}
