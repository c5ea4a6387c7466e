//! HTTP request handlers for the school service.

use axum::{
    extract::{rejection::QueryRejection, FromRequest, Query, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use schools::{Coordinate, NewSchool, RankedSchool, School, SchoolError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::AppState;

/// Plain-text body served at `/`.
pub const WELCOME_MESSAGE: &str = "Welcome to School Management System :)";

/// Request body for registering a school.
///
/// Fields are loosely typed so that wrong types produce a 400 with a JSON
/// error body instead of an extractor rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddSchoolRequest {
    /// School name (non-empty after trimming).
    #[schema(value_type = String)]
    pub name: Option<Value>,
    /// Street address (non-empty after trimming).
    #[schema(value_type = String)]
    pub address: Option<Value>,
    /// Latitude in decimal degrees, as a number or numeric string.
    #[schema(value_type = f64)]
    pub latitude: Option<Value>,
    /// Longitude in decimal degrees, as a number or numeric string.
    #[schema(value_type = f64)]
    pub longitude: Option<Value>,
}

impl AddSchoolRequest {
    /// Check presence and types, producing the service input.
    ///
    /// Absent and null fields are rejected like any other unusable value.
    /// Range checks are left to the service.
    pub fn into_new_school(self) -> Result<NewSchool, ValidationError> {
        let text = |value: &Option<Value>| {
            value
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(ValidationError::InvalidInput)
        };
        let number = |value: &Option<Value>| {
            value
                .as_ref()
                .and_then(coordinate_value)
                .ok_or(ValidationError::InvalidInput)
        };

        Ok(NewSchool::new(
            text(&self.name)?,
            text(&self.address)?,
            number(&self.latitude)?,
            number(&self.longitude)?,
        ))
    }
}

/// Form-encoded variant of [`AddSchoolRequest`]. Every value arrives as text.
#[derive(Debug, Deserialize)]
pub struct AddSchoolForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl From<AddSchoolForm> for AddSchoolRequest {
    fn from(form: AddSchoolForm) -> Self {
        Self {
            name: form.name.map(Value::String),
            address: form.address.map(Value::String),
            latitude: form.latitude.map(Value::String),
            longitude: form.longitude.map(Value::String),
        }
    }
}

/// Read an /addSchool body as a form when the content type says so,
/// otherwise as JSON.
async fn read_add_school(request: Request) -> Result<AddSchoolRequest, ValidationError> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(form) = Form::<AddSchoolForm>::from_request(request, &())
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected addSchool form");
                ValidationError::InvalidInput
            })?;
        Ok(form.into())
    } else {
        let Json(body) = Json::<AddSchoolRequest>::from_request(request, &())
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected addSchool body");
                ValidationError::InvalidInput
            })?;
        Ok(body)
    }
}

/// Accept a JSON number or a string holding a finite number.
fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Successful registration response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddSchoolResponse {
    /// Always `true`.
    pub success: bool,
    /// Generated identifier of the new school.
    #[serde(rename = "schoolId")]
    pub school_id: Uuid,
}

/// Query parameters for the distance-ranked listing.
///
/// Kept as raw strings so that missing and malformed values can be told apart.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSchoolsQuery {
    /// Latitude of the query point (-90 to 90).
    #[param(value_type = f64, required = true)]
    pub latitude: Option<String>,
    /// Longitude of the query point (-180 to 180).
    #[param(value_type = f64, required = true)]
    pub longitude: Option<String>,
}

/// A school in a listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolEntry {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance from the query point in kilometers, for ranked listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl From<School> for SchoolEntry {
    fn from(school: School) -> Self {
        Self {
            id: school.id,
            name: school.name,
            address: school.address,
            latitude: school.latitude,
            longitude: school.longitude,
            distance: None,
        }
    }
}

impl From<RankedSchool> for SchoolEntry {
    fn from(ranked: RankedSchool) -> Self {
        Self {
            distance: Some(ranked.distance),
            ..Self::from(ranked.school)
        }
    }
}

/// Successful listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListSchoolsResponse {
    /// Always `true`.
    pub success: bool,
    pub schools: Vec<SchoolEntry>,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Register a new school.
///
/// Accepts a JSON body, or a form-encoded body with the same fields.
///
/// # Returns
///
/// - `200 OK` with the generated `schoolId`
/// - `400 Bad Request` if a field is missing or invalid
/// - `500 Internal Server Error` if the school could not be stored
#[utoipa::path(
    post,
    path = "/addSchool",
    tag = "schools",
    request_body = AddSchoolRequest,
    responses(
        (status = 200, description = "School registered", body = AddSchoolResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn add_school(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> impl IntoResponse {
    let input = match read_add_school(request)
        .await
        .and_then(AddSchoolRequest::into_new_school)
    {
        Ok(input) => input,
        Err(e) => return error_response(e.into()),
    };

    match state.school_service.create(input).await {
        Ok(school_id) => (
            StatusCode::OK,
            Json(AddSchoolResponse {
                success: true,
                school_id,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// List all schools ranked by distance from the query point, nearest first.
///
/// # Query Parameters
///
/// - `latitude`: Latitude in decimal degrees (-90 to 90)
/// - `longitude`: Longitude in decimal degrees (-180 to 180)
///
/// # Returns
///
/// - `200 OK` with every school annotated with `distance` in kilometers
/// - `400 Bad Request` if coordinates are missing, malformed or out of range
/// - `500 Internal Server Error` if the store could not be read
#[utoipa::path(
    get,
    path = "/listSchools",
    tag = "schools",
    params(ListSchoolsQuery),
    responses(
        (status = 200, description = "Schools ranked by distance", body = ListSchoolsResponse),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_schools(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListSchoolsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Ok(Query(query)) = query else {
        return error_response(ValidationError::InvalidCoordinates.into());
    };

    let latitude = query.latitude.as_deref();
    let longitude = query.longitude.as_deref();
    let source = match Coordinate::from_query(latitude, longitude) {
        Ok(source) => source,
        Err(e) => return error_response(e.into()),
    };

    tracing::debug!(
        latitude = source.latitude,
        longitude = source.longitude,
        "List schools by distance"
    );

    match state.school_service.list_by_distance(source).await {
        Ok(ranked) => list_response(ranked),
        Err(e) => error_response(e),
    }
}

/// List all schools ordered by name.
#[utoipa::path(
    get,
    path = "/schools",
    tag = "schools",
    responses(
        (status = 200, description = "Schools ordered by name", body = ListSchoolsResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_all_schools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.school_service.list_all().await {
        Ok(schools) => list_response(schools),
        Err(e) => error_response(e),
    }
}

fn list_response<T: Into<SchoolEntry>>(schools: Vec<T>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(ListSchoolsResponse {
            success: true,
            schools: schools.into_iter().map(Into::into).collect(),
        }),
    )
        .into_response()
}

/// Map a service error onto a JSON error response.
///
/// Validation failures are client errors and are not logged as faults.
fn error_response(e: SchoolError) -> axum::response::Response {
    let status = if e.is_client_error() {
        tracing::debug!(error = %e, "Rejected request");
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %e, "Request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Welcome message.
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses((status = 200, description = "Welcome message", body = String, content_type = "text/plain"))
)]
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> AddSchoolRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_add_request_numbers_and_strings() {
        let input = request(
            r#"{"name": " Oak ", "address": "1 Oak St", "latitude": 40, "longitude": "-75.5"}"#,
        )
        .into_new_school()
        .unwrap();
        assert_eq!(input.name, " Oak ");
        assert_eq!(input.latitude, 40.0);
        assert_eq!(input.longitude, -75.5);
    }

    #[test]
    fn test_add_request_missing_fields_are_invalid_input() {
        for json in [
            r#"{"address": "1 Oak St", "latitude": 1, "longitude": 1}"#,
            r#"{"name": "Oak", "address": "1 Oak St", "latitude": 40}"#,
            r#"{"name": null, "address": "1 Oak St", "latitude": 40, "longitude": 1}"#,
            r#"{"name": "Oak", "address": "1 Oak St", "latitude": null, "longitude": 1}"#,
            r#"{}"#,
        ] {
            assert_eq!(
                request(json).into_new_school().unwrap_err(),
                ValidationError::InvalidInput,
                "{json}"
            );
        }
    }

    #[test]
    fn test_add_request_zero_coordinates() {
        let input = request(
            r#"{"name": "Oak", "address": "1 Oak St", "latitude": 0, "longitude": "0"}"#,
        )
        .into_new_school()
        .unwrap();
        assert_eq!(input.latitude, 0.0);
        assert_eq!(input.longitude, 0.0);
    }

    #[test]
    fn test_add_form_converts_to_strings() {
        let form = AddSchoolForm {
            name: Some("Oak".to_string()),
            address: Some("1 Oak St".to_string()),
            latitude: Some("40.5".to_string()),
            longitude: None,
        };
        let request = AddSchoolRequest::from(form);
        assert_eq!(request.latitude, Some(Value::String("40.5".to_string())));
        assert_eq!(
            request.into_new_school().unwrap_err(),
            ValidationError::InvalidInput
        );
    }

    #[test]
    fn test_add_request_wrong_types() {
        for json in [
            r#"{"name": 5, "address": "1 Oak St", "latitude": 40, "longitude": 1}"#,
            r#"{"name": "Oak", "address": ["x"], "latitude": 40, "longitude": 1}"#,
            r#"{"name": "Oak", "address": "1 Oak St", "latitude": "north", "longitude": 1}"#,
            r#"{"name": "Oak", "address": "1 Oak St", "latitude": 40, "longitude": true}"#,
            r#"{"name": "Oak", "address": "1 Oak St", "latitude": "inf", "longitude": 1}"#,
        ] {
            assert_eq!(
                request(json).into_new_school().unwrap_err(),
                ValidationError::InvalidInput,
                "{json}"
            );
        }
    }

    #[test]
    fn test_add_response_serialize() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(AddSchoolResponse {
            success: true,
            school_id: id,
        })
        .unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["schoolId"], id.to_string());
    }

    #[test]
    fn test_school_entry_distance_omitted_when_unranked() {
        let school = School {
            id: Uuid::new_v4(),
            name: "Oak".to_string(),
            address: "1 Oak St".to_string(),
            latitude: 40.0,
            longitude: -75.0,
        };

        let json = serde_json::to_value(SchoolEntry::from(school.clone())).unwrap();
        assert!(json.get("distance").is_none());

        let json = serde_json::to_value(SchoolEntry::from(RankedSchool {
            school,
            distance: 2.5,
        }))
        .unwrap();
        assert_eq!(json["distance"], 2.5);
        assert_eq!(json["name"], "Oak");
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
