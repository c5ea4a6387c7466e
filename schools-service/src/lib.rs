//! Schools Service Library
//!
//! HTTP handlers, routing and OpenAPI documentation for the school service.
//! This library is used by both the schools-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use schools::SchoolService;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// Service for registering and listing schools.
    pub school_service: SchoolService,
}

/// OpenAPI documentation for the schools service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Management Service",
        version = "0.1.0",
        description = "Register schools and list them by distance from a point.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::add_school,
        handlers::list_schools,
        handlers::list_all_schools,
        handlers::welcome,
        handlers::health_check,
    ),
    components(
        schemas(
            handlers::AddSchoolRequest,
            handlers::AddSchoolResponse,
            handlers::SchoolEntry,
            handlers::ListSchoolsResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "schools", description = "School registration and listing"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the application router.
///
/// Middleware layers are left to the caller.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::welcome))
        .route("/addSchool", post(handlers::add_school))
        .route("/listSchools", get(handlers::list_schools))
        .route("/schools", get(handlers::list_all_schools))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    AddSchoolRequest, AddSchoolResponse, ErrorResponse, HealthResponse, ListSchoolsResponse,
    SchoolEntry,
};
