//! Schools Service - HTTP microservice for school registration.
//!
//! Registers schools and lists them ranked by great-circle distance.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SCHOOLS_DATABASE_URL` | SQLite URL (e.g. `sqlite://schools.db`) or `memory` | `sqlite://schools.db` |
//! | `SCHOOLS_MAX_CONNECTIONS` | Connection pool size | 5 |
//! | `SCHOOLS_STRICT_COORDINATES` | Range-check coordinates on `/addSchool` | false |
//! | `SCHOOLS_PORT` | HTTP server port | 3000 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `POST /addSchool` - Register a school
//! - `GET /listSchools?latitude=X&longitude=Y` - Schools ranked by distance
//! - `GET /schools` - Schools ordered by name
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use schools::SchoolServiceBuilder;
use schools_service::{router, AppState};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DATABASE_URL: &str = "sqlite://schools.db";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schools_service=info,schools=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("SCHOOLS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    // The library handles SCHOOLS_DATABASE_URL, SCHOOLS_MAX_CONNECTIONS and
    // SCHOOLS_STRICT_COORDINATES
    if std::env::var_os("SCHOOLS_DATABASE_URL").is_none() {
        tracing::warn!(
            database_url = DEFAULT_DATABASE_URL,
            "SCHOOLS_DATABASE_URL not set, using default database"
        );
    }
    let builder = SchoolServiceBuilder::from_env_or(DEFAULT_DATABASE_URL);
    let database_url = builder.url().to_string();
    let school_service = builder.build().await?;

    tracing::info!(
        database_url = %database_url,
        strict_coordinates = school_service.strict_coordinates(),
        port = port,
        "Starting schools service"
    );

    let state = Arc::new(AppState { school_service });

    let app = router(state.clone()).layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.school_service.close().await;
    tracing::info!("Store closed, shutting down");

    Ok(())
}

/// Resolve when Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
