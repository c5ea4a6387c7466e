//! School registration and distance-ranked listing.
//!
//! This module provides [`SchoolService`], the entry point used by the HTTP
//! service and the CLI, and [`SchoolServiceBuilder`] for configuring it.
//!
//! Each operation is a single store call followed by an in-process
//! transform. No state is kept between calls.
//!
//! ```ignore
//! use schools::{Coordinate, NewSchool, SchoolServiceBuilder};
//!
//! let service = SchoolServiceBuilder::from_env()?.build().await?;
//!
//! let id = service
//!     .create(NewSchool::new("Oak Elementary", "1 Oak St", 40.0, -75.0))
//!     .await?;
//! let ranked = service.list_by_distance(Coordinate::new(40.0, -75.0)).await?;
//! ```

use std::sync::Arc;

use uuid::Uuid;

use crate::distance::Coordinate;
use crate::error::{Result, SchoolError};
use crate::school::{rank_by_distance, NewSchool, RankedSchool, School};
use crate::store::{MemorySchoolStore, SchoolStore, SqliteSchoolStore};

/// Database URL selecting the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Registers schools and lists them, optionally ranked by distance.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use schools::{MemorySchoolStore, SchoolService};
///
/// let service = SchoolService::new(Arc::new(MemorySchoolStore::new()));
/// assert!(service.list_all().await?.is_empty());
/// ```
pub struct SchoolService {
    store: Arc<dyn SchoolStore>,
    /// Apply the ±90/±180 range check when creating schools.
    strict_coordinates: bool,
}

impl SchoolService {
    /// Create a service over `store` with lenient creation checks.
    pub fn new(store: Arc<dyn SchoolStore>) -> Self {
        Self {
            store,
            strict_coordinates: false,
        }
    }

    /// Whether creation rejects out-of-range coordinates.
    pub fn strict_coordinates(&self) -> bool {
        self.strict_coordinates
    }

    /// Validate and persist a new school, returning its generated id.
    ///
    /// # Errors
    ///
    /// - [`SchoolError::Validation`] if name or address is blank, a coordinate
    ///   is not finite, or (in strict mode) a coordinate is out of range
    /// - [`SchoolError::Storage`] if the insert fails; nothing is persisted
    pub async fn create(&self, input: NewSchool) -> Result<Uuid> {
        let input = input.validate(self.strict_coordinates)?;
        let school = input.into_school(Uuid::new_v4());

        if let Err(e) = self.store.insert(&school).await {
            tracing::warn!(error = %e, name = %school.name, "Failed to insert school");
            return Err(e);
        }

        tracing::info!(
            id = %school.id,
            name = %school.name,
            latitude = school.latitude,
            longitude = school.longitude,
            "School created"
        );

        Ok(school.id)
    }

    /// All schools ordered by name.
    pub async fn list_all(&self) -> Result<Vec<School>> {
        let schools = self
            .store
            .select_all_ordered_by_name()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to list schools"))?;

        tracing::debug!(count = schools.len(), "Listed schools by name");
        Ok(schools)
    }

    /// All schools annotated with their distance from `source`, nearest first.
    ///
    /// Schools at equal distance keep the order the store returned them in.
    /// An empty store yields an empty list.
    pub async fn list_by_distance(&self, source: Coordinate) -> Result<Vec<RankedSchool>> {
        let schools = self
            .store
            .select_all()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to list schools"))?;

        let ranked = rank_by_distance(schools, source);

        tracing::debug!(
            latitude = source.latitude,
            longitude = source.longitude,
            count = ranked.len(),
            "Ranked schools by distance"
        );
        Ok(ranked)
    }

    /// Release the store's resources.
    pub async fn close(&self) {
        self.store.close().await;
    }
}

/// Builder for [`SchoolService`].
///
/// # Example
///
/// ```ignore
/// use schools::SchoolServiceBuilder;
///
/// let service = SchoolServiceBuilder::new("sqlite://schools.db")
///     .max_connections(10)
///     .strict_coordinates(true)
///     .build()
///     .await?;
/// ```
pub struct SchoolServiceBuilder {
    database_url: String,
    max_connections: u32,
    strict_coordinates: bool,
    store: Option<Arc<dyn SchoolStore>>,
}

impl SchoolServiceBuilder {
    /// Create a new builder for the given database URL.
    ///
    /// Use [`MEMORY_DATABASE_URL`] for a non-persistent store.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            strict_coordinates: false,
            store: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SCHOOLS_DATABASE_URL` | SQLite URL, or `memory` | Required |
    /// | `SCHOOLS_MAX_CONNECTIONS` | Connection pool size | 5 |
    /// | `SCHOOLS_STRICT_COORDINATES` | Range-check coordinates on creation | false |
    ///
    /// # Errors
    ///
    /// Returns an error if `SCHOOLS_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var, None)
    }

    /// Like [`from_env`](Self::from_env), but uses `default_url` when
    /// `SCHOOLS_DATABASE_URL` is not set. The other variables are still read.
    pub fn from_env_or(default_url: &str) -> Self {
        Self::from_lookup(env_var, Some(default_url))
            .unwrap_or_else(|_| Self::new(default_url))
    }

    /// Build from a variable lookup, falling back to `default_url` for a
    /// missing database URL.
    fn from_lookup<F>(lookup: F, default_url: Option<&str>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("SCHOOLS_DATABASE_URL")
            .or_else(|| default_url.map(str::to_string))
            .ok_or_else(|| {
                SchoolError::Config(
                    "SCHOOLS_DATABASE_URL environment variable not set".to_string(),
                )
            })?;

        let max_connections: u32 = lookup("SCHOOLS_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let strict_coordinates = lookup("SCHOOLS_STRICT_COORDINATES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self::new(database_url)
            .max_connections(max_connections)
            .strict_coordinates(strict_coordinates))
    }

    /// Set the maximum number of pooled connections.
    ///
    /// Default is 5. Ignored for the in-memory store.
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Reject out-of-range coordinates when creating schools.
    ///
    /// Off by default, in which case creation only checks that coordinates
    /// are finite.
    pub fn strict_coordinates(mut self, strict: bool) -> Self {
        self.strict_coordinates = strict;
        self
    }

    /// Use an already constructed store instead of connecting to the URL.
    pub fn store(mut self, store: Arc<dyn SchoolStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The configured database URL.
    pub fn url(&self) -> &str {
        &self.database_url
    }

    /// Build the [`SchoolService`], connecting to the store if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SchoolError::Storage`] if the database cannot be opened or
    /// its schema cannot be created.
    pub async fn build(self) -> Result<SchoolService> {
        let store: Arc<dyn SchoolStore> = match self.store {
            Some(store) => store,
            None if self.database_url == MEMORY_DATABASE_URL => {
                Arc::new(MemorySchoolStore::new())
            }
            None => Arc::new(
                SqliteSchoolStore::connect(&self.database_url, self.max_connections).await?,
            ),
        };

        Ok(SchoolService {
            store,
            strict_coordinates: self.strict_coordinates,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use async_trait::async_trait;

    /// Store whose every operation fails.
    struct FailingStore;

    #[async_trait]
    impl SchoolStore for FailingStore {
        async fn insert(&self, _school: &School) -> Result<()> {
            Err(sqlx::Error::PoolClosed.into())
        }

        async fn select_all(&self) -> Result<Vec<School>> {
            Err(sqlx::Error::PoolClosed.into())
        }

        async fn select_all_ordered_by_name(&self) -> Result<Vec<School>> {
            Err(sqlx::Error::PoolClosed.into())
        }
    }

    fn memory_service() -> (Arc<MemorySchoolStore>, SchoolService) {
        let store = Arc::new(MemorySchoolStore::new());
        let service = SchoolService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_then_list_all() {
        let (_, service) = memory_service();
        let other = service
            .create(NewSchool::new("Pine Academy", "2 Pine Rd", 41.0, -74.0))
            .await
            .unwrap();
        let id = service
            .create(NewSchool::new("Oak Elementary", "1 Oak St", 40.0, -75.0))
            .await
            .unwrap();

        let all = service.list_all().await.unwrap();
        let matching: Vec<_> = all
            .iter()
            .filter(|s| s.name == "Oak Elementary")
            .collect();
        assert_eq!(matching.len(), 1);

        let oak = matching[0];
        assert_eq!(oak.id, id);
        assert_ne!(oak.id, other);
        assert_eq!(oak.address, "1 Oak St");
        assert_eq!(oak.latitude, 40.0);
        assert_eq!(oak.longitude, -75.0);

        // Ordered by name
        assert_eq!(all[0].name, "Oak Elementary");
        assert_eq!(all[1].name, "Pine Academy");
    }

    #[tokio::test]
    async fn test_create_generates_distinct_ids_for_duplicates() {
        let (store, service) = memory_service();
        let input = NewSchool::new("Oak", "1 Oak St", 40.0, -75.0);
        let a = service.create(input.clone()).await.unwrap();
        let b = service.create(input).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_without_writing() {
        let (store, service) = memory_service();
        let err = service
            .create(NewSchool::new("  ", "1 Oak St", 40.0, -75.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SchoolError::Validation(ValidationError::InvalidInput)
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_accepts_out_of_range_when_lenient() {
        let (_, service) = memory_service();
        assert!(!service.strict_coordinates());
        service
            .create(NewSchool::new("Oak", "1 Oak St", 999.0, -75.0))
            .await
            .unwrap();
        assert_eq!(service.list_all().await.unwrap()[0].latitude, 999.0);
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_when_strict() {
        let service = SchoolServiceBuilder::new(MEMORY_DATABASE_URL)
            .strict_coordinates(true)
            .build()
            .await
            .unwrap();
        let err = service
            .create(NewSchool::new("Oak", "1 Oak St", 999.0, -75.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SchoolError::Validation(ValidationError::LatitudeOutOfRange { .. })
        ));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_distance_sorted() {
        let (_, service) = memory_service();
        for (name, lat, lon) in [
            ("Far", 10.0, 10.0),
            ("Near", 0.0, 0.5),
            ("Mid", 2.0, 2.0),
        ] {
            service
                .create(NewSchool::new(name, "Somewhere", lat, lon))
                .await
                .unwrap();
        }

        let ranked = service
            .list_by_distance(Coordinate::new(0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(ranked[0].school.name, "Near");
        assert!(ranked.iter().all(|r| r.distance >= 0.0));
    }

    #[tokio::test]
    async fn test_list_by_distance_empty() {
        let (_, service) = memory_service();
        let ranked = service
            .list_by_distance(Coordinate::new(12.0, 34.0))
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let service = SchoolService::new(Arc::new(FailingStore));

        let err = service
            .create(NewSchool::new("Oak", "1 Oak St", 40.0, -75.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SchoolError::Storage(_)));

        assert!(matches!(
            service.list_all().await,
            Err(SchoolError::Storage(_))
        ));
        assert!(matches!(
            service.list_by_distance(Coordinate::new(0.0, 0.0)).await,
            Err(SchoolError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_builder_with_sqlite() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("schools.db").display());
        let service = SchoolServiceBuilder::new(url)
            .max_connections(2)
            .build()
            .await
            .unwrap();

        let id = service
            .create(NewSchool::new("Oak", "1 Oak St", 40.0, -75.0))
            .await
            .unwrap();
        let ranked = service
            .list_by_distance(Coordinate::new(40.0, -75.0))
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].school.id, id);
        assert_eq!(ranked[0].distance, 0.0);
        service.close().await;
    }

    #[tokio::test]
    async fn test_builder_with_injected_store() {
        let store = Arc::new(MemorySchoolStore::new());
        let service = SchoolServiceBuilder::new("sqlite://unused.db")
            .store(store.clone())
            .build()
            .await
            .unwrap();

        service
            .create(NewSchool::new("Oak", "1 Oak St", 40.0, -75.0))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
    }

    fn lookup_from<'a>(
        vars: &'a [(&'a str, &'a str)],
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_lookup_requires_url_without_default() {
        let vars = [("SCHOOLS_STRICT_COORDINATES", "true")];
        let err = SchoolServiceBuilder::from_lookup(lookup_from(&vars), None)
            .err()
            .unwrap();
        assert!(matches!(err, SchoolError::Config(_)));
    }

    #[test]
    fn test_lookup_default_url_keeps_other_settings() {
        let vars = [
            ("SCHOOLS_STRICT_COORDINATES", "1"),
            ("SCHOOLS_MAX_CONNECTIONS", "12"),
        ];
        let builder =
            SchoolServiceBuilder::from_lookup(lookup_from(&vars), Some(MEMORY_DATABASE_URL))
                .unwrap();
        assert_eq!(builder.url(), MEMORY_DATABASE_URL);
        assert_eq!(builder.max_connections, 12);
        assert!(builder.strict_coordinates);
    }

    #[test]
    fn test_lookup_set_url_wins_over_default() {
        let vars = [("SCHOOLS_DATABASE_URL", "sqlite://other.db")];
        let builder =
            SchoolServiceBuilder::from_lookup(lookup_from(&vars), Some("sqlite://schools.db"))
                .unwrap();
        assert_eq!(builder.url(), "sqlite://other.db");
        assert_eq!(builder.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!builder.strict_coordinates);
    }

    #[tokio::test]
    async fn test_default_url_fallback_stays_strict() {
        let vars = [("SCHOOLS_STRICT_COORDINATES", "true")];
        let service =
            SchoolServiceBuilder::from_lookup(lookup_from(&vars), Some(MEMORY_DATABASE_URL))
                .unwrap()
                .build()
                .await
                .unwrap();

        assert!(service.strict_coordinates());
        let err = service
            .create(NewSchool::new("Oak", "1 Oak St", 999.0, -75.0))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("yes"));
    }
}
