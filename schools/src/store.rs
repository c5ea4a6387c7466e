//! Record store for school persistence.
//!
//! [`SchoolStore`] is the seam between the service and persistent storage.
//! Two implementations are provided:
//!
//! - [`SqliteSchoolStore`]: SQLite through a sqlx connection pool
//! - [`MemorySchoolStore`]: insertion-ordered, in-process storage
//!
//! Concurrency is delegated to the backing store. No explicit locking,
//! multi-statement transactions or retries happen at this layer.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::school::School;

const CREATE_SCHOOLS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schools (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        address TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL
    )
"#;

/// Persistent storage of school records.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    /// Persist a new record.
    async fn insert(&self, school: &School) -> Result<()>;

    /// Fetch every record. No ordering is guaranteed.
    async fn select_all(&self) -> Result<Vec<School>>;

    /// Fetch every record ordered by name (byte order).
    async fn select_all_ordered_by_name(&self) -> Result<Vec<School>>;

    /// Release held resources. Called once on shutdown.
    async fn close(&self) {}
}

/// Row type for SQLx query mapping.
#[derive(sqlx::FromRow)]
struct SchoolRow {
    id: String,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<SchoolRow> for School {
    type Error = sqlx::Error;

    fn try_from(row: SchoolRow) -> std::result::Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(School {
            id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
        })
    }
}

/// SQLite-backed school store.
#[derive(Clone)]
pub struct SqliteSchoolStore {
    pool: SqlitePool,
}

impl SqliteSchoolStore {
    /// Wrap an existing pool. The schema is not created.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the database file and the
    /// `schools` table if they do not exist.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use schools::SqliteSchoolStore;
    ///
    /// let store = SqliteSchoolStore::connect("sqlite://schools.db", 5).await?;
    /// ```
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Create the `schools` table if missing.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_SCHOOLS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<School>> {
        let rows = sqlx::query_as::<_, SchoolRow>(sql)
            .fetch_all(&self.pool)
            .await?;

        let schools = rows
            .into_iter()
            .map(School::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(schools)
    }
}

#[async_trait]
impl SchoolStore for SqliteSchoolStore {
    async fn insert(&self, school: &School) -> Result<()> {
        sqlx::query(
            "INSERT INTO schools (id, name, address, latitude, longitude) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(school.id.to_string())
        .bind(&school.name)
        .bind(&school.address)
        .bind(school.latitude)
        .bind(school.longitude)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<School>> {
        self.fetch("SELECT id, name, address, latitude, longitude FROM schools")
            .await
    }

    async fn select_all_ordered_by_name(&self) -> Result<Vec<School>> {
        self.fetch("SELECT id, name, address, latitude, longitude FROM schools ORDER BY name")
            .await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// In-memory school store.
///
/// Records are kept in insertion order, which is the order [`select_all`]
/// returns them in.
///
/// [`select_all`]: SchoolStore::select_all
#[derive(Default)]
pub struct MemorySchoolStore {
    schools: RwLock<Vec<School>>,
}

impl MemorySchoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.schools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.schools.read().await.is_empty()
    }
}

#[async_trait]
impl SchoolStore for MemorySchoolStore {
    async fn insert(&self, school: &School) -> Result<()> {
        let mut schools = self.schools.write().await;
        if schools.iter().any(|s| s.id == school.id) {
            return Err(sqlx::Error::Protocol(format!(
                "UNIQUE constraint failed: schools.id ({})",
                school.id
            ))
            .into());
        }
        schools.push(school.clone());
        Ok(())
    }

    async fn select_all(&self) -> Result<Vec<School>> {
        Ok(self.schools.read().await.clone())
    }

    async fn select_all_ordered_by_name(&self) -> Result<Vec<School>> {
        let mut schools = self.schools.read().await.clone();
        schools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schools)
    }
}
