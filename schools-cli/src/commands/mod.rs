pub mod add;
pub mod import;
pub mod list;

use anyhow::{Context, Result};
use schools::{SchoolService, SchoolServiceBuilder};

/// Store settings shared by every subcommand.
pub struct StoreOptions {
    pub database_url: String,
    pub max_connections: u32,
    pub strict: bool,
}

impl StoreOptions {
    pub async fn connect(&self) -> Result<SchoolService> {
        SchoolServiceBuilder::new(&self.database_url)
            .max_connections(self.max_connections)
            .strict_coordinates(self.strict)
            .build()
            .await
            .with_context(|| format!("Failed to open database: {}", self.database_url))
    }
}
