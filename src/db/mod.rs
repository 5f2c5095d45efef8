//! Database abstraction layer for gridclip.
//!
//! Provides a trait-based interface for the spatial clip operations,
//! allowing the PostGIS backend to be swapped for an in-memory mock
//! in tests and demos.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingSpatialClient, MockSpatialClient};
pub use postgres::PostgresClient;
pub use types::{ClipRecord, TableExtract};

use crate::config::{ConnectionConfig, ExportConfig};
use crate::error::Result;
use async_trait::async_trait;

/// Creates a PostGIS-backed spatial client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(
    config: &ConnectionConfig,
    export: &ExportConfig,
) -> Result<Box<dyn SpatialClient>> {
    let client = PostgresClient::connect(config, export).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for spatial clip clients.
///
/// All operations are async and return Results with GridclipError.
#[async_trait]
pub trait SpatialClient: Send + Sync {
    /// Installs (or replaces) the stored clip function in the database.
    ///
    /// Run once at startup; the function is what iterates the spatial
    /// tables and performs the ST_Transform/ST_Intersection work.
    async fn install_clip_function(&self) -> Result<()>;

    /// Clips every spatial table to the region named by `grid` and
    /// returns one extract per table that intersected it.
    async fn clip_region(&self, grid: &str) -> Result<Vec<TableExtract>>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
