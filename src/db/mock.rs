//! Mock spatial client for testing.
//!
//! Provides in-memory implementations of `SpatialClient` for tests and
//! the `--mock-db` flag.

use super::{ClipRecord, SpatialClient, TableExtract};
use crate::error::{GridclipError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

/// A mock spatial client that returns predefined extracts per grid token.
pub struct MockSpatialClient {
    extracts: HashMap<String, Vec<TableExtract>>,
}

impl MockSpatialClient {
    /// Creates a mock client with no known grids.
    pub fn new() -> Self {
        Self {
            extracts: HashMap::new(),
        }
    }

    /// Creates a mock client preloaded with a small demo dataset for the
    /// grid token "93203NW".
    pub fn with_demo_data() -> Self {
        let mut client = Self::new();

        let contour = ClipRecord {
            shape: json!({
                "type": "LineString",
                "coordinates": [[120.10, 23.50], [120.12, 23.51], [120.14, 23.50]]
            }),
            properties: serde_json::from_value(json!({
                "id": 1,
                "elevation": 150
            }))
            .unwrap_or_default(),
        };

        let station = ClipRecord {
            shape: json!({
                "type": "Point",
                "coordinates": [120.11, 23.505]
            }),
            properties: serde_json::from_value(json!({
                "id": 42,
                "name": "survey marker"
            }))
            .unwrap_or_default(),
        };

        client.insert(
            "93203NW",
            vec![
                TableExtract::new("contours", vec![contour]),
                TableExtract::new("control_points", vec![station]),
            ],
        );

        client
    }

    /// Registers extracts to be returned for the given grid token.
    pub fn insert(&mut self, grid: impl Into<String>, extracts: Vec<TableExtract>) {
        self.extracts.insert(grid.into(), extracts);
    }
}

impl Default for MockSpatialClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpatialClient for MockSpatialClient {
    async fn install_clip_function(&self) -> Result<()> {
        Ok(())
    }

    async fn clip_region(&self, grid: &str) -> Result<Vec<TableExtract>> {
        Ok(self.extracts.get(grid).cloned().unwrap_or_default())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A spatial client that fails every operation, for error-path testing.
pub struct FailingSpatialClient;

#[async_trait]
impl SpatialClient for FailingSpatialClient {
    async fn install_clip_function(&self) -> Result<()> {
        Err(GridclipError::query("mock failure: install_clip_function"))
    }

    async fn clip_region(&self, _grid: &str) -> Result<Vec<TableExtract>> {
        Err(GridclipError::query("mock failure: clip_region"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
