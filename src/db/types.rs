//! Clip result types for gridclip.
//!
//! Defines the structures used to represent the per-table output of the
//! stored clip function.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Clipped rows from one source table for one grid region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableExtract {
    /// Name of the source table.
    pub table_name: String,

    /// One record per source row that intersected the region.
    pub records: Vec<ClipRecord>,
}

impl TableExtract {
    /// Creates an extract with the given table name and records.
    pub fn new(table_name: impl Into<String>, records: Vec<ClipRecord>) -> Self {
        Self {
            table_name: table_name.into(),
            records,
        }
    }

    /// Returns true if no rows intersected the region.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A single clipped row: the intersected geometry as GeoJSON plus the
/// row's non-geometry columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipRecord {
    /// Clipped geometry as a GeoJSON geometry object. Null when the
    /// intersection was degenerate.
    #[serde(default)]
    pub shape: Value,

    /// Non-geometry columns of the source row.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl ClipRecord {
    /// Returns true if the record carries a usable geometry.
    pub fn has_shape(&self) -> bool {
        self.shape.is_object()
    }
}
