//! Translation of clipped records into GeoJSON files.

use crate::db::TableExtract;
use crate::error::{GridclipError, Result};
use geojson::{Feature, FeatureCollection};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Builds a FeatureCollection from one table's clipped records.
///
/// Each record becomes a Feature carrying the clipped geometry and the
/// source row's non-geometry columns as properties, plus a `table_name`
/// property naming the source table. Records without a usable geometry
/// (degenerate intersections) are skipped.
pub fn feature_collection(extract: &TableExtract) -> FeatureCollection {
    let mut features = Vec::with_capacity(extract.records.len());

    for record in &extract.records {
        if !record.has_shape() {
            warn!(
                table = %extract.table_name,
                "Skipping record with null geometry"
            );
            continue;
        }

        let geometry: geojson::Geometry = match serde_json::from_value(record.shape.clone()) {
            Ok(g) => g,
            Err(e) => {
                warn!(
                    table = %extract.table_name,
                    "Skipping record with unparseable geometry: {e}"
                );
                continue;
            }
        };

        let mut properties = record.properties.clone();
        properties.insert(
            "table_name".to_string(),
            Value::String(extract.table_name.clone()),
        );

        features.push(Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Writes one `<grid>_<table>.geojson` file per extract into `output_dir`.
///
/// The directory is created on demand. Tables whose records yielded no
/// usable features produce no file. Returns the written file names in
/// extract order.
pub fn write_extracts(
    grid: &str,
    extracts: &[TableExtract],
    output_dir: &Path,
) -> Result<Vec<String>> {
    fs::create_dir_all(output_dir).map_err(|e| {
        GridclipError::export(format!(
            "Failed to create export directory {}: {e}",
            output_dir.display()
        ))
    })?;

    let mut file_names = Vec::with_capacity(extracts.len());

    for extract in extracts {
        let collection = feature_collection(extract);
        if collection.features.is_empty() {
            warn!(table = %extract.table_name, "No usable features for table");
            continue;
        }

        let file_name = format!("{grid}_{}.geojson", extract.table_name);
        let path = output_dir.join(&file_name);
        let body = serde_json::to_string(&collection)?;

        fs::write(&path, body).map_err(|e| {
            GridclipError::export(format!("Failed to write {}: {e}", path.display()))
        })?;

        debug!(file = %file_name, features = collection.features.len(), "Wrote export");
        file_names.push(file_name);
    }

    Ok(file_names)
}
