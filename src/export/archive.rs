//! ZIP bundling of exported GeoJSON files.

use crate::error::{GridclipError, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;
use zip::write::{FileOptions, ZipWriter};

/// Returns the archive file name for a grid token.
pub fn zip_file_name(grid: &str) -> String {
    format!("{grid}_geojson_files.zip")
}

/// Bundles the named GeoJSON files from `output_dir` into an in-memory
/// ZIP archive and returns its bytes.
pub fn bundle(file_names: &[String], output_dir: &Path) -> Result<Vec<u8>> {
    debug!("Creating ZIP archive with {} files", file_names.len());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for file_name in file_names {
        let path = output_dir.join(file_name);
        let contents = std::fs::read(&path).map_err(|e| {
            GridclipError::export(format!("Failed to read {} for zipping: {e}", path.display()))
        })?;

        zip.start_file::<_, ()>(file_name.as_str(), FileOptions::default())?;
        zip.write_all(&contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_zip_file_name() {
        assert_eq!(zip_file_name("93203NW"), "93203NW_geojson_files.zip");
    }

    #[test]
    fn test_bundle_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.geojson"), b"{\"type\":\"FeatureCollection\"}")
            .unwrap();
        std::fs::write(dir.path().join("b.geojson"), b"{}").unwrap();

        let names = vec!["a.geojson".to_string(), "b.geojson".to_string()];
        let bytes = bundle(&names, dir.path()).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut entry = archive.by_name("a.geojson").unwrap();
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "{\"type\":\"FeatureCollection\"}");
    }

    #[test]
    fn test_bundle_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let names = vec!["missing.geojson".to_string()];

        let result = bundle(&names, dir.path());
        assert!(matches!(result, Err(GridclipError::Export(_))));
    }

    #[test]
    fn test_bundle_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = bundle(&[], dir.path()).unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
