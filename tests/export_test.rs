//! Integration tests for the export layer: clipped records to GeoJSON
//! files on disk, and ZIP bundling.

use gridclip::db::{ClipRecord, TableExtract};
use gridclip::export;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Read;

fn sample_extracts() -> Vec<TableExtract> {
    let contour = ClipRecord {
        shape: json!({
            "type": "LineString",
            "coordinates": [[120.10, 23.50], [120.12, 23.51]]
        }),
        properties: serde_json::from_value(json!({ "id": 1, "elevation": 150 })).unwrap(),
    };
    let marker = ClipRecord {
        shape: json!({ "type": "Point", "coordinates": [120.11, 23.505] }),
        properties: serde_json::from_value(json!({ "id": 42, "name": "survey marker" })).unwrap(),
    };

    vec![
        TableExtract::new("contours", vec![contour]),
        TableExtract::new("control_points", vec![marker]),
    ]
}

#[test]
fn export_writes_one_file_per_table() {
    let dir = tempfile::tempdir().unwrap();

    let files = export::write_extracts("93203NW", &sample_extracts(), dir.path()).unwrap();

    assert_eq!(
        files,
        vec![
            "93203NW_contours.geojson".to_string(),
            "93203NW_control_points.geojson".to_string(),
        ]
    );

    for name in &files {
        assert!(dir.path().join(name).exists());
    }
}

#[test]
fn exported_files_are_valid_feature_collections() {
    let dir = tempfile::tempdir().unwrap();

    let files = export::write_extracts("93203NW", &sample_extracts(), dir.path()).unwrap();
    let body = std::fs::read_to_string(dir.path().join(&files[1])).unwrap();

    // Parses through the geojson crate, not just as raw JSON
    let geojson::GeoJson::FeatureCollection(collection) =
        body.parse::<geojson::GeoJson>().unwrap()
    else {
        panic!("expected a FeatureCollection");
    };
    assert_eq!(collection.features.len(), 1);

    let props = collection.features[0].properties.as_ref().unwrap();
    assert_eq!(props.get("table_name"), Some(&json!("control_points")));
    assert_eq!(props.get("name"), Some(&json!("survey marker")));
}

#[test]
fn export_skips_records_without_geometry() {
    let dir = tempfile::tempdir().unwrap();

    let degenerate = ClipRecord {
        shape: serde_json::Value::Null,
        properties: serde_json::from_value(json!({ "id": 9 })).unwrap(),
    };
    let extracts = vec![TableExtract::new("rivers", vec![degenerate])];

    let files = export::write_extracts("10013", &extracts, dir.path()).unwrap();
    assert!(files.is_empty());
}

#[test]
fn bundle_round_trips_through_zip() {
    let dir = tempfile::tempdir().unwrap();

    let files = export::write_extracts("93203NW", &sample_extracts(), dir.path()).unwrap();
    let bytes = export::bundle(&files, dir.path()).unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut entry = archive.by_name("93203NW_contours.geojson").unwrap();
    let mut body = String::new();
    entry.read_to_string(&mut body).unwrap();

    let geojson::GeoJson::FeatureCollection(collection) =
        body.parse::<geojson::GeoJson>().unwrap()
    else {
        panic!("expected a FeatureCollection");
    };
    assert_eq!(collection.features.len(), 1);
}

#[test]
fn exports_accumulate_across_requests() {
    // Files from earlier grids stay on disk; the service never cleans up.
    let dir = tempfile::tempdir().unwrap();

    export::write_extracts("93203NW", &sample_extracts(), dir.path()).unwrap();
    export::write_extracts("10013", &sample_extracts(), dir.path()).unwrap();

    assert!(dir.path().join("93203NW_contours.geojson").exists());
    assert!(dir.path().join("10013_contours.geojson").exists());
}
