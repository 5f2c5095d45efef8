//! GeoJSON export layer for gridclip.
//!
//! Translates clipped database records into GeoJSON FeatureCollection
//! files on disk and bundles them into ZIP archives. Exported files are
//! never cleaned up by the service.

mod archive;
mod geojson;

pub use archive::{bundle, zip_file_name};
pub use geojson::{feature_collection, write_extracts};

/// Maximum accepted length for a grid token.
const MAX_TOKEN_LEN: usize = 64;

/// Returns true if `token` is an acceptable grid/county code.
///
/// Tokens name files on disk, so they are restricted to ASCII
/// alphanumerics, `_` and `-`.
pub fn is_valid_grid_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Returns true if `name` is a file name this service could have exported.
///
/// Anything else, including path separators, is rejected so the download
/// route can never read outside the export directory.
pub fn is_valid_export_filename(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".geojson") else {
        return false;
    };
    !stem.is_empty()
        && stem.len() <= 2 * MAX_TOKEN_LEN
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
