//! Error types for gridclip.
//!
//! Defines the main error enum used throughout the service.

use thiserror::Error;

/// Main error type for gridclip operations.
#[derive(Error, Debug)]
pub enum GridclipError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (clip function failures, timeouts, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Export errors (GeoJSON serialization, file writes, ZIP bundling)
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP-layer errors (bind failures, malformed requests)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GridclipError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an HTTP error with the given message.
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Export(_) => "Export Error",
            Self::Config(_) => "Configuration Error",
            Self::Http(_) => "HTTP Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for GridclipError {
    fn from(e: std::io::Error) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<serde_json::Error> for GridclipError {
    fn from(e: serde_json::Error) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<zip::result::ZipError> for GridclipError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Export(e.to_string())
    }
}

/// Result type alias using GridclipError.
pub type Result<T> = std::result::Result<T, GridclipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = GridclipError::connection("Cannot connect to localhost:5432");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:5432"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = GridclipError::query("relation \"grd\" does not exist");
        assert_eq!(
            err.to_string(),
            "Query error: relation \"grd\" does not exist"
        );
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_export() {
        let err = GridclipError::export("failed to write 93203NW_rivers.geojson");
        assert_eq!(
            err.to_string(),
            "Export error: failed to write 93203NW_rivers.geojson"
        );
        assert_eq!(err.category(), "Export Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = GridclipError::config("missing field 'database' in connections.default");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'database' in connections.default"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = GridclipError::from(io);
        assert!(matches!(err, GridclipError::Export(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GridclipError>();
    }
}
