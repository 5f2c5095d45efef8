//! gridclip - clip PostGIS tables to a map-grid region and serve
//! GeoJSON downloads over HTTP.
//!
//! This library exposes the core modules for use in integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod http;
