//! Request routing dispatch.
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, and the clip-export-serve pipeline behind each route.

use crate::export;
use crate::http::{pages, response, AppState};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

/// Main entry point for HTTP request handling.
///
/// Generic over the request body type; this service never reads request
/// bodies, and tests exercise the router with synthetic requests.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let is_head = method == Method::HEAD;

    if method != Method::GET && method != Method::HEAD {
        return Ok(response::build_405_response());
    }

    let path = req.uri().path().to_string();
    info!(%method, %path, "Handling request");

    let base = base_url(&state, &req);
    Ok(route(&path, is_head, &base, &state).await)
}

/// Resolves the base URL used for absolute download links.
///
/// Prefers the configured public base URL, then the request's Host
/// header, then falls back to relative links.
fn base_url<B>(state: &AppState, req: &Request<B>) -> String {
    if let Some(base) = &state.config.server.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    req.headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default()
}

/// Route request based on path.
async fn route(path: &str, is_head: bool, base: &str, state: &AppState) -> Response<Full<Bytes>> {
    if path == "/" {
        return response::build_html_response(pages::index_page(), is_head);
    }

    if path == "/healthz" {
        return response::build_health_response();
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        ["download", file_name] => serve_download(file_name, is_head, state),
        ["download_all", grid] => serve_zip(grid, is_head, state).await,
        [grid] => serve_listing(grid, is_head, base, state).await,
        _ => response::build_404_response(),
    }
}

/// Runs the clip pipeline for a grid token and writes the GeoJSON files,
/// returning the written file names.
async fn run_clip(state: &AppState, grid: &str) -> crate::error::Result<Vec<String>> {
    let extracts = state.db.clip_region(grid).await?;
    export::write_extracts(grid, &extracts, &state.config.export.output_dir)
}

/// GET /<grid> — clip, export, and render the download listing.
async fn serve_listing(
    grid: &str,
    is_head: bool,
    base: &str,
    state: &AppState,
) -> Response<Full<Bytes>> {
    if !export::is_valid_grid_token(grid) {
        return response::build_400_response("Invalid grid token");
    }

    let file_names = match run_clip(state, grid).await {
        Ok(names) => names,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            return response::build_500_response("Internal Server Error");
        }
    };

    if file_names.is_empty() {
        error!(grid, "No GeoJSON files generated");
        return response::build_500_response("No GeoJSON files generated");
    }

    let file_links: Vec<(String, String)> = file_names
        .iter()
        .map(|name| {
            let stem = name.strip_suffix(".geojson").unwrap_or(name).to_string();
            (stem, format!("{base}/download/{name}"))
        })
        .collect();
    let zip_url = format!("{base}/download_all/{grid}");

    response::build_html_response(pages::listing_page(&file_links, &zip_url), is_head)
}

/// GET /download/<file> — serve a previously exported GeoJSON file.
fn serve_download(file_name: &str, is_head: bool, state: &AppState) -> Response<Full<Bytes>> {
    // Reject anything that could not be a name we exported; this is what
    // keeps the route inside the export directory.
    if !export::is_valid_export_filename(file_name) {
        return response::build_404_response();
    }

    let path = state.config.export.output_dir.join(file_name);
    match std::fs::read(&path) {
        Ok(data) => {
            response::build_attachment_response(data, "application/geo+json", file_name, is_head)
        }
        Err(_) => response::build_404_response(),
    }
}

/// GET /download_all/<grid> — clip, export, and serve the ZIP bundle.
async fn serve_zip(grid: &str, is_head: bool, state: &AppState) -> Response<Full<Bytes>> {
    if !export::is_valid_grid_token(grid) {
        return response::build_400_response("Invalid grid token");
    }

    let file_names = match run_clip(state, grid).await {
        Ok(names) => names,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            return response::build_500_response("Internal Server Error");
        }
    };

    if file_names.is_empty() {
        error!(grid, "No GeoJSON files to zip");
        return response::build_500_response("No GeoJSON files to zip");
    }

    match export::bundle(&file_names, &state.config.export.output_dir) {
        Ok(bytes) => response::build_attachment_response(
            bytes,
            "application/zip",
            &export::zip_file_name(grid),
            is_head,
        ),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            response::build_500_response("Internal Server Error")
        }
    }
}
