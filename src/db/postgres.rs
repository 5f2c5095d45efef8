//! PostGIS-backed spatial client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `SpatialClient`
//! trait using sqlx. The geometric work (transform, intersect, clip) is
//! performed entirely by the database via a stored plpgsql function that
//! this client installs at startup.

use crate::config::{ConnectionConfig, ExportConfig};
use crate::db::{ClipRecord, SpatialClient, TableExtract};
use crate::error::{GridclipError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, warn};

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Name of the stored clip function installed by this client.
const CLIP_FUNCTION: &str = "gridclip_tables_within_region";

/// PostGIS spatial client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
    export: ExportConfig,
}

impl PostgresClient {
    /// Connects to the database with retry on transient failures.
    pub async fn connect(config: &ConnectionConfig, export: &ExportConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&conn_str)
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to database");
                    return Ok(Self {
                        pool,
                        export: export.clone(),
                    });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2; // Exponential backoff
                    }
                }
            }
        }

        // All retries exhausted
        Err(map_connection_error(
            last_error.expect("at least one attempt was made"),
            config,
        ))
    }

    /// Creates a new PostgresClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: PgPool, export: ExportConfig) -> Self {
        Self { pool, export }
    }
}

#[async_trait]
impl SpatialClient for PostgresClient {
    async fn install_clip_function(&self) -> Result<()> {
        let ddl = build_clip_function_ddl(&self.export);
        debug!("Installing stored function {}", CLIP_FUNCTION);

        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| GridclipError::query(format!("Failed to install clip function: {e}")))?;

        Ok(())
    }

    async fn clip_region(&self, grid: &str) -> Result<Vec<TableExtract>> {
        let sql = format!("SELECT table_name, record FROM {CLIP_FUNCTION}($1)");
        debug!(grid, "Executing clip query");

        let rows: Vec<(String, Option<serde_json::Value>)> = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            sqlx::query_as(&sql).bind(grid).fetch_all(&self.pool),
        )
        .await
        .map_err(|_| {
            GridclipError::query(format!(
                "Clip query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })?
        .map_err(|e| GridclipError::query(format!("Clip query failed: {e}")))?;

        let mut extracts = Vec::with_capacity(rows.len());

        for (table_name, record) in rows {
            let Some(record) = record else {
                warn!(table = %table_name, "No records found for table");
                continue;
            };

            let records: Vec<ClipRecord> = serde_json::from_value(record).map_err(|e| {
                GridclipError::query(format!(
                    "Malformed record aggregate for table {table_name}: {e}"
                ))
            })?;

            if records.is_empty() {
                warn!(table = %table_name, "Empty record aggregate for table");
                continue;
            }

            extracts.push(TableExtract::new(table_name, records));
        }

        Ok(extracts)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Builds the CREATE OR REPLACE FUNCTION statement for the stored clip
/// function.
///
/// The function loops over every table in the public schema (excluding
/// spatial_ref_sys and the region lookup tables), clips each one against
/// the union of matching region geometries, and returns one row per table
/// with a jsonb aggregate of `{"shape": ..., "properties": ...}` objects.
/// User tables are interpolated inside the function with %I/%L formatting;
/// the grid token itself arrives as the function argument, never spliced
/// into SQL text.
fn build_clip_function_ddl(export: &ExportConfig) -> String {
    let geom_ident = quote_ident(&export.geometry_column);
    let srid = export.srid;

    // Tables that must never be clipped: PostGIS metadata plus the
    // region lookup tables themselves.
    let excluded = std::iter::once("spatial_ref_sys")
        .chain(export.region_tables.iter().map(String::as_str))
        .map(quote_body_literal)
        .collect::<Vec<_>>()
        .join(", ");

    // One UNION ALL arm per region lookup table. These live inside the
    // single-quoted format() template, so no quoting beyond identifiers
    // is needed; the grid token is bound via the %2$L placeholder.
    let union_arms = export
        .region_tables
        .iter()
        .map(|table| {
            format!(
                "SELECT ST_Transform({geom_ident}, {srid}) AS geom FROM {} WHERE grid = %2$L",
                quote_ident(table)
            )
        })
        .collect::<Vec<_>>()
        .join("\n                UNION ALL\n                ");

    // Literal column name for the `to_jsonb(t) - 'col'` subtraction,
    // doubled because it sits inside the format() template string.
    let geom_literal = template_literal(&export.geometry_column);

    format!(
        r#"
CREATE OR REPLACE FUNCTION {CLIP_FUNCTION}(grid_value text)
RETURNS TABLE(table_name text, record jsonb) AS $gridclip$
DECLARE
    table_rec RECORD;
    sql_query text;
BEGIN
    FOR table_rec IN
        SELECT tablename
        FROM pg_tables
        WHERE schemaname = 'public'
        AND tablename NOT IN ({excluded})
    LOOP
        sql_query := format('
            SELECT
                %1$L AS table_name,
                jsonb_agg(
                    jsonb_build_object(
                        ''shape'', ST_AsGeoJSON(ST_Intersection(ST_Transform(t.{geom_ident}, {srid}), region.geom))::jsonb,
                        ''properties'', to_jsonb(t) - {geom_literal}
                    )
                ) AS record
            FROM
                %1$I t
            JOIN (
                {union_arms}
            ) region
            ON ST_Intersects(ST_Transform(t.{geom_ident}, {srid}), region.geom)
        ', table_rec.tablename, grid_value);

        RETURN QUERY EXECUTE sql_query;
    END LOOP;
END;
$gridclip$ LANGUAGE plpgsql;
"#
    )
}

/// Double-quotes an identifier for direct inclusion in SQL text.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quotes a literal for inclusion in the dollar-quoted function body.
fn quote_body_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

/// Single-quotes a literal for inclusion inside the format() template,
/// which is itself a single-quoted string (so every quote doubles twice).
fn template_literal(literal: &str) -> String {
    format!("''{}''", literal.replace('\'', "''''"))
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    // Connection refused or timeout are often transient
    if error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
    {
        return true;
    }

    // Authentication and database-not-found errors are not transient
    if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
        || error_str.contains("does not exist")
        || error_str.contains("ssl")
        || error_str.contains("tls")
    {
        return false;
    }

    // Default to not retrying unknown errors
    false
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> GridclipError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        GridclipError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        GridclipError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        GridclipError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        GridclipError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        GridclipError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        GridclipError::connection(error.to_string())
    }
}
