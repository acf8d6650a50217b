//! Shared fixtures: test logging and SQLite-backed accessors

use std::sync::Arc;

use anyhow::{Context, Result};
use ddlx_accessor::Accessor;
use ddlx_core::{AbstractType, ConnectionConfig, DatabaseDriver, Value};
use ddlx_ddl::{ColumnSpec, TableSpec};
use ddlx_driver_sqlite::SqliteDriver;

/// Initialize logging for tests if not already initialized
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ddlx_accessor=info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Accessor over a fresh in-memory SQLite database
pub async fn sqlite_accessor() -> Result<Accessor> {
    initialize_logging();
    let driver: Arc<dyn DatabaseDriver> = Arc::new(SqliteDriver::new());
    let config = ConnectionConfig::new("sqlite", "sqlite::memory:");
    Accessor::connect(driver, config)
        .await
        .context("failed to open in-memory SQLite accessor")
}

/// The `hosts` table used across tests
pub fn hosts_table() -> TableSpec {
    TableSpec::new("hosts")
        .column(ColumnSpec::new("host_id", AbstractType::Long).not_null())
        .column(ColumnSpec::string("host_name", 255).not_null())
        .column(ColumnSpec::string("rack_info", 255))
        .column(ColumnSpec::new("host_attributes", AbstractType::Blob))
        .primary_key(["host_id"])
}

/// Accessor with `hosts` created and three rows in it; the third row has
/// no rack and no attributes
pub async fn hosts_accessor() -> Result<Accessor> {
    let accessor = sqlite_accessor().await?;
    accessor
        .create_table(&hosts_table(), false)
        .await
        .context("failed to create hosts")?;

    let columns = ["host_id", "host_name", "rack_info", "host_attributes"];
    let rows = [
        vec![
            Value::Int64(1),
            Value::from("c6401.ambari.apache.org"),
            Value::from("/r1"),
            Value::Bytes(b"{\"cpu\":4}".to_vec()),
        ],
        vec![
            Value::Int64(2),
            Value::from("c6402.ambari.apache.org"),
            Value::from("/r2"),
            Value::Bytes(b"{\"cpu\":8}".to_vec()),
        ],
        vec![
            Value::Int64(3),
            Value::from("c6403.ambari.apache.org"),
            Value::Null,
            Value::Null,
        ],
    ];
    for row in &rows {
        accessor
            .insert_row("hosts", &columns, row, false)
            .await
            .context("failed to seed hosts")?;
    }
    Ok(accessor)
}

/// `(host_id, column)` pairs ordered by host id
pub async fn column_values(accessor: &Accessor, column: &str) -> Result<Vec<(i64, Value)>> {
    let result = accessor
        .execute_select(&format!("SELECT host_id, {} FROM hosts ORDER BY host_id", column))
        .await?;
    Ok(result
        .rows
        .iter()
        .map(|row| {
            (
                row.get(0).and_then(Value::as_i64).unwrap_or_default(),
                row.get(1).cloned().unwrap_or(Value::Null),
            )
        })
        .collect())
}
