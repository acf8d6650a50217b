//! Script execution and secondary connections

use crate::fixtures::{hosts_accessor, sqlite_accessor};
use anyhow::{Context, Result};
use ddlx_core::Value;
use pretty_assertions::assert_eq;
use std::io::Write;

#[tokio::test]
async fn test_script_runs_to_the_end_and_counts_failures() -> Result<()> {
    let accessor = sqlite_accessor().await?;
    let mut script = tempfile::NamedTempFile::new().context("failed to create script file")?;
    write!(
        script,
        "-- upgrade script\n\
         CREATE TABLE clusters (\n\
           cluster_id BIGINT NOT NULL,\n\
           cluster_name VARCHAR(100)\n\
         );\n\
         \n\
         INSERT INTO no_such_table VALUES (1);\n\
         // legacy comment style\n\
         INSERT INTO clusters (cluster_id, cluster_name) VALUES (1, 'c1');\n\
         INSERT INTO clusters (cluster_id, cluster_name) VALUES (2, 'c2')\n"
    )?;

    let summary = accessor.execute_script(script.path()).await?;

    assert_eq!((summary.executed, summary.failed), (3, 1));
    assert_eq!(summary.total(), 4);
    let count = accessor.execute_select("SELECT COUNT(*) FROM clusters").await?;
    assert_eq!(count.scalar(), Some(&Value::Int64(2)));
    Ok(())
}

#[tokio::test]
async fn test_missing_script_is_an_error() -> Result<()> {
    let accessor = sqlite_accessor().await?;
    let dir = tempfile::tempdir()?;

    let result = accessor.execute_script(dir.path().join("absent.sql")).await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_new_connection_is_independent() -> Result<()> {
    let accessor = hosts_accessor().await?;

    let second = accessor.new_connection().await?;

    // Each in-memory SQLite connection is its own database
    assert!(second.query("SELECT COUNT(*) FROM hosts", &[]).await.is_err());
    assert_eq!(second.driver_name(), accessor.connection().driver_name());
    Ok(())
}

#[tokio::test]
async fn test_closed_accessor_refuses_work() -> Result<()> {
    let accessor = hosts_accessor().await?;

    accessor.close().await?;

    assert!(accessor.table_has_data("hosts").await.is_err());
    Ok(())
}
