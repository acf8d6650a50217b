//! Column changes against SQLite.
//!
//! SQLite cannot change a column type in place, so every type change goes
//! through the temporary column rebuild. These tests check what survives it.

use crate::fixtures::{column_values, hosts_accessor};
use anyhow::Result;
use ddlx_accessor::MutationOutcome;
use ddlx_core::{AbstractType, Dialect, Value};
use ddlx_ddl::ColumnSpec;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_sqlite_resolves_to_generic_dialect() -> Result<()> {
    let accessor = hosts_accessor().await?;
    assert_eq!(accessor.dialect(), Dialect::Generic);
    assert!(!accessor.dialect().supports_column_type_change());
    Ok(())
}

#[tokio::test]
async fn test_add_column_backfills_default_and_is_idempotent() -> Result<()> {
    let accessor = hosts_accessor().await?;
    let column = ColumnSpec::string("maintenance_state", 32).default_value("OFF");

    let first = accessor.add_column("hosts", &column, false).await?;
    let second = accessor.add_column("hosts", &column, false).await?;

    assert_eq!(first, MutationOutcome::Applied);
    assert_eq!(second, MutationOutcome::Skipped);
    let values = column_values(&accessor, "maintenance_state").await?;
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|(_, v)| *v == Value::from("OFF")));
    Ok(())
}

#[tokio::test]
async fn test_widening_a_string_column_keeps_rows_and_values() -> Result<()> {
    let accessor = hosts_accessor().await?;
    let before = column_values(&accessor, "rack_info").await?;

    let outcome = accessor
        .alter_column("hosts", &ColumnSpec::string("rack_info", 512), false)
        .await?;

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(column_values(&accessor, "rack_info").await?, before);

    let info = accessor
        .inspector()
        .column_info("hosts", "rack_info")
        .await?
        .expect("rack_info should still exist");
    assert_eq!(info.data_type, "VARCHAR(512)");
    assert!(!accessor.inspector().column_exists("hosts", "rack_info_TMP").await?);
    Ok(())
}

#[tokio::test]
async fn test_blob_to_clob_rebuild_decodes_values() -> Result<()> {
    let accessor = hosts_accessor().await?;

    let outcome = accessor
        .alter_column(
            "hosts",
            &ColumnSpec::new("host_attributes", AbstractType::Clob),
            false,
        )
        .await?;

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(
        column_values(&accessor, "host_attributes").await?,
        vec![
            (1, Value::from("{\"cpu\":4}")),
            (2, Value::from("{\"cpu\":8}")),
            (3, Value::Null),
        ]
    );
    assert!(
        accessor
            .inspector()
            .column_sql_type("hosts", "host_attributes")
            .await?
            .is_text()
    );
    Ok(())
}

#[tokio::test]
async fn test_alter_of_missing_column_is_a_metadata_error() -> Result<()> {
    let accessor = hosts_accessor().await?;

    let err = accessor
        .alter_column("hosts", &ColumnSpec::string("no_such_column", 10), true)
        .await
        .expect_err("missing column must not be swallowed");

    assert!(err.is_metadata());
    Ok(())
}

#[tokio::test]
async fn test_drop_and_rename_column() -> Result<()> {
    let accessor = hosts_accessor().await?;
    let inspector = accessor.inspector();

    let renamed = accessor
        .rename_column("hosts", "rack_info", &ColumnSpec::string("rack", 255), false)
        .await?;
    assert_eq!(renamed, MutationOutcome::Applied);
    assert!(inspector.column_exists("hosts", "rack").await?);
    assert!(!inspector.column_exists("hosts", "rack_info").await?);

    assert_eq!(
        accessor.drop_column("hosts", "rack", false).await?,
        MutationOutcome::Applied
    );
    assert_eq!(
        accessor.drop_column("hosts", "rack", false).await?,
        MutationOutcome::Skipped
    );
    Ok(())
}

#[tokio::test]
async fn test_set_nullable_skips_columns_already_in_state() -> Result<()> {
    let accessor = hosts_accessor().await?;

    assert_eq!(
        accessor.set_column_nullable("hosts", "rack_info", true, false).await?,
        MutationOutcome::Skipped
    );
    assert_eq!(
        accessor.set_column_nullable("hosts", "host_name", false, false).await?,
        MutationOutcome::Skipped
    );
    Ok(())
}

#[tokio::test]
async fn test_rejected_nullability_change_is_ignored_on_request() -> Result<()> {
    let accessor = hosts_accessor().await?;

    // SQLite has no ALTER COLUMN ... SET NOT NULL
    let ignored = accessor
        .set_column_nullable("hosts", "rack_info", false, true)
        .await?;
    assert_eq!(ignored, MutationOutcome::FailureIgnored);

    let err = accessor
        .set_column_nullable("hosts", "rack_info", false, false)
        .await
        .expect_err("failure should propagate without ignore_failure");
    assert!(err.is_execution());
    Ok(())
}

#[tokio::test]
async fn test_failed_rebuild_keeps_original_column() -> Result<()> {
    let accessor = hosts_accessor().await?;
    // A leftover temporary column makes the rebuild's ADD fail
    accessor
        .add_column("hosts", &ColumnSpec::string("rack_info_TMP", 10), false)
        .await?;
    let before = column_values(&accessor, "rack_info").await?;

    let outcome = accessor
        .alter_column("hosts", &ColumnSpec::string("rack_info", 512), true)
        .await?;

    assert_eq!(outcome, MutationOutcome::FailureIgnored);
    assert_eq!(column_values(&accessor, "rack_info").await?, before);
    Ok(())
}

#[tokio::test]
async fn test_rebuild_with_not_null_keeps_data_when_restore_is_rejected() -> Result<()> {
    let accessor = hosts_accessor().await?;
    let before = column_values(&accessor, "host_name").await?;

    // SQLite has no ALTER COLUMN ... SET NOT NULL
    let outcome = accessor
        .alter_column("hosts", &ColumnSpec::string("host_name", 512).not_null(), false)
        .await?;

    assert_eq!(outcome, MutationOutcome::AppliedWithoutAttributes);
    assert!(outcome.is_applied());
    assert_eq!(column_values(&accessor, "host_name").await?, before);
    let info = accessor
        .inspector()
        .column_info("hosts", "host_name")
        .await?
        .expect("host_name should still exist");
    assert_eq!(info.data_type, "VARCHAR(512)");
    assert!(!accessor.inspector().column_exists("hosts", "host_name_TMP").await?);
    Ok(())
}

#[tokio::test]
async fn test_rebuild_with_default_keeps_existing_nulls() -> Result<()> {
    let accessor = hosts_accessor().await?;
    let before = column_values(&accessor, "rack_info").await?;

    let outcome = accessor
        .alter_column(
            "hosts",
            &ColumnSpec::string("rack_info", 512).default_value("/default-rack"),
            false,
        )
        .await?;

    assert_eq!(outcome, MutationOutcome::AppliedWithoutAttributes);
    let after = column_values(&accessor, "rack_info").await?;
    assert_eq!(after, before);
    assert_eq!(after[2], (3, Value::Null));
    Ok(())
}
