//! Constraint existence checks against SQLite catalogs

use crate::fixtures::hosts_accessor;
use anyhow::Result;
use ddlx_accessor::{Accessor, MutationOutcome};
use ddlx_ddl::ConstraintRef;
use pretty_assertions::assert_eq;
use rstest::rstest;

async fn with_components(accessor: &Accessor) -> Result<()> {
    accessor
        .execute_update(
            "CREATE TABLE hostcomponentstate (\
             id BIGINT NOT NULL PRIMARY KEY, \
             host_id BIGINT, \
             component_name VARCHAR(255), \
             CONSTRAINT fk_hcs_host FOREIGN KEY (host_id) REFERENCES hosts (host_id))",
            false,
        )
        .await?;
    Ok(())
}

#[rstest]
#[case::key_column(Some("host_id"), true)]
#[case::key_column_other_case(Some("HOST_ID"), true)]
#[case::plain_column(Some("host_name"), false)]
#[case::any_column(None, true)]
#[tokio::test]
async fn test_primary_key_lookup(#[case] column: Option<&str>, #[case] expected: bool) -> Result<()> {
    let accessor = hosts_accessor().await?;

    assert_eq!(
        accessor.inspector().has_primary_key("hosts", column).await?,
        expected
    );
    Ok(())
}

#[tokio::test]
async fn test_primary_key_not_added_twice() -> Result<()> {
    let accessor = hosts_accessor().await?;

    let outcome = accessor
        .add_primary_key("hosts", "hosts_pk", &["host_id"], false)
        .await?;

    assert_eq!(outcome, MutationOutcome::Skipped);
    Ok(())
}

#[tokio::test]
async fn test_primary_key_needs_every_column() -> Result<()> {
    let accessor = hosts_accessor().await?;
    accessor
        .execute_update("CREATE TABLE racks (rack_name VARCHAR(64))", false)
        .await?;

    let outcome = accessor
        .add_primary_key("racks", "racks_pk", &["rack_name", "rack_id"], false)
        .await?;

    assert_eq!(outcome, MutationOutcome::Skipped);
    Ok(())
}

#[tokio::test]
async fn test_unsupported_constraint_ddl_is_ignored_on_request() -> Result<()> {
    let accessor = hosts_accessor().await?;
    accessor
        .execute_update("CREATE TABLE racks (rack_name VARCHAR(64))", false)
        .await?;

    // SQLite rejects ALTER TABLE ... ADD CONSTRAINT
    let outcome = accessor
        .add_primary_key("racks", "racks_pk", &["rack_name"], true)
        .await?;

    assert_eq!(outcome, MutationOutcome::FailureIgnored);
    assert!(!accessor.inspector().has_primary_key("racks", None).await?);
    Ok(())
}

#[tokio::test]
async fn test_existing_foreign_key_is_detected_by_columns() -> Result<()> {
    let accessor = hosts_accessor().await?;
    with_components(&accessor).await?;
    let inspector = accessor.inspector();

    assert!(
        inspector
            .has_foreign_key("hostcomponentstate", "hosts", &["host_id"], &["host_id"])
            .await?
    );
    assert!(
        !inspector
            .has_foreign_key("hostcomponentstate", "hosts", &["id"], &["host_id"])
            .await?
    );

    let constraint = ConstraintRef::foreign_key(
        "hostcomponentstate",
        "fk_hcs_host",
        ["host_id"],
        "hosts",
        ["host_id"],
        false,
    );
    assert_eq!(
        accessor.add_constraint(&constraint, false).await?,
        MutationOutcome::Skipped
    );
    Ok(())
}

#[tokio::test]
async fn test_drops_of_absent_constraints_are_skipped() -> Result<()> {
    let accessor = hosts_accessor().await?;
    with_components(&accessor).await?;

    // SQLite does not report foreign key names
    assert_eq!(
        accessor
            .drop_foreign_key("hostcomponentstate", "fk_hcs_host", false)
            .await?,
        MutationOutcome::Skipped
    );
    assert_eq!(
        accessor
            .drop_primary_key_on_column("hosts", "hosts_pk", "host_name", false)
            .await?,
        MutationOutcome::Skipped
    );
    Ok(())
}

#[tokio::test]
async fn test_unreadable_constraint_catalog_is_never_ignored() -> Result<()> {
    let accessor = hosts_accessor().await?;

    // No information_schema in SQLite
    let err = accessor
        .drop_unique_constraint("hosts", "uq_host_name", true)
        .await
        .expect_err("catalog failure must surface");

    assert!(err.is_metadata());
    Ok(())
}
