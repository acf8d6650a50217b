use std::sync::Arc;

use ddlx_core::{Dialect, IdentifierCase, SqlType, Value, ValueKind};
use ddlx_ddl::BuildError;

use super::SchemaInspector;
use crate::AccessorError;
use crate::testing::FakeConnection;
use rstest::rstest;

fn hosts_schema(case: IdentifierCase) -> FakeConnection {
    FakeConnection::new("Oracle", case)
        .with_table(
            "HOSTS",
            &[
                ("HOST_ID", "NUMBER(19)", false),
                ("HOST_NAME", "VARCHAR2(255)", false),
                ("RACK_INFO", "VARCHAR2(255)", true),
                ("HOST_ATTRIBUTES", "BLOB", true),
            ],
        )
        .with_table("CLUSTERS", &[("CLUSTER_ID", "NUMBER(19)", false)])
        .with_table(
            "HOSTCOMPONENTSTATE",
            &[
                ("ID", "NUMBER(19)", false),
                ("CLUSTER_ID", "NUMBER(19)", false),
                ("HOST_ID", "NUMBER(19)", false),
            ],
        )
        .with_primary_key("HOSTS", &["HOST_ID"])
        .with_foreign_key(
            "FK_HCS_HOST",
            "HOSTCOMPONENTSTATE",
            &["CLUSTER_ID", "HOST_ID"],
            "HOSTS",
            &["CLUSTER_ID", "HOST_ID"],
        )
        .with_constraint("HOSTS_PK")
}

fn inspector(conn: FakeConnection) -> (Arc<FakeConnection>, SchemaInspector) {
    let conn = Arc::new(conn);
    let inspector = SchemaInspector::new(conn.clone(), Dialect::Oracle);
    (conn, inspector)
}

#[tokio::test]
async fn test_identifier_case_is_looked_up_once() {
    let (conn, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(inspector.table_exists("hosts").await.unwrap());
    assert!(inspector.column_exists("hosts", "host_name").await.unwrap());
    assert!(!inspector.table_exists("services").await.unwrap());
    assert_eq!(conn.state.lock().case_lookups, 1);
}

#[tokio::test]
async fn test_column_set_requires_every_column() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(
        inspector
            .columns_exist("hosts", &["host_id", "Rack_Info"])
            .await
            .unwrap()
    );
    assert!(
        !inspector
            .columns_exist("hosts", &["host_id", "public_host_name"])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_column_metadata() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert_eq!(
        inspector.column_sql_type("hosts", "host_attributes").await.unwrap(),
        SqlType::Blob
    );
    assert!(inspector.is_column_nullable("hosts", "rack_info").await.unwrap());
    assert!(!inspector.is_column_nullable("hosts", "host_name").await.unwrap());
    assert_eq!(
        inspector.column_value_kind("hosts", "host_name").await.unwrap(),
        ValueKind::Text
    );

    let missing = inspector.column_sql_type("hosts", "nope").await.unwrap_err();
    assert!(missing.is_metadata());
}

#[tokio::test]
async fn test_primary_key_scoped_to_column() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(inspector.has_primary_key("hosts", None).await.unwrap());
    assert!(inspector.has_primary_key("hosts", Some("host_id")).await.unwrap());
    assert!(!inspector.has_primary_key("hosts", Some("host_name")).await.unwrap());
    assert!(!inspector.has_primary_key("clusters", None).await.unwrap());
}

#[tokio::test]
async fn test_foreign_key_matches_by_position() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(
        inspector
            .has_foreign_key(
                "hostcomponentstate",
                "hosts",
                &["cluster_id", "host_id"],
                &["cluster_id", "host_id"]
            )
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_foreign_key_in_other_order_does_not_match() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    // same set of columns, swapped on one side only
    assert!(
        !inspector
            .has_foreign_key(
                "hostcomponentstate",
                "hosts",
                &["host_id", "cluster_id"],
                &["cluster_id", "host_id"]
            )
            .await
            .unwrap()
    );
    assert!(
        !inspector
            .has_foreign_key("hostcomponentstate", "clusters", &["cluster_id"], &["cluster_id"])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_foreign_key_count_mismatch_is_a_build_error() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    let err = inspector
        .has_foreign_key("hostcomponentstate", "hosts", &["cluster_id"], &["cluster_id", "host_id"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccessorError::Build(BuildError::ReferenceCountMismatch { .. })
    ));
}

#[tokio::test]
async fn test_foreign_key_without_columns_is_a_build_error() {
    let (conn, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    let err = inspector
        .has_foreign_key("hostcomponentstate", "hosts", &[] as &[&str], &[] as &[&str])
        .await
        .unwrap_err();
    assert!(matches!(err, AccessorError::Build(BuildError::EmptyColumnList(_))));
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn test_foreign_key_by_name() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(
        inspector
            .has_foreign_key_named("hostcomponentstate", "fk_hcs_host")
            .await
            .unwrap()
    );
    assert!(
        !inspector
            .has_foreign_key_named("hostcomponentstate", "fk_hcs_cluster")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_constraint_lookup_ignores_case() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(inspector.has_constraint("hosts", "hosts_pk").await.unwrap());
    assert!(!inspector.has_constraint("hosts", "uq_host_name").await.unwrap());
}

#[tokio::test]
async fn test_table_has_data_counts_rows() {
    let (conn, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(!inspector.table_has_data("hosts").await.unwrap());
    conn.state.lock().row_count = 3;
    assert!(inspector.table_has_data("hosts").await.unwrap());
}

#[rstest]
#[case::float(Value::Float64(2.0), true)]
#[case::decimal(Value::Decimal("3.0".into()), true)]
#[case::zero_text(Value::String("0".into()), false)]
#[tokio::test]
async fn test_table_has_data_reads_any_numeric_count(#[case] count: Value, #[case] expected: bool) {
    let (conn, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    conn.state.lock().count_value = Some(count);
    assert_eq!(inspector.table_has_data("hosts").await.unwrap(), expected);
}

#[tokio::test]
async fn test_unreadable_count_is_a_metadata_error() {
    let (conn, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    conn.state.lock().count_value = Some(Value::String("many".into()));
    assert!(inspector.table_has_data("hosts").await.unwrap_err().is_metadata());

    conn.state.lock().count_value = Some(Value::Null);
    assert!(inspector.table_has_data("hosts").await.unwrap_err().is_metadata());
}

#[tokio::test]
async fn test_catalog_failure_is_never_reported_as_absent() {
    let (conn, inspector) = inspector(hosts_schema(IdentifierCase::Upper));
    assert!(inspector.table_exists("hosts").await.unwrap());

    conn.state.lock().catalog_fails = true;
    let err = inspector.table_exists("hosts").await.unwrap_err();
    assert!(err.is_metadata());
    assert!(inspector.column_exists("hosts", "host_id").await.unwrap_err().is_metadata());
}

#[tokio::test]
async fn test_count_failure_propagates() {
    let (_, inspector) = inspector(hosts_schema(IdentifierCase::Upper).failing_on("COUNT"));
    assert!(inspector.table_has_data("hosts").await.unwrap_err().is_metadata());
}
