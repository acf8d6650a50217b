//! Connection trait, the SQL executor every accessor operation runs through

use crate::{QueryResult, Result, SchemaIntrospection, StatementResult, Value};
use async_trait::async_trait;

/// Product identification reported by the database at connection time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product name as the driver reports it (e.g. "PostgreSQL", "Apache Derby")
    pub name: String,
    /// Major version of the server
    pub major_version: u32,
}

impl ProductInfo {
    pub fn new(name: impl Into<String>, major_version: u32) -> Self {
        Self {
            name: name.into(),
            major_version,
        }
    }
}

/// A database connection
///
/// Results are fully materialized before the call returns, so no cursor or
/// statement handle outlives a call on any path.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite")
    fn driver_name(&self) -> &str;

    /// Product name and major version, used to resolve the dialect
    fn product_info(&self) -> ProductInfo;

    /// Execute a statement that modifies data or schema
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Catalog the connection is currently attached to, when the database has one
    async fn current_catalog(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get schema introspection capabilities if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }
}
