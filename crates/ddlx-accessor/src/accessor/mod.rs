//! Accessor facade
//!
//! Every mutating call takes an `ignore_failure` flag. When it is set, a
//! statement the database rejects is logged and swallowed and the call
//! reports [`MutationOutcome::FailureIgnored`]; otherwise the error reaches
//! the caller. Build errors and metadata errors are never swallowed.

mod columns;
mod constraints;
mod rows;


use std::path::Path;
use std::sync::Arc;

use ddlx_core::{
    Connection, ConnectionConfig, DatabaseDriver, DatabaseType, DbError, Dialect, QueryResult,
    StatementResult, Value,
};
use ddlx_ddl::{BuilderConfig, StatementBatch, StatementBuilder, TableSpec};

use crate::{AccessorResult, ScriptSummary, SchemaInspector, split_script};

/// What a mutating call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The statements ran
    Applied,
    /// The schema was already in the requested state
    Skipped,
    /// A statement failed and the failure was swallowed
    FailureIgnored,
    /// A column was rebuilt with its new type, but restoring NOT NULL or
    /// its default afterwards was rejected
    AppliedWithoutAttributes,
}

impl MutationOutcome {
    /// Whether the requested schema change took effect
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            MutationOutcome::Applied | MutationOutcome::AppliedWithoutAttributes
        )
    }
}

/// Dialect-neutral schema operations over one connection
///
/// Calls run one statement at a time and do not lock; an accessor is not
/// meant to be shared between concurrent mutating callers.
pub struct Accessor {
    conn: Arc<dyn Connection>,
    driver: Option<Arc<dyn DatabaseDriver>>,
    config: ConnectionConfig,
    dialect: Dialect,
    inspector: SchemaInspector,
}

impl Accessor {
    /// Open a connection through `driver` and resolve its dialect
    #[tracing::instrument(skip(driver, config), fields(driver = driver.id(), url = %config.url))]
    pub async fn connect(
        driver: Arc<dyn DatabaseDriver>,
        config: ConnectionConfig,
    ) -> AccessorResult<Self> {
        config.validate()?;
        let conn = open(driver.as_ref(), &config).await?;
        let mut accessor = Self::new(conn, config);
        accessor.driver = Some(driver);
        Ok(accessor)
    }

    /// Wrap an established connection. The dialect comes from the product
    /// the connection reports.
    pub fn new(conn: Arc<dyn Connection>, config: ConnectionConfig) -> Self {
        let product = conn.product_info();
        let dialect = Dialect::resolve(&product.name, product.major_version);
        tracing::info!(
            product = %product.name,
            major_version = product.major_version,
            dialect = dialect.id(),
            "accessor ready"
        );
        Self {
            inspector: SchemaInspector::new(conn.clone(), dialect),
            conn,
            driver: None,
            config,
            dialect,
        }
    }

    pub fn with_builder_config(mut self, builder_config: BuilderConfig) -> Self {
        self.inspector =
            SchemaInspector::with_builder_config(self.conn.clone(), self.dialect, builder_config);
        self
    }

    /// A second, independent connection with the same configuration
    pub async fn new_connection(&self) -> AccessorResult<Arc<dyn Connection>> {
        let driver = self.driver.as_ref().ok_or_else(|| {
            DbError::Connection("accessor was not opened through a driver".to_string())
        })?;
        Ok(open(driver.as_ref(), &self.config).await?)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Database type declared in the configuration
    pub fn database_type(&self) -> DatabaseType {
        self.config.database_type()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub fn inspector(&self) -> &SchemaInspector {
        &self.inspector
    }

    pub fn quote_object_name(&self, name: &str) -> String {
        self.dialect.quote(name)
    }

    pub async fn close(&self) -> AccessorResult<()> {
        Ok(self.conn.close().await?)
    }

    async fn builder(&self) -> AccessorResult<StatementBuilder> {
        self.inspector.builder().await
    }

    /// Run one statement. `None` means it failed and the failure was ignored.
    async fn execute_statement(
        &self,
        sql: &str,
        params: &[Value],
        ignore_failure: bool,
    ) -> AccessorResult<Option<StatementResult>> {
        tracing::info!(sql = %sql, "Executing query");
        match self.conn.execute(sql, params).await {
            Ok(result) => Ok(Some(result)),
            Err(e) if ignore_failure && e.is_execution() => {
                tracing::warn!(sql = %sql, error = %e, "Error executing query, ignored");
                Ok(None)
            }
            Err(e) => {
                tracing::error!(sql = %sql, error = %e, "Error executing query");
                Err(e.into())
            }
        }
    }

    async fn run(&self, sql: &str, ignore_failure: bool) -> AccessorResult<MutationOutcome> {
        Ok(match self.execute_statement(sql, &[], ignore_failure).await? {
            Some(_) => MutationOutcome::Applied,
            None => MutationOutcome::FailureIgnored,
        })
    }

    /// Run statements in order, stopping at the first ignored failure
    async fn run_batch(
        &self,
        batch: &StatementBatch,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        for sql in batch.iter() {
            if self.run(sql, ignore_failure).await? == MutationOutcome::FailureIgnored {
                return Ok(MutationOutcome::FailureIgnored);
            }
        }
        Ok(MutationOutcome::Applied)
    }

    // Tables

    pub async fn create_table(
        &self,
        table: &TableSpec,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.create_table(table)?;
        if self.inspector.table_exists(&table.name).await? {
            tracing::info!(table = %table.name, "Table already exists, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    pub async fn drop_table(&self, table: &str, ignore_failure: bool) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.drop_table(table)?;
        if !self.inspector.table_exists(table).await? {
            tracing::info!(table = %table, "Table does not exist, nothing to drop");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    /// Delete every row of `table`
    pub async fn truncate_table(
        &self,
        table: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.truncate_table(table)?;
        self.run(&sql, ignore_failure).await
    }

    pub async fn table_exists(&self, table: &str) -> AccessorResult<bool> {
        self.inspector.table_exists(table).await
    }

    pub async fn table_has_data(&self, table: &str) -> AccessorResult<bool> {
        self.inspector.table_has_data(table).await
    }

    // Raw SQL. These bypass every existence check.

    /// Run a statement and return the affected row count; 0 when a failure
    /// was ignored
    pub async fn execute_update(&self, sql: &str, ignore_failure: bool) -> AccessorResult<u64> {
        Ok(self
            .execute_statement(sql, &[], ignore_failure)
            .await?
            .map(|r| r.affected_rows)
            .unwrap_or(0))
    }

    pub async fn execute_query(&self, sql: &str, ignore_failure: bool) -> AccessorResult<MutationOutcome> {
        self.run(sql, ignore_failure).await
    }

    /// Run `sql` only when `table` has `column`
    pub async fn execute_query_if_column(
        &self,
        sql: &str,
        table: &str,
        column: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        if !self.inspector.column_exists(table, column).await? {
            tracing::debug!(table = %table, column = %column, "column absent, statement not run");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(sql, ignore_failure).await
    }

    pub async fn execute_select(&self, sql: &str) -> AccessorResult<QueryResult> {
        tracing::debug!(sql = %sql, "Executing select");
        Ok(self.conn.query(sql, &[]).await?)
    }

    /// Run every statement of a script file. Failures are logged and
    /// counted; the script always runs to the end.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn execute_script(&self, path: impl AsRef<Path>) -> AccessorResult<ScriptSummary> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(DbError::from)?;

        let mut summary = ScriptSummary::default();
        for statement in split_script(&content) {
            match self.execute_statement(&statement, &[], true).await? {
                Some(_) => summary.executed += 1,
                None => summary.failed += 1,
            }
        }
        tracing::info!(
            executed = summary.executed,
            failed = summary.failed,
            "script finished"
        );
        Ok(summary)
    }
}

async fn open(
    driver: &dyn DatabaseDriver,
    config: &ConnectionConfig,
) -> AccessorResult<Arc<dyn Connection>> {
    driver.connect(config).await.map_err(|e| {
        tracing::error!(driver = driver.id(), error = %e, "connection failed");
        match e {
            DbError::Connection(_) => e.into(),
            other => DbError::Connection(format!("{}: {}", driver.name(), other)).into(),
        }
    })
}
