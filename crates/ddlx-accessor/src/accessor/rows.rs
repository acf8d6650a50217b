use ddlx_core::Value;
use ddlx_ddl::CopyStrategy;

use super::{Accessor, MutationOutcome};
use crate::AccessorResult;

impl Accessor {
    // Indexes

    pub async fn create_index<S: AsRef<str>>(
        &self,
        table: &str,
        name: &str,
        columns: &[S],
        unique: bool,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self
            .builder()
            .await?
            .create_index(table, name, columns, unique)?;
        if self.inspector.index_exists(table, name).await? {
            tracing::info!(index = %name, "Index already exists, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    pub async fn drop_index(
        &self,
        table: &str,
        name: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.drop_index(table, name)?;
        if !self.inspector.index_exists(table, name).await? {
            tracing::warn!(index = %name, table = %table, "Index not found, nothing to drop");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    // Sequences. Failures are always ignored.

    pub async fn create_sequence(
        &self,
        name: &str,
        start: i64,
        increment: i64,
    ) -> AccessorResult<MutationOutcome> {
        if !self.dialect.supports_sequences() {
            tracing::info!(sequence = %name, dialect = self.dialect.id(), "Sequences not supported, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        let sql = self.builder().await?.create_sequence(name, start, increment)?;
        self.run(&sql, true).await
    }

    pub async fn drop_sequence(&self, name: &str) -> AccessorResult<MutationOutcome> {
        if !self.dialect.supports_sequences() {
            tracing::info!(sequence = %name, dialect = self.dialect.id(), "Sequences not supported, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        let sql = self.builder().await?.drop_sequence(name)?;
        self.run(&sql, true).await
    }

    // Rows

    /// Insert one row. Returns whether a row was written; a column/value
    /// count mismatch fails before anything is sent.
    pub async fn insert_row<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        values: &[Value],
        ignore_failure: bool,
    ) -> AccessorResult<bool> {
        let statement = self.builder().await?.insert_row(table, columns, values)?;
        Ok(self
            .execute_statement(&statement.sql, &statement.params, ignore_failure)
            .await?
            .is_some_and(|r| r.affected_rows != 0))
    }

    /// `UPDATE table SET column = value [WHERE ...]`, returning the affected
    /// row count
    pub async fn update_table(
        &self,
        table: &str,
        column: &str,
        value: impl Into<Value>,
        where_clause: Option<&str>,
        ignore_failure: bool,
    ) -> AccessorResult<u64> {
        let statement = self.builder().await?.update_column(
            table,
            column,
            &value.into(),
            where_clause,
        )?;
        Ok(self
            .execute_statement(&statement.sql, &statement.params, ignore_failure)
            .await?
            .map(|r| r.affected_rows)
            .unwrap_or(0))
    }

    /// Copy every value of `from` into `to`. A binary source copied into a
    /// text column is decoded row by row instead of being assigned.
    pub async fn copy_column(
        &self,
        table: &str,
        from: &str,
        to: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let builder = self.builder().await?;
        let from_type = self.inspector.column_sql_type(table, from).await?;
        let to_type = self.inspector.column_sql_type(table, to).await?;

        let copy = if from_type.is_binary() && to_type.is_text() {
            let keys = self.inspector.primary_key_columns(table).await?;
            builder.binary_to_text_copy(table, from, to, &keys)?
        } else {
            CopyStrategy::Direct(builder.copy_column(table, from, to)?)
        };
        self.apply_copy(&copy, ignore_failure).await
    }
}
