use ddlx_core::{AbstractType, DatabaseType, DbError, SqlType, Value};
use ddlx_ddl::{AlterColumnPlan, ColumnRewrite, ColumnSpec, CopyStrategy};

use super::{Accessor, MutationOutcome};
use crate::AccessorResult;

impl Accessor {
    /// Add `column` unless `table` already has it. A default value is
    /// backfilled into existing rows.
    pub async fn add_column(
        &self,
        table: &str,
        column: &ColumnSpec,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let batch = self.builder().await?.add_column(table, column)?;
        if self.inspector.column_exists(table, &column.name).await? {
            tracing::info!(table = %table, column = %column.name, "Column already exists, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        self.run_batch(&batch, ignore_failure).await
    }

    pub async fn drop_column(
        &self,
        table: &str,
        column: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.drop_column(table, column)?;
        if !self.inspector.column_exists(table, column).await? {
            tracing::info!(table = %table, column = %column, "Column does not exist, nothing to drop");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    /// Rename `old_name` to `column.name`. MySQL restates the whole column
    /// definition, so `column` carries the type as well.
    pub async fn rename_column(
        &self,
        table: &str,
        old_name: &str,
        column: &ColumnSpec,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.rename_column(table, old_name, column)?;
        self.run(&sql, ignore_failure).await
    }

    /// Change the type of `column` to the one it describes.
    ///
    /// Dialects that cannot do this in place get the column rebuilt through
    /// a `_TMP` column. Row count and non-null values survive the rebuild.
    pub async fn alter_column(
        &self,
        table: &str,
        column: &ColumnSpec,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let builder = self.builder().await?;
        let plan = if self.dialect.supports_column_type_change() {
            builder.alter_column(table, column, SqlType::Other, &[])?
        } else {
            column.validate()?;
            let current_type = self.inspector.column_sql_type(table, &column.name).await?;
            let key_columns = self.inspector.primary_key_columns(table).await?;
            builder.alter_column(table, column, current_type, &key_columns)?
        };

        match plan {
            AlterColumnPlan::InPlace(sql) => self.run(&sql, ignore_failure).await,
            AlterColumnPlan::Rewrite(rewrite) => self.apply_rewrite(&rewrite, ignore_failure).await,
        }
    }

    /// Change a column's type given its current abstract type. Oracle turns
    /// a string column into a character-array column through a `_temp`
    /// column; everything else goes through [`alter_column`](Self::alter_column).
    pub async fn change_column_type(
        &self,
        table: &str,
        from: AbstractType,
        to: &ColumnSpec,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        if self.database_type() == DatabaseType::Oracle
            && from == AbstractType::String
            && to.ty == AbstractType::CharArray
        {
            let rewrite = self.builder().await?.char_array_detour(table, to)?;
            return self.apply_rewrite(&rewrite, ignore_failure).await;
        }
        self.alter_column(table, to, ignore_failure).await
    }

    /// Add, copy, drop, rename, in that order. Nothing is dropped unless the
    /// copy went through. Once the rename is done the type change stands,
    /// so a rejected NOT NULL or default is reported, not raised.
    async fn apply_rewrite(
        &self,
        rewrite: &ColumnRewrite,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        tracing::info!(temporary = %rewrite.temporary, "rebuilding column");

        if self.run(&rewrite.add_temporary, ignore_failure).await? == MutationOutcome::FailureIgnored {
            return Ok(MutationOutcome::FailureIgnored);
        }
        if self.apply_copy(&rewrite.copy, ignore_failure).await? == MutationOutcome::FailureIgnored {
            tracing::warn!(
                temporary = %rewrite.temporary,
                "copy into temporary column failed, original column kept"
            );
            return Ok(MutationOutcome::FailureIgnored);
        }
        for sql in [rewrite.drop_original.as_str(), rewrite.rename.as_str()] {
            if self.run(sql, ignore_failure).await? == MutationOutcome::FailureIgnored {
                return Ok(MutationOutcome::FailureIgnored);
            }
        }

        let mut outcome = MutationOutcome::Applied;
        for sql in rewrite.restorations() {
            if self.run(sql, true).await? == MutationOutcome::FailureIgnored {
                tracing::warn!(
                    sql = %sql,
                    "column type changed but its attributes were not restored"
                );
                outcome = MutationOutcome::AppliedWithoutAttributes;
            }
        }
        Ok(outcome)
    }

    pub(super) async fn apply_copy(
        &self,
        copy: &CopyStrategy,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        match copy {
            CopyStrategy::Direct(sql) => self.run(sql, ignore_failure).await,
            CopyStrategy::BinaryToText {
                select,
                update,
                key_columns,
            } => {
                self.copy_binary_to_text(select, update, key_columns.is_empty(), ignore_failure)
                    .await
            }
        }
    }

    /// Read each binary value, decode it as UTF-8 and write it back as text
    async fn copy_binary_to_text(
        &self,
        select: &str,
        update: &str,
        keyless: bool,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        tracing::info!(sql = %select, "Executing query");
        let rows = match self.conn.query(select, &[]).await {
            Ok(result) => result.rows,
            Err(e) if ignore_failure && e.is_execution() => {
                tracing::warn!(sql = %select, error = %e, "Error executing query, ignored");
                return Ok(MutationOutcome::FailureIgnored);
            }
            Err(e) => {
                tracing::error!(sql = %select, error = %e, "Error executing query");
                return Err(e.into());
            }
        };

        let mut converted = 0usize;
        for row in rows {
            let Some((source, keys)) = row.values.split_last() else {
                continue;
            };
            let text = match source {
                Value::Null => continue,
                Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                other => other.to_string(),
            };

            let mut params = vec![Value::String(text)];
            if keyless {
                params.push(source.clone());
            } else {
                params.extend(keys.iter().cloned());
            }
            if self.execute_statement(update, &params, ignore_failure).await?.is_none() {
                return Ok(MutationOutcome::FailureIgnored);
            }
            converted += 1;
        }
        tracing::debug!(rows = converted, "binary values converted to text");
        Ok(MutationOutcome::Applied)
    }

    /// Set or drop NOT NULL. A column already in the requested state is
    /// left alone.
    pub async fn set_column_nullable(
        &self,
        table: &str,
        column: &str,
        nullable: bool,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let info = self.inspector.column_info(table, column).await?.ok_or_else(|| {
            DbError::Metadata(format!("column {}.{} does not exist", table, column))
        })?;
        if info.nullable == nullable {
            tracing::info!(
                table = %table,
                column = %column,
                state = if nullable { "nullable" } else { "not nullable" },
                "Column nullability is already in the requested state, skipping"
            );
            return Ok(MutationOutcome::Skipped);
        }
        let sql = self
            .builder()
            .await?
            .set_nullable(table, column, Some(&info.data_type), nullable)?;
        self.run(&sql, ignore_failure).await
    }
}
