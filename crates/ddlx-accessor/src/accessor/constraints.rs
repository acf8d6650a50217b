use ddlx_ddl::{BuildError, ConstraintKind, ConstraintRef};

use super::{Accessor, MutationOutcome};
use crate::AccessorResult;

impl Accessor {
    /// Add any kind of constraint, with the existence check that kind uses
    pub async fn add_constraint(
        &self,
        constraint: &ConstraintRef,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        match constraint.kind {
            ConstraintKind::PrimaryKey => {
                self.add_primary_key(
                    &constraint.table,
                    &constraint.name,
                    &constraint.columns,
                    ignore_failure,
                )
                .await
            }
            ConstraintKind::Unique => {
                self.add_unique_constraint(
                    &constraint.table,
                    &constraint.name,
                    &constraint.columns,
                    ignore_failure,
                )
                .await
            }
            ConstraintKind::ForeignKey { .. } => self.add_foreign_key(constraint, ignore_failure).await,
        }
    }

    /// Add a primary key when the table has none and every key column exists
    pub async fn add_primary_key<S: AsRef<str>>(
        &self,
        table: &str,
        name: &str,
        columns: &[S],
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let constraint = ConstraintRef::primary_key(table, name, columns.iter().map(|c| c.as_ref()));
        let sql = self.builder().await?.add_constraint(&constraint)?;

        if !self.inspector.has_primary_key(table, None).await?
            && self.inspector.columns_exist(table, columns).await?
        {
            return self.run(&sql, ignore_failure).await;
        }
        tracing::warn!(
            constraint = %name,
            table = %table,
            columns = ?constraint.columns,
            "Primary constraint not added as a column is not present or the constraint already exists"
        );
        Ok(MutationOutcome::Skipped)
    }

    pub async fn add_unique_constraint<S: AsRef<str>>(
        &self,
        table: &str,
        name: &str,
        columns: &[S],
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let constraint = ConstraintRef::unique(table, name, columns.iter().map(|c| c.as_ref()));
        let sql = self.builder().await?.add_constraint(&constraint)?;

        if self.inspector.has_constraint(table, name).await? {
            tracing::info!(constraint = %name, "Unique constraint already exists, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    /// Add a foreign key unless one with the same columns, paired by
    /// position, already references the same table
    pub async fn add_foreign_key(
        &self,
        constraint: &ConstraintRef,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let ConstraintKind::ForeignKey {
            referenced_table,
            referenced_columns,
            ..
        } = &constraint.kind
        else {
            return Err(BuildError::ConstraintKindMismatch {
                name: constraint.name.clone(),
                expected: "foreign key",
            }
            .into());
        };
        let sql = self.builder().await?.add_constraint(constraint)?;

        if self
            .inspector
            .has_foreign_key(
                &constraint.table,
                referenced_table,
                &constraint.columns,
                referenced_columns,
            )
            .await?
        {
            tracing::info!(constraint = %constraint.name, "Foreign Key constraint already exists, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    pub async fn drop_foreign_key(
        &self,
        table: &str,
        name: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.drop_foreign_key(table, name)?;
        if !self.inspector.has_foreign_key_named(table, name).await? {
            tracing::warn!(constraint = %name, table = %table, "Constraint not found, nothing to drop");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    pub async fn drop_unique_constraint(
        &self,
        table: &str,
        name: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.drop_unique_constraint(table, name)?;
        if !self.inspector.has_constraint(table, name).await? {
            tracing::warn!(
                constraint = %name,
                table = %table,
                "Unique constraint not found, nothing to drop"
            );
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }

    /// Drop the table's primary key. Only Postgres and generic databases
    /// use `name`; the others drop whatever key the table has.
    pub async fn drop_primary_key(
        &self,
        table: &str,
        name: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        self.drop_primary_key_where(table, name, None, ignore_failure).await
    }

    /// Drop the primary key only if it covers `column`
    pub async fn drop_primary_key_on_column(
        &self,
        table: &str,
        name: &str,
        column: &str,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        self.drop_primary_key_where(table, name, Some(column), ignore_failure)
            .await
    }

    async fn drop_primary_key_where(
        &self,
        table: &str,
        name: &str,
        column: Option<&str>,
        ignore_failure: bool,
    ) -> AccessorResult<MutationOutcome> {
        let sql = self.builder().await?.drop_primary_key(table, name)?;
        if !self.inspector.has_primary_key(table, column).await? {
            tracing::warn!(table = %table, "Primary key doesn't exist, skipping");
            return Ok(MutationOutcome::Skipped);
        }
        self.run(&sql, ignore_failure).await
    }
}
