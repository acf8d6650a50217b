//! Statement rendering per operation

use super::{StatementBuilder, is_type_text};
use crate::{
    AlterColumnPlan, BoundStatement, BuildError, BuildResult, ColumnRewrite, ColumnSpec,
    ConstraintKind, ConstraintRef, CopyStrategy, StatementBatch, TableSpec,
};
use ddlx_core::{Dialect, SqlType, Value};

/// Suffix of the temporary column used when a column is rebuilt
pub const REWRITE_SUFFIX: &str = "_TMP";

/// Suffix of the temporary column used by the string to character-array detour
pub const DETOUR_SUFFIX: &str = "_temp";

impl StatementBuilder {
    // Tables

    pub fn create_table(&self, table: &TableSpec) -> BuildResult<String> {
        table.validate()?;

        let mut parts = table
            .columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect::<BuildResult<Vec<_>>>()?;
        if !table.primary_key.is_empty() {
            parts.push(format!(
                "PRIMARY KEY ({})",
                self.ident_list(&table.name, &table.primary_key)?
            ));
        }

        Ok(format!(
            "CREATE TABLE {} ({})",
            self.ident(&table.name)?,
            parts.join(", ")
        ))
    }

    pub fn drop_table(&self, table: &str) -> BuildResult<String> {
        Ok(format!("DROP TABLE {}", self.ident(table)?))
    }

    /// Removes every row; DELETE rather than TRUNCATE so it runs in a
    /// transaction on every dialect
    pub fn truncate_table(&self, table: &str) -> BuildResult<String> {
        Ok(format!("DELETE FROM {}", self.ident(table)?))
    }

    pub fn count_rows(&self, table: &str) -> BuildResult<String> {
        Ok(format!("SELECT COUNT(*) FROM {}", self.ident(table)?))
    }

    // Columns

    /// ADD COLUMN, plus a backfill UPDATE when the column has a default.
    /// A column with a default is always added nullable so existing rows
    /// do not violate it before the backfill runs.
    pub fn add_column(&self, table: &str, column: &ColumnSpec) -> BuildResult<StatementBatch> {
        let mut added = column.clone();
        if column.default_value.is_some() {
            added.nullable = true;
        }

        let mut batch = StatementBatch::single(format!(
            "ALTER TABLE {} {} {}",
            self.ident(table)?,
            self.add_keyword(),
            self.column_definition(&added)?
        ));
        if let Some(default) = &column.default_value {
            batch.push(format!(
                "UPDATE {} SET {} = {}",
                self.ident(table)?,
                self.ident(&column.name)?,
                self.literal(default)?
            ));
        }
        Ok(batch)
    }

    fn add_keyword(&self) -> &'static str {
        match self.dialect {
            Dialect::Oracle => "ADD",
            _ => "ADD COLUMN",
        }
    }

    pub fn drop_column(&self, table: &str, column: &str) -> BuildResult<String> {
        Ok(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.ident(table)?,
            self.ident(column)?
        ))
    }

    /// Rename `old_name` to `column.name`. MySQL restates the whole column
    /// definition, the other dialects only use the names.
    pub fn rename_column(
        &self,
        table: &str,
        old_name: &str,
        column: &ColumnSpec,
    ) -> BuildResult<String> {
        let table_ident = self.ident(table)?;
        let old_ident = self.ident(old_name)?;
        match self.dialect {
            Dialect::MySql => Ok(format!(
                "ALTER TABLE {} CHANGE {} {}",
                table_ident,
                old_ident,
                self.column_definition(column)?
            )),
            Dialect::Derby => Ok(format!(
                "RENAME COLUMN {}.{} TO {}",
                table_ident,
                old_ident,
                self.ident(&column.name)?
            )),
            Dialect::Oracle | Dialect::Postgres | Dialect::Generic => Ok(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                table_ident,
                old_ident,
                self.ident(&column.name)?
            )),
        }
    }

    /// Plan a type change of `column` whose current catalog type is
    /// `current_type`.
    ///
    /// `key_columns` identify rows when a binary column has to be converted
    /// to text row by row. MySQL restates the whole column, default
    /// included. Oracle and Postgres change only the type and keep the
    /// column's current default.
    pub fn alter_column(
        &self,
        table: &str,
        column: &ColumnSpec,
        current_type: SqlType,
        key_columns: &[String],
    ) -> BuildResult<AlterColumnPlan> {
        if !self.dialect.supports_column_type_change() {
            return self
                .rewrite_column(table, column, current_type, REWRITE_SUFFIX, key_columns)
                .map(AlterColumnPlan::Rewrite);
        }

        let table_ident = self.ident(table)?;
        let column_ident = self.ident(&column.name)?;
        let native = self.native_type(column)?;
        let sql = match self.dialect {
            Dialect::Postgres => format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
                table_ident, column_ident, native
            ),
            Dialect::MySql => format!(
                "ALTER TABLE {} MODIFY {}",
                table_ident,
                self.column_definition(column)?
            ),
            Dialect::Oracle => format!("ALTER TABLE {} MODIFY {} {}", table_ident, column_ident, native),
            Dialect::Derby | Dialect::Generic => {
                return Err(BuildError::Unsupported {
                    operation: "in-place column type change",
                    dialect: self.dialect,
                });
            }
        };
        Ok(AlterColumnPlan::InPlace(sql))
    }

    /// The `_temp` detour that turns a string column into a character-array
    /// column on dialects that cannot convert it in place
    pub fn char_array_detour(&self, table: &str, column: &ColumnSpec) -> BuildResult<ColumnRewrite> {
        self.rewrite_column(table, column, SqlType::Varchar, DETOUR_SUFFIX, &[])
    }

    /// Add a temporary column shaped like `target`, copy into it, drop the
    /// original and rename the temporary column over it. The temporary
    /// column is nullable and has no default until the copy is done;
    /// NOT NULL and the default are restored after the rename.
    pub fn rewrite_column(
        &self,
        table: &str,
        target: &ColumnSpec,
        current_type: SqlType,
        suffix: &str,
        key_columns: &[String],
    ) -> BuildResult<ColumnRewrite> {
        target.validate()?;
        let temporary = format!("{}{}", target.name, suffix);

        let mut staged = target.renamed(&temporary).nullable(true);
        staged.default_value = None;
        let add_temporary = format!(
            "ALTER TABLE {} {} {}",
            self.ident(table)?,
            self.add_keyword(),
            self.column_definition(&staged)?
        );

        let copy = if current_type.is_binary() && !target.ty.is_binary() {
            self.binary_to_text_copy(table, &target.name, &temporary, key_columns)?
        } else {
            CopyStrategy::Direct(self.copy_column(table, &target.name, &temporary)?)
        };

        let restore_nullability = if target.nullable {
            None
        } else {
            let native = self.native_type(target)?;
            Some(self.set_nullable(table, &target.name, Some(&native), false)?)
        };
        let restore_default = match &target.default_value {
            Some(default) => Some(self.set_default(table, &target.name, default)?),
            None => None,
        };

        Ok(ColumnRewrite {
            add_temporary,
            copy,
            drop_original: self.drop_column(table, &target.name)?,
            rename: self.rename_column(table, &temporary, &staged.renamed(&target.name))?,
            restore_nullability,
            restore_default,
            temporary,
        })
    }

    /// Set or drop NOT NULL. MySQL restates the column type, so it needs
    /// `native_type`.
    pub fn set_nullable(
        &self,
        table: &str,
        column: &str,
        native_type: Option<&str>,
        nullable: bool,
    ) -> BuildResult<String> {
        let table_ident = self.ident(table)?;
        let column_ident = self.ident(column)?;
        let null_keyword = if nullable { "NULL" } else { "NOT NULL" };

        match self.dialect {
            Dialect::Postgres | Dialect::Generic => Ok(format!(
                "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL",
                table_ident,
                column_ident,
                if nullable { "DROP" } else { "SET" }
            )),
            Dialect::MySql => {
                let native = native_type.ok_or_else(|| BuildError::MissingType {
                    column: column.to_string(),
                    dialect: self.dialect,
                })?;
                if !is_type_text(native) {
                    return Err(BuildError::InvalidIdentifier(native.to_string()));
                }
                Ok(format!(
                    "ALTER TABLE {} MODIFY {} {} {}",
                    table_ident, column_ident, native, null_keyword
                ))
            }
            Dialect::Oracle => Ok(format!(
                "ALTER TABLE {} MODIFY {} {}",
                table_ident, column_ident, null_keyword
            )),
            Dialect::Derby => Ok(format!(
                "ALTER TABLE {} ALTER COLUMN {} {}",
                table_ident, column_ident, null_keyword
            )),
        }
    }

    /// Give a column a default for rows inserted from now on
    pub fn set_default(&self, table: &str, column: &str, default: &Value) -> BuildResult<String> {
        let table_ident = self.ident(table)?;
        let column_ident = self.ident(column)?;
        let literal = self.literal(default)?;
        Ok(match self.dialect {
            Dialect::Oracle => format!(
                "ALTER TABLE {} MODIFY {} DEFAULT {}",
                table_ident, column_ident, literal
            ),
            Dialect::Derby => format!(
                "ALTER TABLE {} ALTER COLUMN {} DEFAULT {}",
                table_ident, column_ident, literal
            ),
            Dialect::MySql | Dialect::Postgres | Dialect::Generic => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
                table_ident, column_ident, literal
            ),
        })
    }

    // Constraints

    pub fn add_constraint(&self, constraint: &ConstraintRef) -> BuildResult<String> {
        constraint.validate()?;
        let columns = self.ident_list(&constraint.name, &constraint.columns)?;
        let body = match &constraint.kind {
            ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({})", columns),
            ConstraintKind::Unique => format!("UNIQUE ({})", columns),
            ConstraintKind::ForeignKey {
                referenced_table,
                referenced_columns,
                cascade_on_delete,
            } => format!(
                "FOREIGN KEY ({}) REFERENCES {} ({}){}",
                columns,
                self.ident(referenced_table)?,
                self.ident_list(&constraint.name, referenced_columns)?,
                if *cascade_on_delete { " ON DELETE CASCADE" } else { "" }
            ),
        };
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}",
            self.ident(&constraint.table)?,
            self.ident(&constraint.name)?,
            body
        ))
    }

    pub fn drop_foreign_key(&self, table: &str, name: &str) -> BuildResult<String> {
        let keyword = match self.dialect {
            Dialect::MySql => "FOREIGN KEY",
            _ => "CONSTRAINT",
        };
        Ok(format!(
            "ALTER TABLE {} DROP {} {}",
            self.ident(table)?,
            keyword,
            self.ident(name)?
        ))
    }

    pub fn drop_unique_constraint(&self, table: &str, name: &str) -> BuildResult<String> {
        let keyword = match self.dialect {
            Dialect::MySql => "INDEX",
            _ => "CONSTRAINT",
        };
        Ok(format!(
            "ALTER TABLE {} DROP {} {}",
            self.ident(table)?,
            keyword,
            self.ident(name)?
        ))
    }

    /// Drop the primary key. Oracle, MySQL and Derby drop the table's key
    /// without naming it, so `name` only matters where
    /// [`Dialect::drop_primary_key_uses_name`] holds.
    pub fn drop_primary_key(&self, table: &str, name: &str) -> BuildResult<String> {
        let table_ident = self.ident(table)?;
        if self.dialect.drop_primary_key_uses_name() {
            Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                table_ident,
                self.ident(name)?
            ))
        } else {
            tracing::debug!(
                dialect = self.dialect.id(),
                constraint = %name,
                "primary key dropped without its name"
            );
            Ok(format!("ALTER TABLE {} DROP PRIMARY KEY", table_ident))
        }
    }

    /// Lists the constraint names of `table` as a `CONSTRAINT_NAME` column.
    /// `catalog` narrows the lookup where the catalog views span databases.
    pub fn constraint_catalog_query(
        &self,
        table: &str,
        catalog: Option<&str>,
    ) -> BuildResult<BoundStatement> {
        if table.trim().is_empty() {
            return Err(BuildError::InvalidIdentifier(table.to_string()));
        }
        let folded = Value::String(self.identifier_case().apply(table));
        let p = |index| self.dialect.placeholder(index);

        let statement = match self.dialect {
            Dialect::Oracle => BoundStatement::new(
                format!(
                    "SELECT CONSTRAINT_NAME FROM USER_CONSTRAINTS WHERE TABLE_NAME = {}",
                    p(1)
                ),
                vec![folded],
            ),
            Dialect::Derby => BoundStatement::new(
                format!(
                    "SELECT c.CONSTRAINTNAME AS CONSTRAINT_NAME FROM SYS.SYSCONSTRAINTS c \
                     JOIN SYS.SYSTABLES t ON c.TABLEID = t.TABLEID WHERE t.TABLENAME = {}",
                    p(1)
                ),
                vec![folded],
            ),
            Dialect::MySql => match catalog {
                Some(catalog) => BoundStatement::new(
                    format!(
                        "SELECT CONSTRAINT_NAME FROM information_schema.TABLE_CONSTRAINTS \
                         WHERE TABLE_SCHEMA = {} AND UPPER(TABLE_NAME) = UPPER({})",
                        p(1),
                        p(2)
                    ),
                    vec![Value::String(catalog.to_string()), folded],
                ),
                None => BoundStatement::new(
                    format!(
                        "SELECT CONSTRAINT_NAME FROM information_schema.TABLE_CONSTRAINTS \
                         WHERE TABLE_SCHEMA = DATABASE() AND UPPER(TABLE_NAME) = UPPER({})",
                        p(1)
                    ),
                    vec![folded],
                ),
            },
            Dialect::Postgres | Dialect::Generic => match catalog {
                Some(catalog) => BoundStatement::new(
                    format!(
                        "SELECT constraint_name AS CONSTRAINT_NAME FROM information_schema.table_constraints \
                         WHERE table_catalog = {} AND UPPER(table_name) = UPPER({})",
                        p(1),
                        p(2)
                    ),
                    vec![Value::String(catalog.to_string()), folded],
                ),
                None => BoundStatement::new(
                    format!(
                        "SELECT constraint_name AS CONSTRAINT_NAME FROM information_schema.table_constraints \
                         WHERE UPPER(table_name) = UPPER({})",
                        p(1)
                    ),
                    vec![folded],
                ),
            },
        };
        Ok(statement)
    }

    // Indexes and sequences

    pub fn create_index<S: AsRef<str>>(
        &self,
        table: &str,
        name: &str,
        columns: &[S],
        unique: bool,
    ) -> BuildResult<String> {
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.ident(name)?,
            self.ident(table)?,
            self.ident_list(name, columns)?
        ))
    }

    pub fn drop_index(&self, table: &str, name: &str) -> BuildResult<String> {
        match self.dialect {
            Dialect::MySql => Ok(format!(
                "DROP INDEX {} ON {}",
                self.ident(name)?,
                self.ident(table)?
            )),
            _ => Ok(format!("DROP INDEX {}", self.ident(name)?)),
        }
    }

    pub fn create_sequence(&self, name: &str, start: i64, increment: i64) -> BuildResult<String> {
        self.require_sequences()?;
        Ok(format!(
            "CREATE SEQUENCE {} START WITH {} INCREMENT BY {}",
            self.ident(name)?,
            start,
            increment
        ))
    }

    pub fn drop_sequence(&self, name: &str) -> BuildResult<String> {
        self.require_sequences()?;
        let name = self.ident(name)?;
        match self.dialect {
            Dialect::Derby => Ok(format!("DROP SEQUENCE {} RESTRICT", name)),
            _ => Ok(format!("DROP SEQUENCE {}", name)),
        }
    }

    fn require_sequences(&self) -> BuildResult<()> {
        if self.dialect.supports_sequences() {
            Ok(())
        } else {
            Err(BuildError::Unsupported {
                operation: "sequences",
                dialect: self.dialect,
            })
        }
    }

    // Rows

    pub fn insert_row<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        values: &[Value],
    ) -> BuildResult<BoundStatement> {
        if columns.len() != values.len() {
            return Err(BuildError::ValueCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        let placeholders = (1..=values.len())
            .map(|index| self.dialect.placeholder(index))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(BoundStatement::new(
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.ident(table)?,
                self.ident_list(table, columns)?,
                placeholders
            ),
            values.to_vec(),
        ))
    }

    /// `UPDATE t SET c = ?` with an optional caller-supplied WHERE condition
    pub fn update_column(
        &self,
        table: &str,
        column: &str,
        value: &Value,
        where_clause: Option<&str>,
    ) -> BuildResult<BoundStatement> {
        let mut sql = format!(
            "UPDATE {} SET {} = {}",
            self.ident(table)?,
            self.ident(column)?,
            self.dialect.placeholder(1)
        );
        if let Some(condition) = where_clause.map(str::trim).filter(|c| !c.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        Ok(BoundStatement::new(sql, vec![value.clone()]))
    }

    pub fn copy_column(&self, table: &str, from: &str, to: &str) -> BuildResult<String> {
        Ok(format!(
            "UPDATE {} SET {} = {}",
            self.ident(table)?,
            self.ident(to)?,
            self.ident(from)?
        ))
    }

    pub fn binary_to_text_copy<S: AsRef<str>>(
        &self,
        table: &str,
        source: &str,
        target: &str,
        key_columns: &[S],
    ) -> BuildResult<CopyStrategy> {
        let table_ident = self.ident(table)?;
        let source_ident = self.ident(source)?;
        let target_ident = self.ident(target)?;

        let keys = key_columns
            .iter()
            .map(|key| self.ident(key.as_ref()))
            .collect::<BuildResult<Vec<_>>>()?;
        if keys.is_empty() && !self.dialect.compares_lobs() {
            return Err(BuildError::Unsupported {
                operation: "binary to text copy without key columns",
                dialect: self.dialect,
            });
        }
        let (selected, conditions) = if keys.is_empty() {
            (
                source_ident.clone(),
                format!("{} = {}", source_ident, self.dialect.placeholder(2)),
            )
        } else {
            let conditions = keys
                .iter()
                .enumerate()
                .map(|(i, key)| format!("{} = {}", key, self.dialect.placeholder(i + 2)))
                .collect::<Vec<_>>()
                .join(" AND ");
            (format!("{}, {}", keys.join(", "), source_ident), conditions)
        };

        Ok(CopyStrategy::BinaryToText {
            select: format!(
                "SELECT {} FROM {} WHERE {} IS NOT NULL",
                selected, table_ident, source_ident
            ),
            update: format!(
                "UPDATE {} SET {} = {} WHERE {}",
                table_ident,
                target_ident,
                self.dialect.placeholder(1),
                conditions
            ),
            key_columns: key_columns.iter().map(|k| k.as_ref().to_string()).collect(),
        })
    }
}
