//! Schema inspector
//!
//! Read-only questions about the live schema, answered through the
//! connection's [`SchemaIntrospection`] catalog. Names are folded to the
//! case the database stores identifiers in before they are used as catalog
//! filters, and results are compared case-insensitively.
//!
//! A failing catalog lookup is reported as a metadata error. No check ever
//! answers "absent" because the catalog could not be read.

use std::collections::HashSet;
use std::sync::Arc;

use ddlx_core::{
    ColumnInfo, Connection, DbError, Dialect, ForeignKeyColumn, IdentifierCase,
    SchemaIntrospection, SqlType, TableType, Value, ValueKind,
};
use ddlx_ddl::{BuildError, BuilderConfig, StatementBuilder};
use tokio::sync::OnceCell;

use crate::{AccessorError, AccessorResult};

pub struct SchemaInspector {
    conn: Arc<dyn Connection>,
    dialect: Dialect,
    builder_config: BuilderConfig,
    case: OnceCell<IdentifierCase>,
}

impl SchemaInspector {
    pub fn new(conn: Arc<dyn Connection>, dialect: Dialect) -> Self {
        Self::with_builder_config(conn, dialect, BuilderConfig::default())
    }

    pub fn with_builder_config(
        conn: Arc<dyn Connection>,
        dialect: Dialect,
        builder_config: BuilderConfig,
    ) -> Self {
        Self {
            conn,
            dialect,
            builder_config,
            case: OnceCell::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn catalog(&self) -> AccessorResult<&dyn SchemaIntrospection> {
        self.conn.as_schema_introspection().ok_or_else(|| {
            AccessorError::Database(DbError::Metadata(format!(
                "driver '{}' does not expose a schema catalog",
                self.conn.driver_name()
            )))
        })
    }

    /// How the database stores unquoted identifiers. Looked up once per
    /// inspector; a configured case takes precedence over the lookup.
    pub async fn identifier_case(&self) -> AccessorResult<IdentifierCase> {
        if let Some(case) = self.builder_config.identifier_case {
            return Ok(case);
        }
        let case = self
            .case
            .get_or_try_init(|| async {
                let case = self
                    .catalog()?
                    .identifier_case()
                    .await
                    .map_err(|e| e.into_metadata("identifier case lookup failed"))?;
                tracing::debug!(?case, "resolved identifier case");
                Ok::<_, AccessorError>(case)
            })
            .await?;
        Ok(*case)
    }

    /// Statement builder for this dialect using the live identifier case
    pub async fn builder(&self) -> AccessorResult<StatementBuilder> {
        let case = self.identifier_case().await?;
        Ok(StatementBuilder::with_config(
            self.dialect,
            self.builder_config.with_identifier_case(case),
        ))
    }

    async fn fold(&self, name: &str) -> AccessorResult<String> {
        Ok(self.identifier_case().await?.apply(name))
    }

    pub async fn table_exists(&self, table: &str) -> AccessorResult<bool> {
        let folded = self.fold(table).await?;
        let tables = self
            .catalog()?
            .list_tables(Some(&folded))
            .await
            .map_err(|e| e.into_metadata(&format!("listing table {}", table)))?;
        Ok(tables
            .iter()
            .any(|t| t.table_type == TableType::Table && t.name.eq_ignore_ascii_case(table)))
    }

    /// Columns of `table`; `None` lists every column of every table
    pub async fn columns(&self, table: Option<&str>) -> AccessorResult<Vec<ColumnInfo>> {
        let folded = match table {
            Some(table) => Some(self.fold(table).await?),
            None => None,
        };
        self.catalog()?
            .get_columns(folded.as_deref(), None)
            .await
            .map_err(|e| e.into_metadata(&format!("listing columns of {}", table.unwrap_or("*"))).into())
    }

    pub async fn column_info(&self, table: &str, column: &str) -> AccessorResult<Option<ColumnInfo>> {
        let case = self.identifier_case().await?;
        let columns = self
            .catalog()?
            .get_columns(Some(&case.apply(table)), Some(&case.apply(column)))
            .await
            .map_err(|e| e.into_metadata(&format!("reading column {}.{}", table, column)))?;
        Ok(columns
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(column)))
    }

    pub async fn column_exists(&self, table: &str, column: &str) -> AccessorResult<bool> {
        Ok(self.column_info(table, column).await?.is_some())
    }

    /// True when every named column exists on `table`
    pub async fn columns_exist<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
    ) -> AccessorResult<bool> {
        let mut missing: HashSet<String> = columns
            .iter()
            .map(|c| c.as_ref().to_uppercase())
            .collect();
        for column in self.columns(Some(table)).await? {
            missing.remove(&column.name.to_uppercase());
        }
        if !missing.is_empty() {
            tracing::debug!(table = %table, ?missing, "columns not present");
        }
        Ok(missing.is_empty())
    }

    async fn require_column(&self, table: &str, column: &str) -> AccessorResult<ColumnInfo> {
        self.column_info(table, column).await?.ok_or_else(|| {
            AccessorError::Database(DbError::Metadata(format!(
                "column {}.{} does not exist",
                table, column
            )))
        })
    }

    pub async fn column_sql_type(&self, table: &str, column: &str) -> AccessorResult<SqlType> {
        Ok(self.require_column(table, column).await?.sql_type)
    }

    pub async fn is_column_nullable(&self, table: &str, column: &str) -> AccessorResult<bool> {
        Ok(self.require_column(table, column).await?.nullable)
    }

    /// Host value kind a column's values are read as
    pub async fn column_value_kind(&self, table: &str, column: &str) -> AccessorResult<ValueKind> {
        Ok(self.column_sql_type(table, column).await?.value_kind())
    }

    /// Primary key column names in key order
    pub async fn primary_key_columns(&self, table: &str) -> AccessorResult<Vec<String>> {
        let folded = self.fold(table).await?;
        let mut keys = self
            .catalog()?
            .get_primary_keys(Some(&folded))
            .await
            .map_err(|e| e.into_metadata(&format!("reading primary key of {}", table)))?;
        keys.sort_by_key(|k| k.key_seq);
        Ok(keys.into_iter().map(|k| k.column).collect())
    }

    /// Whether `table` has a primary key, or one that covers `column`
    pub async fn has_primary_key(&self, table: &str, column: Option<&str>) -> AccessorResult<bool> {
        let keys = self.primary_key_columns(table).await?;
        Ok(match column {
            Some(column) => keys.iter().any(|k| k.eq_ignore_ascii_case(column)),
            None => !keys.is_empty(),
        })
    }

    pub async fn imported_foreign_keys(&self, table: &str) -> AccessorResult<Vec<ForeignKeyColumn>> {
        let folded = self.fold(table).await?;
        self.catalog()?
            .get_imported_keys(Some(&folded))
            .await
            .map_err(|e| e.into_metadata(&format!("reading foreign keys of {}", table)).into())
    }

    pub async fn has_foreign_key_named(&self, table: &str, name: &str) -> AccessorResult<bool> {
        let found = self
            .imported_foreign_keys(table)
            .await?
            .iter()
            .any(|key| key.fk_name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)));
        if !found {
            tracing::debug!(table = %table, constraint = %name, "foreign key not found");
        }
        Ok(found)
    }

    /// Whether `table` has a foreign key whose columns reference
    /// `referenced_table` pairwise by position.
    ///
    /// Each catalog pair removes the matching entries from both lists only
    /// when they sit at the same index. A pair found at different indexes is
    /// reported and left in place, so columns listed in another order than
    /// the key declares never match.
    pub async fn has_foreign_key<S: AsRef<str>, R: AsRef<str>>(
        &self,
        table: &str,
        referenced_table: &str,
        key_columns: &[S],
        referenced_columns: &[R],
    ) -> AccessorResult<bool> {
        if key_columns.len() != referenced_columns.len() {
            return Err(BuildError::ReferenceCountMismatch {
                name: format!("{} -> {}", table, referenced_table),
                columns: key_columns.len(),
                references: referenced_columns.len(),
            }
            .into());
        }
        if key_columns.is_empty() {
            return Err(BuildError::EmptyColumnList(format!("{} -> {}", table, referenced_table)).into());
        }

        let case = self.identifier_case().await?;
        let pairs = self
            .catalog()?
            .get_cross_reference(Some(&case.apply(referenced_table)), Some(&case.apply(table)))
            .await
            .map_err(|e| {
                e.into_metadata(&format!(
                    "reading references from {} to {}",
                    table, referenced_table
                ))
            })?;

        let mut fk_columns: Vec<String> = key_columns.iter().map(|c| case.apply(c.as_ref())).collect();
        let mut pk_columns: Vec<String> = referenced_columns
            .iter()
            .map(|c| case.apply(c.as_ref()))
            .collect();

        for pair in &pairs {
            let fk_index = fk_columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&pair.fk_column));
            let pk_index = pk_columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&pair.pk_column));
            match (fk_index, pk_index) {
                (Some(fk), Some(pk)) if fk == pk => {
                    fk_columns.remove(fk);
                    pk_columns.remove(pk);
                }
                (Some(_), Some(_)) => {
                    tracing::warn!(
                        table = %table,
                        referenced_table = %referenced_table,
                        "Columns for FK constraint should be provided in exact order"
                    );
                }
                _ => {
                    tracing::debug!(
                        pk_column = %pair.pk_column,
                        fk_column = %pair.fk_column,
                        "column pair not among the requested columns, skipping"
                    );
                }
            }
        }

        Ok(!pairs.is_empty() && fk_columns.is_empty() && pk_columns.is_empty())
    }

    /// Whether a constraint called `name` exists on `table`, looked up in the
    /// database's own constraint catalog
    pub async fn has_constraint(&self, table: &str, name: &str) -> AccessorResult<bool> {
        let builder = self.builder().await?;
        let catalog = self
            .conn
            .current_catalog()
            .await
            .map_err(|e| e.into_metadata("reading current catalog"))?;
        let statement = builder.constraint_catalog_query(table, catalog.as_deref())?;
        let result = self
            .conn
            .query(&statement.sql, &statement.params)
            .await
            .map_err(|e| e.into_metadata(&format!("reading constraints of {}", table)))?;

        Ok(result.rows.iter().any(|row| {
            row.get_by_name("CONSTRAINT_NAME")
                .and_then(|v| v.as_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        }))
    }

    pub async fn index_exists(&self, table: &str, name: &str) -> AccessorResult<bool> {
        let folded = self.fold(table).await?;
        let indexes = self
            .catalog()?
            .get_indexes(Some(&folded))
            .await
            .map_err(|e| e.into_metadata(&format!("reading indexes of {}", table)))?;
        Ok(indexes.iter().any(|i| i.name.eq_ignore_ascii_case(name)))
    }

    /// Whether `table` holds at least one row
    pub async fn table_has_data(&self, table: &str) -> AccessorResult<bool> {
        let sql = self.builder().await?.count_rows(table)?;
        let result = self
            .conn
            .query(&sql, &[])
            .await
            .map_err(|e| e.into_metadata(&format!("counting rows of {}", table)))?;
        let count = result.scalar().and_then(row_count).ok_or_else(|| {
            DbError::Metadata(format!(
                "row count of {} is not a number: {:?}",
                table,
                result.scalar()
            ))
        })?;
        Ok(count > 0.0)
    }
}

/// A COUNT(*) value as the driver returned it
fn row_count(value: &Value) -> Option<f64> {
    match value {
        Value::Float64(count) => Some(*count),
        Value::Decimal(text) | Value::String(text) => text.trim().parse().ok(),
        other => other.as_i64().map(|count| count as f64),
    }
}

#[cfg(test)]
mod tests;
