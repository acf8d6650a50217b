//! Catalog introspection over SQLite pragma functions

use crate::SqliteConnection;
use async_trait::async_trait;
use ddlx_core::{
    ColumnInfo, Connection, ForeignKeyAction, ForeignKeyColumn, IdentifierCase, IndexInfo,
    PrimaryKeyColumn, Result, Row, SchemaIntrospection, SqlType, TableInfo, TableType, Value,
};

impl SqliteConnection {
    /// Tables matching `filter`, or every user table when it is `None`
    async fn table_names(&self, filter: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .list_tables(filter)
            .await?
            .into_iter()
            .filter(|t| t.table_type == TableType::Table)
            .map(|t| t.name)
            .collect())
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let result = self
            .query(
                "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
                &[Value::from(table)],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .map(|row| {
                let data_type = text(row, 2);
                ColumnInfo {
                    table: table.to_string(),
                    name: text(row, 1),
                    ordinal: int(row, 0) as usize + 1,
                    sql_type: SqlType::from_type_name(&data_type),
                    max_length: declared_length(&data_type),
                    nullable: int(row, 3) == 0,
                    default_value: row.get(4).filter(|v| !v.is_null()).map(|v| v.to_string()),
                    data_type,
                }
            })
            .collect())
    }

    async fn table_primary_key(&self, table: &str) -> Result<Vec<PrimaryKeyColumn>> {
        let result = self
            .query(
                "SELECT name, pk FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk",
                &[Value::from(table)],
            )
            .await?;

        Ok(result
            .rows
            .iter()
            .map(|row| PrimaryKeyColumn {
                table: table.to_string(),
                column: text(row, 0),
                constraint_name: None,
                key_seq: int(row, 1) as usize,
            })
            .collect())
    }

    async fn table_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyColumn>> {
        let result = self
            .query(
                "SELECT id, seq, \"table\", \"from\", \"to\", on_delete \
                 FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
                &[Value::from(table)],
            )
            .await?;

        let mut keys = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let pk_table = text(row, 2);
            let seq = int(row, 1) as usize;
            // A NULL target column means the parent's primary key
            let pk_column = match row.get(4).and_then(Value::as_str) {
                Some(column) => column.to_string(),
                None => self
                    .table_primary_key(&pk_table)
                    .await?
                    .get(seq)
                    .map(|pk| pk.column.clone())
                    .unwrap_or_default(),
            };
            keys.push(ForeignKeyColumn {
                fk_name: None,
                fk_table: table.to_string(),
                fk_column: text(row, 3),
                pk_table,
                pk_column,
                key_seq: seq + 1,
                on_delete: ForeignKeyAction::parse(&text(row, 5)),
            });
        }
        Ok(keys)
    }

    async fn table_indexes(&self, table: &str) -> Result<Vec<IndexInfo>> {
        let list = self
            .query(
                "SELECT name, \"unique\" FROM pragma_index_list(?1)",
                &[Value::from(table)],
            )
            .await?;

        let mut indexes = Vec::with_capacity(list.rows.len());
        for row in &list.rows {
            let name = text(row, 0);
            let columns = self
                .query(
                    "SELECT name FROM pragma_index_info(?1) ORDER BY seqno",
                    &[Value::from(name.as_str())],
                )
                .await?
                .rows
                .iter()
                .map(|r| text(r, 0))
                .collect();
            indexes.push(IndexInfo {
                table: table.to_string(),
                name,
                columns,
                is_unique: int(row, 1) == 1,
            });
        }
        Ok(indexes)
    }
}

#[async_trait]
impl SchemaIntrospection for SqliteConnection {
    async fn identifier_case(&self) -> Result<IdentifierCase> {
        Ok(IdentifierCase::Verbatim)
    }

    #[tracing::instrument(skip(self))]
    async fn list_tables(&self, table: Option<&str>) -> Result<Vec<TableInfo>> {
        let mut sql = String::from(
            "SELECT name, type FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'",
        );
        let mut params = Vec::new();
        if let Some(table) = table {
            sql.push_str(" AND name = ?1 COLLATE NOCASE");
            params.push(Value::from(table));
        }
        sql.push_str(" ORDER BY name");

        let result = self.query(&sql, &params).await?;
        Ok(result
            .rows
            .iter()
            .map(|row| TableInfo {
                name: text(row, 0),
                table_type: if text(row, 1) == "view" {
                    TableType::View
                } else {
                    TableType::Table
                },
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_columns(
        &self,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<Vec<ColumnInfo>> {
        let mut columns = Vec::new();
        for name in self.table_names(table).await? {
            columns.extend(
                self.table_columns(&name)
                    .await?
                    .into_iter()
                    .filter(|c| column.is_none_or(|wanted| c.name.eq_ignore_ascii_case(wanted))),
            );
        }
        Ok(columns)
    }

    #[tracing::instrument(skip(self))]
    async fn get_primary_keys(&self, table: Option<&str>) -> Result<Vec<PrimaryKeyColumn>> {
        let mut keys = Vec::new();
        for name in self.table_names(table).await? {
            keys.extend(self.table_primary_key(&name).await?);
        }
        Ok(keys)
    }

    #[tracing::instrument(skip(self))]
    async fn get_imported_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyColumn>> {
        let mut keys = Vec::new();
        for name in self.table_names(table).await? {
            keys.extend(self.table_foreign_keys(&name).await?);
        }
        Ok(keys)
    }

    #[tracing::instrument(skip(self))]
    async fn get_cross_reference(
        &self,
        parent_table: Option<&str>,
        foreign_table: Option<&str>,
    ) -> Result<Vec<ForeignKeyColumn>> {
        Ok(self
            .get_imported_keys(foreign_table)
            .await?
            .into_iter()
            .filter(|key| parent_table.is_none_or(|parent| key.pk_table.eq_ignore_ascii_case(parent)))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_indexes(&self, table: Option<&str>) -> Result<Vec<IndexInfo>> {
        let mut indexes = Vec::new();
        for name in self.table_names(table).await? {
            indexes.extend(self.table_indexes(&name).await?);
        }
        Ok(indexes)
    }
}

fn text(row: &Row, idx: usize) -> String {
    row.get(idx)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn int(row: &Row, idx: usize) -> i64 {
    row.get(idx).and_then(Value::as_i64).unwrap_or(0)
}

/// Length declared in a type such as `VARCHAR(255)`
fn declared_length(data_type: &str) -> Option<u32> {
    let open = data_type.find('(')?;
    let close = data_type[open..].find(')')? + open;
    data_type[open + 1..close]
        .split(',')
        .next()
        .and_then(|n| n.trim().parse().ok())
}
