//! In-memory connection that records statements and answers catalog lookups
//! from state the test sets up

use async_trait::async_trait;
use ddlx_core::{
    ColumnInfo, ColumnMeta, Connection, DbError, ForeignKeyAction, ForeignKeyColumn,
    IdentifierCase, IndexInfo, PrimaryKeyColumn, ProductInfo, QueryResult, Result, Row,
    SchemaIntrospection, SqlType, StatementResult, TableInfo, TableType, Value,
};
use parking_lot::Mutex;

#[derive(Default)]
pub(crate) struct FakeState {
    pub executed: Vec<String>,
    pub params: Vec<Vec<Value>>,
    pub tables: Vec<String>,
    pub columns: Vec<ColumnInfo>,
    pub primary_keys: Vec<PrimaryKeyColumn>,
    pub foreign_keys: Vec<ForeignKeyColumn>,
    pub constraints: Vec<String>,
    pub indexes: Vec<IndexInfo>,
    pub row_count: i64,
    /// Answers COUNT(*) instead of `row_count` when set
    pub count_value: Option<Value>,
    /// Rows answered for any other SELECT
    pub select_rows: Vec<Vec<Value>>,
    /// Statements containing any of these fragments are rejected
    pub fail_on: Vec<String>,
    pub catalog_fails: bool,
    pub case_lookups: usize,
    pub affected_rows: u64,
}

pub(crate) struct FakeConnection {
    product: ProductInfo,
    case: IdentifierCase,
    pub state: Mutex<FakeState>,
}

impl FakeConnection {
    pub fn new(product: &str, case: IdentifierCase) -> Self {
        Self {
            product: ProductInfo::new(product, 1),
            case,
            state: Mutex::new(FakeState {
                affected_rows: 1,
                ..FakeState::default()
            }),
        }
    }

    pub fn with_table(self, table: &str, columns: &[(&str, &str, bool)]) -> Self {
        {
            let mut state = self.state.lock();
            state.tables.push(table.to_string());
            for (i, (name, ty, nullable)) in columns.iter().enumerate() {
                state.columns.push(ColumnInfo {
                    table: table.to_string(),
                    name: name.to_string(),
                    ordinal: i + 1,
                    data_type: ty.to_string(),
                    sql_type: SqlType::from_type_name(ty),
                    nullable: *nullable,
                    default_value: None,
                    max_length: None,
                });
            }
        }
        self
    }

    pub fn with_primary_key(self, table: &str, columns: &[&str]) -> Self {
        self.state.lock().primary_keys.extend(columns.iter().enumerate().map(|(i, c)| {
            PrimaryKeyColumn {
                table: table.to_string(),
                column: c.to_string(),
                constraint_name: None,
                key_seq: i + 1,
            }
        }));
        self
    }

    pub fn with_foreign_key(
        self,
        name: &str,
        table: &str,
        columns: &[&str],
        referenced_table: &str,
        referenced_columns: &[&str],
    ) -> Self {
        self.state.lock().foreign_keys.extend(
            columns
                .iter()
                .zip(referenced_columns)
                .enumerate()
                .map(|(i, (fk, pk))| ForeignKeyColumn {
                    fk_name: Some(name.to_string()),
                    fk_table: table.to_string(),
                    fk_column: fk.to_string(),
                    pk_table: referenced_table.to_string(),
                    pk_column: pk.to_string(),
                    key_seq: i + 1,
                    on_delete: ForeignKeyAction::NoAction,
                }),
        );
        self
    }

    pub fn with_constraint(self, name: &str) -> Self {
        self.state.lock().constraints.push(name.to_string());
        self
    }

    pub fn failing_on(self, fragment: &str) -> Self {
        self.state.lock().fail_on.push(fragment.to_string());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    fn catalog_error(&self) -> Result<()> {
        if self.state.lock().catalog_fails {
            return Err(DbError::execution("catalog", "catalog unavailable"));
        }
        Ok(())
    }
}

fn matches(filter: Option<&str>, name: &str) -> bool {
    filter.is_none_or(|f| f.eq_ignore_ascii_case(name))
}

#[async_trait]
impl Connection for FakeConnection {
    fn driver_name(&self) -> &str {
        "fake"
    }

    fn product_info(&self) -> ProductInfo {
        self.product.clone()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let mut state = self.state.lock();
        if state.fail_on.iter().any(|f| sql.contains(f.as_str())) {
            return Err(DbError::execution(sql, "rejected"));
        }
        state.executed.push(sql.to_string());
        state.params.push(params.to_vec());
        Ok(StatementResult::new(state.affected_rows))
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        let state = self.state.lock();
        if state.fail_on.iter().any(|f| sql.contains(f.as_str())) {
            return Err(DbError::execution(sql, "rejected"));
        }
        if sql.contains("CONSTRAINT_NAME") {
            let columns = vec!["CONSTRAINT_NAME".to_string()];
            let rows = state
                .constraints
                .iter()
                .map(|c| Row::new(columns.clone(), vec![Value::from(c.as_str())]))
                .collect();
            return Ok(QueryResult::new(vec![ColumnMeta::new("CONSTRAINT_NAME", "VARCHAR")], rows));
        }
        if sql.starts_with("SELECT COUNT(*)") {
            let columns = vec!["COUNT(*)".to_string()];
            return Ok(QueryResult::new(
                vec![ColumnMeta::new("COUNT(*)", "INTEGER")],
                vec![Row::new(
                    columns,
                    vec![state.count_value.clone().unwrap_or(Value::Int64(state.row_count))],
                )],
            ));
        }
        let rows = state
            .select_rows
            .iter()
            .map(|values| {
                let columns = (0..values.len()).map(|i| format!("c{}", i)).collect();
                Row::new(columns, values.clone())
            })
            .collect();
        Ok(QueryResult::new(Vec::new(), rows))
    }

    async fn current_catalog(&self) -> Result<Option<String>> {
        Ok(Some("ambari".to_string()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

#[async_trait]
impl SchemaIntrospection for FakeConnection {
    async fn identifier_case(&self) -> Result<IdentifierCase> {
        self.catalog_error()?;
        self.state.lock().case_lookups += 1;
        Ok(self.case)
    }

    async fn list_tables(&self, table: Option<&str>) -> Result<Vec<TableInfo>> {
        self.catalog_error()?;
        Ok(self
            .state
            .lock()
            .tables
            .iter()
            .filter(|t| matches(table, t))
            .map(|t| TableInfo {
                name: t.clone(),
                table_type: TableType::Table,
            })
            .collect())
    }

    async fn get_columns(
        &self,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<Vec<ColumnInfo>> {
        self.catalog_error()?;
        Ok(self
            .state
            .lock()
            .columns
            .iter()
            .filter(|c| matches(table, &c.table) && matches(column, &c.name))
            .cloned()
            .collect())
    }

    async fn get_primary_keys(&self, table: Option<&str>) -> Result<Vec<PrimaryKeyColumn>> {
        self.catalog_error()?;
        Ok(self
            .state
            .lock()
            .primary_keys
            .iter()
            .filter(|k| matches(table, &k.table))
            .cloned()
            .collect())
    }

    async fn get_imported_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyColumn>> {
        self.catalog_error()?;
        Ok(self
            .state
            .lock()
            .foreign_keys
            .iter()
            .filter(|k| matches(table, &k.fk_table))
            .cloned()
            .collect())
    }

    async fn get_cross_reference(
        &self,
        parent_table: Option<&str>,
        foreign_table: Option<&str>,
    ) -> Result<Vec<ForeignKeyColumn>> {
        self.catalog_error()?;
        Ok(self
            .state
            .lock()
            .foreign_keys
            .iter()
            .filter(|k| matches(parent_table, &k.pk_table) && matches(foreign_table, &k.fk_table))
            .cloned()
            .collect())
    }

    async fn get_indexes(&self, table: Option<&str>) -> Result<Vec<IndexInfo>> {
        self.catalog_error()?;
        Ok(self
            .state
            .lock()
            .indexes
            .iter()
            .filter(|i| matches(table, &i.table))
            .cloned()
            .collect())
    }
}
