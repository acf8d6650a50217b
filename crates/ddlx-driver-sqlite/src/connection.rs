//! SQL executor over a single rusqlite connection

use async_trait::async_trait;
use ddlx_core::{
    ColumnMeta, Connection, DbError, ProductInfo, QueryResult, Result, Row, SchemaIntrospection,
    StatementResult, Value,
};
use parking_lot::Mutex;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{Connection as RusqliteConnection, OpenFlags, ToSql, params_from_iter};
use std::sync::atomic::{AtomicBool, Ordering};

/// One SQLite database behind a lock; statements run one at a time
pub struct SqliteConnection {
    conn: Mutex<RusqliteConnection>,
    closed: AtomicBool,
}

impl SqliteConnection {
    /// Open a SQLite database; `:memory:` opens a private in-memory database
    pub fn open(path: &str) -> Result<Self> {
        tracing::info!(path = %path, "opening SQLite database");

        let opened = if path == ":memory:" {
            RusqliteConnection::open_in_memory()
        } else {
            RusqliteConnection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI,
            )
        };
        let conn = opened.map_err(|e| DbError::Connection(format!("cannot open '{}': {}", path, e)))?;

        // Enforce declared references
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| DbError::Connection(format!("cannot enable foreign keys on '{}': {}", path, e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            closed: AtomicBool::default(),
        })
    }

    /// Wait up to `timeout` for a locked database before failing
    pub fn set_busy_timeout(&self, timeout: std::time::Duration) -> Result<()> {
        self.conn
            .lock()
            .busy_timeout(timeout)
            .map_err(|e| DbError::Connection(format!("Failed to set busy timeout: {}", e)))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::Connection("connection is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    fn product_info(&self) -> ProductInfo {
        let major = rusqlite::version_number() / 1_000_000;
        ProductInfo::new("SQLite", major as u32)
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_open()?;
        let affected = self
            .conn
            .lock()
            .execute(sql, bind(params))
            .map_err(|e| DbError::execution(sql, e))?;

        tracing::debug!(affected_rows = affected, "statement executed");
        Ok(StatementResult::new(affected as u64))
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_open()?;
        let failed = |e: rusqlite::Error| DbError::execution(sql, e);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql).map_err(failed)?;

        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .map(|col| ColumnMeta::new(col.name(), col.decl_type().unwrap_or("")))
            .collect();
        let names: Vec<String> = columns.iter().map(|meta| meta.name.clone()).collect();

        let mut cursor = stmt.query(bind(params)).map_err(failed)?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.next().map_err(failed)? {
            let values = (0..names.len())
                .map(|idx| row.get_ref(idx).map(read_value))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(failed)?;
            rows.push(Row::new(names.clone(), values));
        }

        tracing::debug!(row_count = rows.len(), "query executed");
        Ok(QueryResult::new(columns, rows))
    }

    async fn current_catalog(&self) -> Result<Option<String>> {
        Ok(Some("main".to_string()))
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!("closing SQLite connection");
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

/// Binds a [`Value`] without copying it
struct Param<'a>(&'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(flag) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*flag))),
            Value::Int32(n) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*n))),
            Value::Int64(n) => ToSqlOutput::Owned(SqliteValue::Integer(*n)),
            Value::Float64(x) => ToSqlOutput::Owned(SqliteValue::Real(*x)),
            Value::Decimal(text) | Value::String(text) => {
                ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes()))
            }
            Value::Bytes(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
            Value::Timestamp(ts) => {
                ToSqlOutput::Owned(SqliteValue::Text(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
            }
        })
    }
}

fn bind(params: &[Value]) -> impl rusqlite::Params + '_ {
    params_from_iter(params.iter().map(Param))
}

/// Blobs stay bytes so binary columns can be told apart from text
fn read_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int64(n),
        ValueRef::Real(x) => Value::Float64(x),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}
