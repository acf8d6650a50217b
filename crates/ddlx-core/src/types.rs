//! Core types for ddlx

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A database value that can be bound as a parameter or read from a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// Exact numeric, kept as text
    Decimal(String),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Timestamp without timezone
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Whether this is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow text values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::Bool(v) => Some(*v as i64),
            Value::Decimal(s) | Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int32(v) => Some(*v != 0),
            Value::Int64(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Try to get as raw bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Timestamp(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One result row; values are positional, names are kept for lookup
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values
    pub values: Vec<Value>,
    columns: Vec<String>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Value at a column position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name, ignoring case
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|idx| self.values.get(idx))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn to_map(&self) -> HashMap<String, Value> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Result column metadata
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnMeta {
    pub name: String,
    /// Data type as declared by the database
    #[serde(default)]
    pub data_type: String,
    /// Normalized type code derived from `data_type`
    #[serde(default)]
    pub sql_type: SqlType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let data_type = data_type.into();
        Self {
            name: name.into(),
            sql_type: SqlType::from_type_name(&data_type),
            data_type,
        }
    }
}

/// Materialized result of a row-returning statement
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First column of the first row, if any
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get(0))
    }
}

/// Result of a data-modifying or DDL statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementResult {
    /// Rows affected (0 for DDL)
    pub affected_rows: u64,
}

impl StatementResult {
    pub fn new(affected_rows: u64) -> Self {
        Self { affected_rows }
    }
}

/// Normalized SQL type code, the vendor-neutral view of a declared column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SqlType {
    Char,
    Varchar,
    LongVarchar,
    Clob,
    Binary,
    Varbinary,
    Blob,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Double,
    Boolean,
    Date,
    Time,
    Timestamp,
    #[default]
    Other,
}

impl SqlType {
    /// Classify a declared type name such as `VARCHAR2(255)` or `bigint`
    pub fn from_type_name(type_name: &str) -> Self {
        let upper = type_name.trim().to_ascii_uppercase();
        if upper.starts_with("CHARACTER VARYING") {
            return SqlType::Varchar;
        }
        let base = upper
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        match base {
            "CHAR" | "CHARACTER" | "NCHAR" | "BPCHAR" => SqlType::Char,
            "VARCHAR" | "VARCHAR2" | "NVARCHAR" | "NVARCHAR2" | "VARYING" => SqlType::Varchar,
            "LONG" | "LONGVARCHAR" | "MEDIUMTEXT" => SqlType::LongVarchar,
            "CLOB" | "NCLOB" | "TEXT" | "LONGTEXT" | "TINYTEXT" => SqlType::Clob,
            "BINARY" => SqlType::Binary,
            "VARBINARY" | "RAW" => SqlType::Varbinary,
            "BLOB" | "LONGBLOB" | "MEDIUMBLOB" | "TINYBLOB" | "BYTEA" | "IMAGE" => SqlType::Blob,
            "SMALLINT" | "TINYINT" | "INT2" => SqlType::SmallInt,
            "INTEGER" | "INT" | "INT4" | "MEDIUMINT" => SqlType::Integer,
            "BIGINT" | "INT8" => SqlType::BigInt,
            "NUMBER" | "NUMERIC" | "DECIMAL" => SqlType::Decimal,
            "DOUBLE" | "FLOAT" | "REAL" | "FLOAT8" | "FLOAT4" => SqlType::Double,
            "BOOLEAN" | "BOOL" | "BIT" => SqlType::Boolean,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMPTZ" => SqlType::Timestamp,
            _ => SqlType::Other,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SqlType::Binary | SqlType::Varbinary | SqlType::Blob)
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar | SqlType::Clob
        )
    }

    /// The kind of host value a column of this type reads into
    pub fn value_kind(&self) -> ValueKind {
        match self {
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar | SqlType::Clob => {
                ValueKind::Text
            }
            SqlType::Binary | SqlType::Varbinary | SqlType::Blob => ValueKind::Bytes,
            SqlType::SmallInt | SqlType::Integer => ValueKind::Integer,
            SqlType::BigInt => ValueKind::Long,
            SqlType::Decimal => ValueKind::Decimal,
            SqlType::Double => ValueKind::Double,
            SqlType::Boolean => ValueKind::Boolean,
            SqlType::Date | SqlType::Time | SqlType::Timestamp => ValueKind::Timestamp,
            SqlType::Other => ValueKind::Other,
        }
    }
}

/// Host-side value class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Bytes,
    Integer,
    Long,
    Decimal,
    Double,
    Boolean,
    Timestamp,
    Other,
}
