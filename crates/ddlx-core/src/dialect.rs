//! Dialect descriptor
//!
//! A [`Dialect`] is resolved once from the product name the database reports
//! and never changes for the life of a connection. All vendor differences the
//! builder needs are answered here as plain match tables: native type names,
//! identifier quoting, case folding, literal rendering and capability flags.

use crate::{DatabaseType, IdentifierCase, Value};
use serde::{Deserialize, Serialize};

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Oracle,
    MySql,
    Postgres,
    Derby,
    /// Fallback for unrecognized products: standard syntax, no vendor quirks
    Generic,
}

/// Abstract column types callers describe schemas with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractType {
    /// Variable-length character data; requires a length
    String,
    Integer,
    Long,
    Boolean,
    Timestamp,
    Blob,
    Clob,
    /// Character data with no practical length bound
    CharArray,
}

impl AbstractType {
    pub fn requires_length(&self) -> bool {
        matches!(self, AbstractType::String)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, AbstractType::Blob)
    }
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Oracle,
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::Derby,
        Dialect::Generic,
    ];

    /// Map a driver-reported product name onto a dialect.
    ///
    /// Matching is case-insensitive on well-known product names; anything
    /// unrecognized resolves to [`Dialect::Generic`].
    pub fn resolve(product_name: &str, major_version: u32) -> Self {
        let product = product_name.to_ascii_lowercase();
        let dialect = if product.contains("oracle") {
            Dialect::Oracle
        } else if product.contains("mysql") || product.contains("mariadb") {
            Dialect::MySql
        } else if product.contains("postgres") || product.contains("enterprisedb") {
            Dialect::Postgres
        } else if product.contains("derby") {
            Dialect::Derby
        } else {
            Dialect::Generic
        };
        tracing::debug!(
            product = %product_name,
            major_version,
            dialect = dialect.id(),
            "resolved dialect"
        );
        dialect
    }

    /// Dialect for a configuration-declared database type
    pub fn from_database_type(database_type: DatabaseType) -> Self {
        match database_type {
            DatabaseType::Oracle => Dialect::Oracle,
            DatabaseType::MySql => Dialect::MySql,
            DatabaseType::Postgres => Dialect::Postgres,
            DatabaseType::Derby => Dialect::Derby,
            DatabaseType::Unknown => Dialect::Generic,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Dialect::Oracle => "oracle",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Derby => "derby",
            Dialect::Generic => "generic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Oracle => "Oracle",
            Dialect::MySql => "MySQL",
            Dialect::Postgres => "PostgreSQL",
            Dialect::Derby => "Apache Derby",
            Dialect::Generic => "Generic SQL",
        }
    }

    /// Native type name for an abstract type.
    ///
    /// Returns `None` when the dialect has no mapping for the type or when a
    /// length-bearing type is given no length.
    pub fn native_type_name(&self, ty: AbstractType, length: Option<u32>) -> Option<String> {
        let name = match (self, ty) {
            (_, AbstractType::String) => {
                let length = length?;
                match self {
                    Dialect::Oracle => format!("VARCHAR2({})", length),
                    _ => format!("VARCHAR({})", length),
                }
            }
            (Dialect::Oracle, AbstractType::Integer) => "NUMBER(10)".to_string(),
            (_, AbstractType::Integer) => "INTEGER".to_string(),
            (Dialect::Oracle, AbstractType::Long) => "NUMBER(19)".to_string(),
            (_, AbstractType::Long) => "BIGINT".to_string(),
            (Dialect::Oracle, AbstractType::Boolean) => "NUMBER(1)".to_string(),
            (Dialect::MySql, AbstractType::Boolean) => "TINYINT(1)".to_string(),
            (Dialect::Derby, AbstractType::Boolean) => "SMALLINT".to_string(),
            (_, AbstractType::Boolean) => "BOOLEAN".to_string(),
            (_, AbstractType::Timestamp) => "TIMESTAMP".to_string(),
            (Dialect::MySql, AbstractType::Blob) => "LONGBLOB".to_string(),
            (Dialect::Postgres, AbstractType::Blob) => "BYTEA".to_string(),
            (_, AbstractType::Blob) => "BLOB".to_string(),
            (Dialect::MySql, AbstractType::Clob | AbstractType::CharArray) => {
                "LONGTEXT".to_string()
            }
            (Dialect::Postgres, AbstractType::Clob | AbstractType::CharArray) => {
                "TEXT".to_string()
            }
            (Dialect::Oracle | Dialect::Derby, AbstractType::CharArray) => "CLOB".to_string(),
            (Dialect::Generic, AbstractType::CharArray) => return None,
            (_, AbstractType::Clob) => "CLOB".to_string(),
        };
        Some(name)
    }

    pub fn identifier_quote(&self) -> char {
        match self {
            Dialect::MySql => '`',
            _ => '"',
        }
    }

    /// Quote an identifier, doubling any embedded quote characters
    pub fn quote(&self, identifier: &str) -> String {
        let q = self.identifier_quote();
        let mut quoted = String::with_capacity(identifier.len() + 2);
        quoted.push(q);
        for c in identifier.chars() {
            if c == q {
                quoted.push(q);
            }
            quoted.push(c);
        }
        quoted.push(q);
        quoted
    }

    /// How the dialect stores unquoted identifiers when the live
    /// connection has not said otherwise
    pub fn identifier_case(&self) -> IdentifierCase {
        match self {
            Dialect::Oracle | Dialect::Derby => IdentifierCase::Upper,
            Dialect::Postgres => IdentifierCase::Lower,
            Dialect::MySql | Dialect::Generic => IdentifierCase::Verbatim,
        }
    }

    pub fn fold_case(&self, identifier: &str) -> String {
        self.identifier_case().apply(identifier)
    }

    /// Whether ALTER can change a column's type in place
    pub fn supports_column_type_change(&self) -> bool {
        matches!(self, Dialect::Oracle | Dialect::MySql | Dialect::Postgres)
    }

    pub fn supports_sequences(&self) -> bool {
        !matches!(self, Dialect::MySql)
    }

    /// Whether a BLOB or CLOB may appear in an `=` comparison
    pub fn compares_lobs(&self) -> bool {
        !matches!(self, Dialect::Oracle | Dialect::Derby)
    }

    /// Whether DROP of a primary key addresses the constraint by name.
    /// The other dialects drop "the" primary key of the table and ignore
    /// any supplied name.
    pub fn drop_primary_key_uses_name(&self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Generic)
    }

    /// Positional parameter marker for a 1-based parameter index
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Oracle => format!(":{}", index),
            _ => "?".to_string(),
        }
    }

    /// Render a value as an SQL literal.
    ///
    /// Returns `None` for values with no literal form (non-finite floats).
    pub fn render_literal(&self, value: &Value) -> Option<String> {
        let literal = match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => {
                let text = match (self, b) {
                    (Dialect::Oracle | Dialect::Derby | Dialect::MySql, true) => "1",
                    (Dialect::Oracle | Dialect::Derby | Dialect::MySql, false) => "0",
                    (Dialect::Postgres | Dialect::Generic, true) => "TRUE",
                    (Dialect::Postgres | Dialect::Generic, false) => "FALSE",
                };
                text.to_string()
            }
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) if v.is_finite() => v.to_string(),
            Value::Float64(_) => return None,
            Value::Decimal(v) => {
                let trimmed = v.trim();
                if trimmed.parse::<f64>().is_err() {
                    return None;
                }
                trimmed.to_string()
            }
            Value::String(s) => quote_string(s),
            Value::Bytes(bytes) => {
                let hex = hex::encode_upper(bytes);
                match self {
                    Dialect::Oracle => format!("HEXTORAW('{}')", hex),
                    Dialect::Postgres => format!("decode('{}', 'hex')", hex),
                    _ => format!("X'{}'", hex),
                }
            }
            Value::Timestamp(ts) => {
                let text = ts.format("%Y-%m-%d %H:%M:%S%.f").to_string();
                match self {
                    Dialect::Derby => format!("TIMESTAMP('{}')", text),
                    Dialect::Generic => quote_string(&text),
                    _ => format!("TIMESTAMP '{}'", text),
                }
            }
        };
        Some(literal)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
