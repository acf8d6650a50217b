//! Error types for ddlx

use thiserror::Error;

/// Core error type for executor, metadata and configuration failures
#[derive(Error, Debug)]
pub enum DbError {
    /// The connection could not be established or has been lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The database rejected a statement
    #[error("Execution failed for `{sql}`: {message}")]
    Execution { sql: String, message: String },

    /// A catalog/metadata lookup failed
    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DbError {
    /// Create an Execution error for the given statement
    pub fn execution(sql: impl Into<String>, message: impl ToString) -> Self {
        DbError::Execution {
            sql: sql.into(),
            message: message.to_string(),
        }
    }

    /// Re-label any error raised while reading the catalog as a metadata failure.
    ///
    /// Connection errors keep their identity; everything else becomes
    /// `Metadata` with `context` prepended.
    pub fn into_metadata(self, context: &str) -> Self {
        match self {
            DbError::Metadata(message) => DbError::Metadata(format!("{}: {}", context, message)),
            DbError::Connection(_) => self,
            other => DbError::Metadata(format!("{}: {}", context, other)),
        }
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, DbError::Execution { .. })
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, DbError::Metadata(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DbError::Connection(_))
    }
}

/// Result type alias for ddlx core operations
pub type Result<T> = std::result::Result<T, DbError>;
