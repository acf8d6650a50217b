use ddlx_core::DbError;
use ddlx_ddl::BuildError;
use thiserror::Error;

pub type AccessorResult<T> = Result<T, AccessorError>;

/// Errors surfaced by inspector and facade calls
#[derive(Debug, Error)]
pub enum AccessorError {
    /// Malformed input; raised before anything is sent to the database
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl AccessorError {
    pub fn is_build(&self) -> bool {
        matches!(self, AccessorError::Build(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, AccessorError::Database(e) if e.is_connection())
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, AccessorError::Database(e) if e.is_execution())
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, AccessorError::Database(e) if e.is_metadata())
    }
}
