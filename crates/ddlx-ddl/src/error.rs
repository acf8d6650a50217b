use ddlx_core::{AbstractType, Dialect};
use thiserror::Error;

/// Malformed builder input. Raised before any SQL is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("column '{column}' of type {ty:?} requires a length")]
    MissingLength { column: String, ty: AbstractType },

    #[error("column '{column}' cannot have length {length}")]
    InvalidLength { column: String, length: u32 },

    #[error("type {ty:?} has no mapping for {dialect}")]
    UnmappedType { ty: AbstractType, dialect: Dialect },

    #[error("column count {columns} does not match value count {values}")]
    ValueCountMismatch { columns: usize, values: usize },

    #[error("foreign key '{name}' has {columns} key columns but {references} referenced columns")]
    ReferenceCountMismatch {
        name: String,
        columns: usize,
        references: usize,
    },

    #[error("'{0}' needs at least one column")]
    EmptyColumnList(String),

    #[error("'{owner}' lists column '{column}' more than once")]
    DuplicateColumn { owner: String, column: String },

    #[error("column '{column}' is not declared in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("{dialect} needs the column type of '{column}' for this statement")]
    MissingType { column: String, dialect: Dialect },

    #[error("value cannot be rendered as a literal: {0}")]
    InvalidLiteral(String),

    #[error("constraint '{name}' is not a {expected} constraint")]
    ConstraintKindMismatch { name: String, expected: &'static str },

    #[error("{operation} is not supported by {dialect}")]
    Unsupported {
        operation: &'static str,
        dialect: Dialect,
    },
}

pub type BuildResult<T> = Result<T, BuildError>;
