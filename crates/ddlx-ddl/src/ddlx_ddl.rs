//! ddlx DDL - dialect-aware statement building
//!
//! This crate turns structural descriptions of tables, columns and
//! constraints into SQL text for a target [`Dialect`](ddlx_core::Dialect):
//! - `ColumnSpec`, `TableSpec`, `ConstraintRef` describe what to build
//! - `StatementBuilder` renders them, never touching a database
//! - `ColumnRewrite` describes the add/copy/drop/rename detour for dialects
//!   that cannot change a column type in place
//! - `StatementBatch` holds ordered statements that must run together

mod batch;
mod builder;
mod error;
mod rewrite;
mod spec;

pub use batch::*;
pub use builder::*;
pub use error::*;
pub use rewrite::*;
pub use spec::*;
