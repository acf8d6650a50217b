//! ddlx Core - shared abstractions for the dialect-neutral schema accessor
//!
//! This crate provides the traits and types that the statement builder and the
//! accessor depend on. It defines:
//!
//! - `Connection` - the SQL executor a driver hands out
//! - `SchemaIntrospection` - live catalog metadata (tables, columns, keys)
//! - `DatabaseDriver` - opens connections from a `ConnectionConfig`
//! - `Dialect` - per-vendor type names, quoting, case folding and capabilities
//! - Common types like `Value`, `Row`, `QueryResult`, `SqlType`

mod config;
mod connection;
mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use config::*;
pub use connection::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
