//! SQLite executor for ddlx
//!
//! Reports itself as product "SQLite", which resolves to the generic
//! dialect, and answers catalog questions through SQLite's pragma
//! table-valued functions.

mod connection;
mod driver;
mod schema;

pub use connection::SqliteConnection;
pub use driver::{SqliteDriver, sqlite_path_from_url};
