//! End-to-end tests for the ddlx accessor
//!
//! Every test runs against a private in-memory SQLite database through the
//! reference SQLite executor. SQLite reports itself as a generic product, so
//! these tests exercise the generic dialect, including the add/copy/drop/
//! rename column rebuild that dialects without in-place type changes use.
//!
//! ```bash
//! cargo test -p ddlx-accessor-tests
//! RUST_LOG=ddlx_accessor=debug cargo test -p ddlx-accessor-tests -- --nocapture
//! ```

pub mod fixtures;

#[cfg(test)]
pub mod column_tests;

#[cfg(test)]
pub mod constraint_tests;

#[cfg(test)]
pub mod row_tests;

#[cfg(test)]
pub mod script_tests;
