//! Schema inspector and accessor facade
//!
//! [`Accessor`] composes the [`SchemaInspector`] (what exists right now) with
//! the [`StatementBuilder`](ddlx_ddl::StatementBuilder) (what to run on this
//! dialect) into idempotent schema mutations: adding a column that already
//! exists, or dropping a constraint that is already gone, is a logged no-op.
//!
//! ```rust,ignore
//! use ddlx_accessor::Accessor;
//! use ddlx_ddl::ColumnSpec;
//!
//! let accessor = Accessor::connect(driver, config).await?;
//! accessor
//!     .add_column("hosts", &ColumnSpec::string("rack_info", 255), false)
//!     .await?;
//! ```

mod accessor;
mod error;
mod inspector;
mod script;

#[cfg(test)]
mod testing;

pub use accessor::{Accessor, MutationOutcome};
pub use error::{AccessorError, AccessorResult};
pub use inspector::SchemaInspector;
pub use script::{ScriptSummary, split_script};
