//! Column rewrite plans
//!
//! Dialects that cannot change a column type in place get the column
//! rebuilt: add a temporary column, copy the data, drop the original and
//! rename the temporary column into its place. The accessor runs the steps
//! in exactly this order and stops before dropping anything if the copy
//! fails. NOT NULL and the default come back afterwards, once the new
//! column is in place.

use ddlx_core::Value;

/// A statement plus positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BoundStatement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn unbound(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

/// How to change a column's type on the active dialect
#[derive(Debug, Clone, PartialEq)]
pub enum AlterColumnPlan {
    /// One ALTER statement does it
    InPlace(String),
    /// The column has to be rebuilt
    Rewrite(ColumnRewrite),
}

/// The add/copy/drop/rename sequence for one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRewrite {
    /// Name of the temporary column
    pub temporary: String,
    pub add_temporary: String,
    pub copy: CopyStrategy,
    pub drop_original: String,
    pub rename: String,
    /// Applied after the rename when the target column is NOT NULL
    pub restore_nullability: Option<String>,
    /// Applied after the rename when the target column has a default
    pub restore_default: Option<String>,
}

impl ColumnRewrite {
    /// Every statement in execution order; a per-row copy contributes its
    /// SELECT only
    pub fn statements(&self) -> Vec<&str> {
        let mut statements = vec![self.add_temporary.as_str()];
        match &self.copy {
            CopyStrategy::Direct(sql) => statements.push(sql),
            CopyStrategy::BinaryToText { select, .. } => statements.push(select),
        }
        statements.push(&self.drop_original);
        statements.push(&self.rename);
        statements.extend(self.restorations());
        statements
    }

    /// Attribute changes that follow the rename
    pub fn restorations(&self) -> impl Iterator<Item = &str> {
        self.restore_nullability
            .iter()
            .chain(&self.restore_default)
            .map(String::as_str)
    }
}

/// How data moves from the source column to the target column
#[derive(Debug, Clone, PartialEq)]
pub enum CopyStrategy {
    /// A single `UPDATE t SET target = source`
    Direct(String),
    /// Binary source into a text target. Each selected row is decoded on the
    /// client and written back through `update`, whose parameters are the
    /// decoded text followed by the row's key values.
    BinaryToText {
        /// Selects the key columns followed by the source column
        select: String,
        update: String,
        /// Columns identifying a row; when empty the source value itself is
        /// the key
        key_columns: Vec<String>,
    },
}
