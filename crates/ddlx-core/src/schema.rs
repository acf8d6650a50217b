//! Schema introspection traits and types
//!
//! Every `Option<&str>` name filter means "match anything" when `None`. Name
//! filters are compared the way the database stores identifiers, so callers
//! fold names with [`IdentifierCase::apply`] before passing them in.

use crate::{Result, SqlType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Schema introspection interface
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// How the database stores unquoted identifiers
    async fn identifier_case(&self) -> Result<IdentifierCase>;

    /// List tables, optionally filtered by name
    async fn list_tables(&self, table: Option<&str>) -> Result<Vec<TableInfo>>;

    /// Get columns, optionally filtered by table and column name
    async fn get_columns(
        &self,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<Vec<ColumnInfo>>;

    /// Get primary key columns, in key order
    async fn get_primary_keys(&self, table: Option<&str>) -> Result<Vec<PrimaryKeyColumn>>;

    /// Get the foreign key columns a table declares (its imported keys)
    async fn get_imported_keys(&self, table: Option<&str>) -> Result<Vec<ForeignKeyColumn>>;

    /// Get foreign key columns linking a parent table to a foreign table
    async fn get_cross_reference(
        &self,
        parent_table: Option<&str>,
        foreign_table: Option<&str>,
    ) -> Result<Vec<ForeignKeyColumn>>;

    /// Get indexes for a table
    async fn get_indexes(&self, table: Option<&str>) -> Result<Vec<IndexInfo>>;
}

/// Case-folding rule for unquoted identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierCase {
    Upper,
    Lower,
    Verbatim,
}

impl IdentifierCase {
    /// Fold an identifier the way the database stores it
    pub fn apply(&self, identifier: &str) -> String {
        match self {
            IdentifierCase::Upper => identifier.to_uppercase(),
            IdentifierCase::Lower => identifier.to_lowercase(),
            IdentifierCase::Verbatim => identifier.to_string(),
        }
    }

    pub fn apply_opt(&self, identifier: Option<&str>) -> Option<String> {
        identifier.map(|id| self.apply(id))
    }
}

/// Table information (basic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub table_type: TableType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    Table,
    View,
}

/// Column information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub table: String,
    pub name: String,
    /// 1-based position within the table
    pub ordinal: usize,
    /// Declared type name
    pub data_type: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default_value: Option<String>,
    /// Declared length for character and binary types
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyColumn {
    pub table: String,
    pub column: String,
    pub constraint_name: Option<String>,
    /// 1-based position within the key
    pub key_seq: usize,
}

/// One column pair of a foreign key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyColumn {
    /// Constraint name, when the database reports one
    pub fk_name: Option<String>,
    pub fk_table: String,
    pub fk_column: String,
    pub pk_table: String,
    pub pk_column: String,
    /// 1-based position within the key
    pub key_seq: usize,
    pub on_delete: ForeignKeyAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    pub fn parse(action: &str) -> Self {
        match action.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => ForeignKeyAction::Cascade,
            "RESTRICT" => ForeignKeyAction::Restrict,
            "SET NULL" => ForeignKeyAction::SetNull,
            "SET DEFAULT" => ForeignKeyAction::SetDefault,
            _ => ForeignKeyAction::NoAction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}
