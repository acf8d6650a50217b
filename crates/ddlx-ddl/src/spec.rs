//! Structural descriptions of tables, columns and constraints
//!
//! These are transient value objects: built per call, handed to the
//! builder, and dropped.

use std::collections::HashSet;

use crate::{BuildError, BuildResult};
use ddlx_core::{AbstractType, Value};
use serde::{Deserialize, Serialize};

/// A column to create, add or alter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: AbstractType,
    pub length: Option<u32>,
    pub nullable: bool,
    pub default_value: Option<Value>,
}

impl ColumnSpec {
    /// A nullable column with no length and no default
    pub fn new(name: impl Into<String>, ty: AbstractType) -> Self {
        Self {
            name: name.into(),
            ty,
            length: None,
            nullable: true,
            default_value: None,
        }
    }

    pub fn string(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, AbstractType::String).length(length)
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn not_null(self) -> Self {
        self.nullable(false)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default_value = if value.is_null() { None } else { Some(value) };
        self
    }

    /// Same column under another name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> BuildResult<()> {
        if self.name.trim().is_empty() {
            return Err(BuildError::InvalidIdentifier(self.name.clone()));
        }
        match self.length {
            None if self.ty.requires_length() => Err(BuildError::MissingLength {
                column: self.name.clone(),
                ty: self.ty,
            }),
            Some(0) => Err(BuildError::InvalidLength {
                column: self.name.clone(),
                length: 0,
            }),
            _ => Ok(()),
        }
    }
}

/// A table to create: columns in declaration order plus primary key columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: Vec<String>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Add primary key columns. Repeated names are kept once.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self
                .primary_key
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(&column))
            {
                self.primary_key.push(column);
            }
        }
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    pub fn validate(&self) -> BuildResult<()> {
        if self.columns.is_empty() {
            return Err(BuildError::EmptyColumnList(self.name.clone()));
        }
        for column in &self.columns {
            column.validate()?;
        }
        ensure_distinct(&self.name, self.columns.iter().map(|c| c.name.as_str()))?;
        for key in &self.primary_key {
            if self.find_column(key).is_none() {
                return Err(BuildError::UnknownColumn {
                    table: self.name.clone(),
                    column: key.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey {
        referenced_table: String,
        /// Positionally paired with the constraint's key columns
        referenced_columns: Vec<String>,
        cascade_on_delete: bool,
    },
}

/// A named constraint on a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRef {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub kind: ConstraintKind,
}

impl ConstraintRef {
    pub fn primary_key<S: Into<String>>(
        table: impl Into<String>,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::PrimaryKey,
        }
    }

    pub fn unique<S: Into<String>>(
        table: impl Into<String>,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::Unique,
        }
    }

    pub fn foreign_key<S: Into<String>, R: Into<String>>(
        table: impl Into<String>,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
        referenced_table: impl Into<String>,
        referenced_columns: impl IntoIterator<Item = R>,
        cascade_on_delete: bool,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::ForeignKey {
                referenced_table: referenced_table.into(),
                referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
                cascade_on_delete,
            },
        }
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::ForeignKey { .. })
    }

    pub fn validate(&self) -> BuildResult<()> {
        if self.columns.is_empty() {
            return Err(BuildError::EmptyColumnList(self.name.clone()));
        }
        ensure_distinct(&self.name, self.columns.iter().map(String::as_str))?;
        match &self.kind {
            ConstraintKind::ForeignKey {
                referenced_columns, ..
            } if referenced_columns.len() != self.columns.len() => {
                Err(BuildError::ReferenceCountMismatch {
                    name: self.name.clone(),
                    columns: self.columns.len(),
                    references: referenced_columns.len(),
                })
            }
            ConstraintKind::ForeignKey {
                referenced_columns, ..
            } => ensure_distinct(&self.name, referenced_columns.iter().map(String::as_str)),
            _ => Ok(()),
        }
    }
}

/// Reject a column named twice, ignoring case
pub(crate) fn ensure_distinct<'a>(
    owner: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> BuildResult<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.to_ascii_lowercase()) {
            return Err(BuildError::DuplicateColumn {
                owner: owner.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_column_requires_length() {
        let err = ColumnSpec::new("name", AbstractType::String)
            .validate()
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingLength { .. }));
        assert!(ColumnSpec::string("name", 32).validate().is_ok());
        assert!(ColumnSpec::new("data", AbstractType::Blob).validate().is_ok());
    }

    #[test]
    fn test_primary_key_columns_are_deduplicated() {
        let table = TableSpec::new("hosts")
            .column(ColumnSpec::new("id", AbstractType::Long))
            .primary_key(["id", "ID", "id"]);
        assert_eq!(table.primary_key, vec!["id".to_string()]);
    }

    #[test]
    fn test_primary_key_must_name_declared_columns() {
        let table = TableSpec::new("hosts")
            .column(ColumnSpec::new("id", AbstractType::Long))
            .primary_key(["host_id"]);
        assert_eq!(
            table.validate(),
            Err(BuildError::UnknownColumn {
                table: "hosts".into(),
                column: "host_id".into()
            })
        );
    }

    #[test]
    fn test_foreign_key_reference_count_must_match() {
        let fk = ConstraintRef::foreign_key(
            "hostcomponentstate",
            "fk_hcs_host",
            ["host_id", "cluster_id"],
            "hosts",
            ["id"],
            false,
        );
        assert!(matches!(
            fk.validate(),
            Err(BuildError::ReferenceCountMismatch {
                columns: 2,
                references: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_length_is_rejected() {
        assert_eq!(
            ColumnSpec::string("rack_info", 0).validate(),
            Err(BuildError::InvalidLength {
                column: "rack_info".into(),
                length: 0
            })
        );
        assert!(matches!(
            ColumnSpec::new("data", AbstractType::Blob).length(0).validate(),
            Err(BuildError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_table_columns_must_be_distinct() {
        let table = TableSpec::new("hosts")
            .column(ColumnSpec::new("host_id", AbstractType::Long))
            .column(ColumnSpec::new("HOST_ID", AbstractType::Integer));
        assert_eq!(
            table.validate(),
            Err(BuildError::DuplicateColumn {
                owner: "hosts".into(),
                column: "HOST_ID".into()
            })
        );
    }

    #[test]
    fn test_constraint_columns_must_be_distinct() {
        let unique = ConstraintRef::unique("hosts", "uq_host", ["host_name", "host_name"]);
        assert!(matches!(
            unique.validate(),
            Err(BuildError::DuplicateColumn { .. })
        ));

        let fk = ConstraintRef::foreign_key(
            "hostcomponentstate",
            "fk_hcs_host",
            ["cluster_id", "host_id"],
            "hosts",
            ["host_id", "HOST_ID"],
            false,
        );
        assert_eq!(
            fk.validate(),
            Err(BuildError::DuplicateColumn {
                owner: "fk_hcs_host".into(),
                column: "HOST_ID".into()
            })
        );
    }

    #[test]
    fn test_null_default_is_no_default() {
        let column = ColumnSpec::new("flag", AbstractType::Boolean).default_value(Value::Null);
        assert_eq!(column.default_value, None);
    }
}
