//! Statement builder
//!
//! Pure translation from a [`Dialect`] plus structural specs into SQL text.
//! Nothing here touches a connection; invalid input is rejected with a
//! [`BuildError`] before any text is produced.

mod statements;


use crate::{BuildError, BuildResult, ColumnSpec};
use ddlx_core::{Dialect, IdentifierCase, Value};

/// Configuration for statement building
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Fold identifiers to the identifier case and quote them. When off,
    /// names are emitted bare and the database applies its own folding.
    pub quote_identifiers: bool,
    /// Identifier case reported by the live connection; the dialect's
    /// default is used when unset
    pub identifier_case: Option<IdentifierCase>,
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quoting(mut self, quote_identifiers: bool) -> Self {
        self.quote_identifiers = quote_identifiers;
        self
    }

    pub fn with_identifier_case(mut self, identifier_case: IdentifierCase) -> Self {
        self.identifier_case = Some(identifier_case);
        self
    }
}

/// Builds SQL statements for one dialect
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    dialect: Dialect,
    config: BuilderConfig,
}

impl StatementBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            config: BuilderConfig::default(),
        }
    }

    pub fn with_config(dialect: Dialect, config: BuilderConfig) -> Self {
        Self { dialect, config }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn identifier_case(&self) -> IdentifierCase {
        self.config
            .identifier_case
            .unwrap_or_else(|| self.dialect.identifier_case())
    }

    /// Render an identifier, optionally schema-qualified with `.`
    pub fn ident(&self, name: &str) -> BuildResult<String> {
        let invalid = || BuildError::InvalidIdentifier(name.to_string());
        if name.trim().is_empty() || name.contains('\0') {
            return Err(invalid());
        }

        let mut parts = Vec::new();
        for part in name.split('.') {
            if part.is_empty() {
                return Err(invalid());
            }
            if self.config.quote_identifiers {
                parts.push(self.dialect.quote(&self.identifier_case().apply(part)));
            } else if is_bare_identifier(part) {
                parts.push(part.to_string());
            } else {
                return Err(invalid());
            }
        }
        Ok(parts.join("."))
    }

    pub(crate) fn ident_list<S: AsRef<str>>(&self, owner: &str, names: &[S]) -> BuildResult<String> {
        if names.is_empty() {
            return Err(BuildError::EmptyColumnList(owner.to_string()));
        }
        crate::spec::ensure_distinct(owner, names.iter().map(|name| name.as_ref()))?;
        let rendered = names
            .iter()
            .map(|name| self.ident(name.as_ref()))
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    /// Native type for a column, including its length
    pub fn native_type(&self, column: &ColumnSpec) -> BuildResult<String> {
        column.validate()?;
        self.dialect
            .native_type_name(column.ty, column.length)
            .ok_or(BuildError::UnmappedType {
                ty: column.ty,
                dialect: self.dialect,
            })
    }

    pub fn literal(&self, value: &Value) -> BuildResult<String> {
        self.dialect
            .render_literal(value)
            .ok_or_else(|| BuildError::InvalidLiteral(value.to_string()))
    }

    /// `name TYPE [DEFAULT literal] [NOT NULL]`
    pub fn column_definition(&self, column: &ColumnSpec) -> BuildResult<String> {
        let mut definition = format!("{} {}", self.ident(&column.name)?, self.native_type(column)?);
        if let Some(default) = &column.default_value {
            definition.push_str(" DEFAULT ");
            definition.push_str(&self.literal(default)?);
        }
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        Ok(definition)
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '#'))
}

/// Type text read back from a catalog, e.g. `VARCHAR(255)` or `NUMBER(10,2)`
fn is_type_text(text: &str) -> bool {
    !text.trim().is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '(' | ')' | ',' | '_'))
}
