//! Connection configuration
//!
//! A `ConnectionConfig` carries everything needed to open a connection plus
//! the declared database type. It can be built in code or loaded from TOML:
//!
//! ```toml
//! driver = "sqlite"
//! url = "jdbc:sqlite:/var/lib/app/app.db"
//! user = "app"
//! password = "secret"
//! database_type = "derby"
//!
//! [params]
//! busy_timeout_ms = "5000"
//! ```

use crate::{DbError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

static URL_SCHEME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:jdbc:)?([a-z0-9]+):").ok());

/// Database type declared by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum DatabaseType {
    Oracle,
    MySql,
    Postgres,
    Derby,
    #[default]
    Unknown,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Oracle => "oracle",
            DatabaseType::MySql => "mysql",
            DatabaseType::Postgres => "postgres",
            DatabaseType::Derby => "derby",
            DatabaseType::Unknown => "unknown",
        }
    }
}

impl FromStr for DatabaseType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(DatabaseType::Oracle),
            "mysql" | "mariadb" => Ok(DatabaseType::MySql),
            "postgres" | "postgresql" => Ok(DatabaseType::Postgres),
            "derby" => Ok(DatabaseType::Derby),
            "unknown" | "" => Ok(DatabaseType::Unknown),
            other => Err(DbError::Configuration(format!(
                "unrecognized database type '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for DatabaseType {
    type Error = DbError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DatabaseType> for String {
    fn from(value: DatabaseType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection configuration
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ConnectionConfig {
    /// Driver ID (e.g., "sqlite")
    pub driver: String,
    /// Connection URL, with or without a `jdbc:` prefix
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Declared database type; derived from the URL when absent
    #[serde(default)]
    pub database_type: Option<DatabaseType>,
    /// Additional driver parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database_type", &self.database_type)
            .field("params", &self.params)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(driver: &str, url: &str) -> Self {
        Self {
            driver: driver.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        self.user = Some(user.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_database_type(mut self, database_type: DatabaseType) -> Self {
        self.database_type = Some(database_type);
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let str_val = match value.into() {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        self.params.insert(key.to_string(), str_val);
        self
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ConnectionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading connection configuration");
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.driver.trim().is_empty() {
            return Err(DbError::Configuration("driver must not be empty".into()));
        }
        if self.url.trim().is_empty() {
            return Err(DbError::Configuration("url must not be empty".into()));
        }
        Ok(())
    }

    /// URL scheme, e.g. `oracle` for `jdbc:oracle:thin:@host:1521:xe`
    pub fn url_scheme(&self) -> Option<String> {
        let pattern = URL_SCHEME.as_ref()?;
        pattern
            .captures(&self.url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_lowercase())
    }

    /// Declared database type, falling back to the URL scheme
    pub fn database_type(&self) -> DatabaseType {
        if let Some(declared) = self.database_type {
            return declared;
        }
        self.url_scheme()
            .and_then(|scheme| scheme.parse().ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_database_type_from_url() {
        let config = ConnectionConfig::new("oracle", "jdbc:oracle:thin:@db:1521:xe");
        assert_eq!(config.database_type(), DatabaseType::Oracle);

        let config = ConnectionConfig::new("postgres", "jdbc:postgresql://db/ambari");
        assert_eq!(config.database_type(), DatabaseType::Postgres);

        let config = ConnectionConfig::new("sqlite", "sqlite::memory:");
        assert_eq!(config.database_type(), DatabaseType::Unknown);
    }

    #[test]
    fn test_declared_type_wins_over_url() {
        let config = ConnectionConfig::new("sqlite", "jdbc:mysql://db/app")
            .with_database_type(DatabaseType::Derby);
        assert_eq!(config.database_type(), DatabaseType::Derby);
    }

    #[test]
    fn test_from_toml() {
        let config = ConnectionConfig::from_toml_str(
            r#"
            driver = "sqlite"
            url = "sqlite::memory:"
            user = "app"
            password = "hunter2"
            database_type = "ORACLE"

            [params]
            busy_timeout_ms = "250"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.driver, "sqlite");
        assert_eq!(config.database_type(), DatabaseType::Oracle);
        assert_eq!(config.get_param("busy_timeout_ms"), Some("250"));
    }

    #[test]
    fn test_validation_rejects_missing_url() {
        let err = ConnectionConfig::from_toml_str("driver = \"sqlite\"\nurl = \"\"")
            .expect_err("empty url must be rejected");
        assert!(matches!(err, DbError::Configuration(_)));
    }

    #[test]
    fn test_unknown_database_type_is_an_error() {
        let err = ConnectionConfig::from_toml_str(
            "driver = \"sqlite\"\nurl = \"x\"\ndatabase_type = \"db2\"",
        )
        .expect_err("db2 is not a supported type");
        assert!(matches!(err, DbError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "driver = \"sqlite\"\nurl = \"jdbc:derby:memory:db\"").expect("write");

        let config = ConnectionConfig::load(file.path()).expect("load config");
        assert_eq!(config.database_type(), DatabaseType::Derby);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ConnectionConfig::new("sqlite", "sqlite::memory:")
            .with_credentials("app", "hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
