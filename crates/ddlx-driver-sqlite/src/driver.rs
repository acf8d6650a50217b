//! SQLite driver implementation

use async_trait::async_trait;
use ddlx_core::{Connection, ConnectionConfig, DatabaseDriver, DbError, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::SqliteConnection;

/// SQLite database driver
///
/// Accepts `sqlite::memory:`, `jdbc:sqlite:<path>`, `sqlite:<path>` or a
/// bare path as the connection URL. Every in-memory connection is a separate
/// database.
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        tracing::debug!("SQLite driver initialized");
        Self
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Database path named by a connection URL
pub fn sqlite_path_from_url(url: &str) -> Result<String> {
    let url = url.trim();
    let rest = url.strip_prefix("jdbc:").unwrap_or(url);
    let path = rest.strip_prefix("sqlite:").unwrap_or(rest);
    let path = path.strip_prefix("//").unwrap_or(path);
    if path.is_empty() {
        return Err(DbError::Configuration(format!(
            "SQLite URL '{}' does not name a database",
            url
        )));
    }
    Ok(path.to_string())
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    fn id(&self) -> &'static str {
        "sqlite"
    }

    fn name(&self) -> &'static str {
        "SQLite"
    }

    #[tracing::instrument(skip(self, config), fields(url = %config.url))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let path = sqlite_path_from_url(&config.url)?;
        let conn = SqliteConnection::open(&path)?;

        if let Some(timeout) = config.get_param("busy_timeout_ms") {
            let millis: u64 = timeout.parse().map_err(|_| {
                DbError::Configuration(format!("busy_timeout_ms must be a number, got '{}'", timeout))
            })?;
            conn.set_busy_timeout(Duration::from_millis(millis))?;
        }

        Ok(Arc::new(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_from_urls() {
        assert_eq!(sqlite_path_from_url("sqlite::memory:").unwrap(), ":memory:");
        assert_eq!(
            sqlite_path_from_url("jdbc:sqlite:/var/lib/app.db").unwrap(),
            "/var/lib/app.db"
        );
        assert_eq!(sqlite_path_from_url("/tmp/x.db").unwrap(), "/tmp/x.db");
        assert!(sqlite_path_from_url("jdbc:sqlite:").is_err());
    }

    #[tokio::test]
    async fn test_connect_to_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let config = ConnectionConfig::new("sqlite", &format!("jdbc:sqlite:{}", path.display()))
            .with_param("busy_timeout_ms", 500);

        let conn = SqliteDriver::new().connect(&config).await.unwrap();
        conn.execute("CREATE TABLE t (id INTEGER)", &[]).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_bad_busy_timeout_is_a_configuration_error() {
        let config =
            ConnectionConfig::new("sqlite", "sqlite::memory:").with_param("busy_timeout_ms", "soon");
        let err = SqliteDriver::new().connect(&config).await.err();
        assert!(matches!(err, Some(DbError::Configuration(_))));
    }
}
