//! Database driver trait definition

use crate::{Connection, ConnectionConfig, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Opens connections for one database product
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "sqlite")
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Human-readable name (e.g., "SQLite")
    fn name(&self) -> &'static str;

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;
}
