// file: src/database/client.rs
// description: LanceDB client wrapper with connection management
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::error::{PipelineError, Result};
use lancedb::{Connection, Table, connect};
use tracing::{debug, info};

/// Connection to the LanceDB dataset directory holding the metadata table.
#[derive(Clone)]
pub struct LanceDbClient {
    connection: Connection,
    config: DatabaseConfig,
}

impl LanceDbClient {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Opening LanceDB dataset at {}", config.uri);

        let connection = connect(&config.uri)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Cannot open {}: {}", config.uri, e)))?;

        Ok(Self { connection, config })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        self.connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to list tables in {}: {}", self.uri(), e)))
    }

    /// Listing the tables is the cheapest round trip to the dataset.
    pub async fn ping(&self) -> Result<bool> {
        let tables = self.table_names().await?;
        debug!("{} reachable, {} tables", self.uri(), tables.len());
        Ok(true)
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        Ok(self.table_names().await?.iter().any(|name| name == table_name))
    }

    pub async fn open_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to open table {}: {}", table_name, e)))
    }

    /// Rows in the metadata table; zero while it has never been created.
    pub async fn row_count(&self) -> Result<usize> {
        let table_name = self.table_name();
        if !self.table_exists(table_name).await? {
            return Ok(0);
        }

        self.open_table(table_name)
            .await?
            .count_rows(None)
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to count rows in {}: {}", table_name, e)))
    }
}
