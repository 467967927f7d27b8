// file: src/database/schema.rs
// description: LanceDB schema management for the metadata table
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::error::{PipelineError, Result};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use tracing::{info, warn};

/// Text columns of the metadata table in insertion order, after `id`.
pub const METADATA_COLUMNS: [&str; 11] = [
    "repo_name",
    "name_of_quantlet",
    "published_in",
    "description",
    "keywords",
    "author",
    "submitted",
    "url",
    "parent_folder_url",
    "language",
    "image_url",
];

pub struct SchemaManager<'a> {
    client: &'a LanceDbClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    /// Drops the table if present and recreates it empty. Existing rows are lost.
    pub async fn reset(&self) -> Result<()> {
        let table_name = self.client.table_name();

        self.drop_table().await?;
        info!("Metadata table cleared successfully");

        self.client
            .connection()
            .create_empty_table(table_name, Self::metadata_schema())
            .execute()
            .await
            .map_err(|e| {
                PipelineError::Database(format!("Failed to create table {}: {}", table_name, e))
            })?;

        info!("Metadata table created successfully");
        Ok(())
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        let table_name = self.client.table_name();

        if !self.client.table_exists(table_name).await? {
            warn!("Table '{}' does not exist", table_name);
            return Ok(false);
        }

        let table = self.client.open_table(table_name).await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to read schema: {}", e)))?;

        let expected = Self::metadata_schema();
        let matches = expected
            .fields()
            .iter()
            .all(|field| schema.field_with_name(field.name()).is_ok());

        if matches {
            info!("Table '{}' exists with expected columns", table_name);
        } else {
            warn!("Table '{}' is missing expected columns", table_name);
        }
        Ok(matches)
    }

    /// `id` plus the fixed text columns.
    pub fn metadata_schema() -> Arc<Schema> {
        let mut fields = vec![Field::new("id", DataType::UInt64, false)];
        fields.extend(
            METADATA_COLUMNS
                .iter()
                .map(|name| Field::new(*name, DataType::Utf8, false)),
        );
        Arc::new(Schema::new(fields))
    }

    pub async fn drop_table(&self) -> Result<()> {
        let table_name = self.client.table_name();

        if self.client.table_exists(table_name).await? {
            self.client
                .connection()
                .drop_table(table_name)
                .await
                .map_err(|e| {
                    PipelineError::Database(format!("Failed to drop table {}: {}", table_name, e))
                })?;
            info!("Dropped table: {}", table_name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use tempfile::TempDir;

    #[test]
    fn test_schema_generation() {
        let schema = SchemaManager::metadata_schema();
        assert_eq!(schema.fields().len(), 12);
        assert_eq!(schema.field(0).name(), "id");
        assert_eq!(schema.field(2).name(), "name_of_quantlet");
        assert!(matches!(schema.field(11).data_type(), DataType::Utf8));
    }

    #[tokio::test]
    async fn test_reset_creates_empty_table() {
        let temp = TempDir::new().unwrap();
        let client = LanceDbClient::new(DatabaseConfig {
            uri: temp.path().display().to_string(),
            table_name: "metadata".to_string(),
        })
        .await
        .unwrap();

        let manager = SchemaManager::new(&client);
        assert!(!manager.verify_schema().await.unwrap());

        manager.reset().await.unwrap();
        assert!(manager.verify_schema().await.unwrap());
        assert_eq!(client.row_count().await.unwrap(), 0);

        // Resetting an existing table succeeds as well.
        manager.reset().await.unwrap();
        assert!(client.table_exists("metadata").await.unwrap());
    }
}
