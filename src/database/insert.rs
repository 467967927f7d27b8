// file: src/database/insert.rs
// description: metadata row sinks, LanceDB-backed and in-memory
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::database::schema::{METADATA_COLUMNS, SchemaManager};
use crate::error::{PipelineError, Result};
use crate::models::IngestionRow;
use arrow_array::{Array, ArrayRef, RecordBatch, RecordBatchIterator, StringArray, UInt64Array};
use arrow_schema::Schema;
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use std::sync::Arc;
use tracing::debug;

/// Destination of one ingestion run. Ids restart at 1 after every `reset`.
#[allow(async_fn_in_trait)]
pub trait MetadataSink {
    async fn reset(&mut self) -> Result<()>;

    async fn insert(&mut self, row: &IngestionRow) -> Result<u64>;

    async fn row_count(&self) -> Result<usize>;
}

pub struct MetadataTable {
    client: LanceDbClient,
    schema: Arc<Schema>,
    next_id: u64,
}

impl MetadataTable {
    pub fn new(client: LanceDbClient) -> Self {
        Self {
            client,
            schema: SchemaManager::metadata_schema(),
            next_id: 1,
        }
    }

    pub fn client(&self) -> &LanceDbClient {
        &self.client
    }

    fn create_record_batch(schema: Arc<Schema>, id: u64, row: &IngestionRow) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from(vec![id]))];
        columns.extend(
            row.columns()
                .iter()
                .map(|value| Arc::new(StringArray::from(vec![*value])) as ArrayRef),
        );

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// All rows ordered by id.
    pub async fn fetch_rows(&self) -> Result<Vec<(u64, IngestionRow)>> {
        let table_name = self.client.table_name();
        if !self.client.table_exists(table_name).await? {
            return Ok(Vec::new());
        }

        let table = self.client.open_table(table_name).await?;
        let batches: Vec<RecordBatch> = table
            .query()
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Query failed: {}", e)))?
            .try_collect()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to read result batch: {}", e)))?;

        let mut rows = Vec::new();
        for batch in &batches {
            let ids = batch
                .column_by_name("id")
                .ok_or_else(|| PipelineError::Database("Missing 'id' column".to_string()))?
                .as_any()
                .downcast_ref::<UInt64Array>()
                .ok_or_else(|| PipelineError::Database("Invalid 'id' column type".to_string()))?;

            let text: Vec<&StringArray> = METADATA_COLUMNS
                .iter()
                .map(|name| {
                    batch
                        .column_by_name(name)
                        .and_then(|col| col.as_any().downcast_ref::<StringArray>())
                        .ok_or_else(|| PipelineError::Database(format!("Invalid '{}' column", name)))
                })
                .collect::<Result<_>>()?;

            for i in 0..batch.num_rows() {
                let value = |c: usize| text[c].value(i).to_string();
                rows.push((
                    ids.value(i),
                    IngestionRow {
                        repo_name: value(0),
                        name_of_quantlet: value(1),
                        published_in: value(2),
                        description: value(3),
                        keywords: value(4),
                        author: value(5),
                        submitted: value(6),
                        url: value(7),
                        parent_folder_url: value(8),
                        language: value(9),
                        image_url: value(10),
                    },
                ));
            }
        }

        rows.sort_by_key(|(id, _)| *id);
        Ok(rows)
    }
}

impl MetadataSink for MetadataTable {
    async fn reset(&mut self) -> Result<()> {
        SchemaManager::new(&self.client).reset().await?;
        self.next_id = 1;
        Ok(())
    }

    async fn insert(&mut self, row: &IngestionRow) -> Result<u64> {
        let id = self.next_id;
        let batch = Self::create_record_batch(self.schema.clone(), id, row)?;

        let table = self.client.open_table(self.client.table_name()).await?;
        table
            .add(RecordBatchIterator::new(vec![Ok(batch)], self.schema.clone()))
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to insert row: {}", e)))?;

        self.next_id += 1;
        debug!("Inserted metadata row {} for {}", id, row.url);
        Ok(id)
    }

    async fn row_count(&self) -> Result<usize> {
        self.client.row_count().await
    }
}

/// Keeps rows in memory; used for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<(u64, IngestionRow)>,
    pub resets: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataSink for MemorySink {
    async fn reset(&mut self) -> Result<()> {
        self.rows.clear();
        self.resets += 1;
        Ok(())
    }

    async fn insert(&mut self, row: &IngestionRow) -> Result<u64> {
        let id = self.rows.len() as u64 + 1;
        self.rows.push((id, row.clone()));
        Ok(id)
    }

    async fn row_count(&self) -> Result<usize> {
        Ok(self.rows.len())
    }
}
