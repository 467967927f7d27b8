// file: src/pipeline/ingest.rs
// description: rebuilds the metadata table from every metainfo record across all repositories
// reference: walks each repository breadth-first and inserts one row per record

use crate::config::PipelineConfig;
use crate::database::MetadataSink;
use crate::error::Result;
use crate::extractor::FieldExtractor;
use crate::models::content::parent_url;
use crate::models::{DirectoryListing, IngestionRow, RecordOrigin, RepositoryInfo};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::pipeline::{fetch_record, select_record, tracker};
use crate::repository::{ContentHost, TreeWalker};
use tracing::{debug, error, info};

pub struct MetadataIngestor<'a, H: ContentHost, S: MetadataSink> {
    host: &'a H,
    sink: &'a mut S,
    config: &'a PipelineConfig,
    extractor: FieldExtractor,
}

impl<'a, H: ContentHost, S: MetadataSink> MetadataIngestor<'a, H, S> {
    pub fn new(host: &'a H, sink: &'a mut S, config: &'a PipelineConfig) -> Self {
        Self {
            host,
            sink,
            config,
            extractor: FieldExtractor::new(),
        }
    }

    /// Replaces the sink contents with the rows found in this run.
    pub async fn run(&mut self) -> Result<PipelineStats> {
        info!("Starting metadata ingestion");

        // Wipe-and-reload: the table is recreated even if no record is found.
        self.sink.reset().await?;

        let repositories = self.host.list_repositories().await?;
        let progress = tracker(self.config, repositories.len());

        for repo in &repositories {
            progress.set_message(repo.full_name.clone());
            match self.process_repository(repo, &progress).await {
                Ok(()) => progress.inc_repositories_processed(),
                Err(e) => {
                    error!("Error processing repository {}: {}", repo.full_name, e);
                    progress.inc_repositories_failed();
                }
            }
        }

        let stats = progress.get_stats();
        progress.finish();
        stats.log_summary("Metadata Ingestion");
        Ok(stats)
    }

    pub async fn process_repository(
        &mut self,
        repo: &RepositoryInfo,
        progress: &ProgressTracker,
    ) -> Result<()> {
        info!("Processing repository: {}", repo.full_name);
        let mut walker = TreeWalker::new(self.host, repo);

        while let Some(listing) = walker.next_listing().await? {
            progress.add_directory();

            let Some(row) = self.build_row(repo, &listing).await? else {
                continue;
            };
            progress.add_record();

            match self.sink.insert(&row).await {
                Ok(id) => {
                    debug!("Row {} <- {}", id, row.url);
                    progress.add_row_inserted();
                }
                Err(e) => {
                    error!("Error inserting record {}: {}", row.url, e);
                    progress.add_row_failed();
                }
            }
        }

        Ok(())
    }

    /// Row for the directory's metainfo record, or `None` when it has none.
    pub async fn build_row(
        &self,
        repo: &RepositoryInfo,
        listing: &DirectoryListing,
    ) -> Result<Option<IngestionRow>> {
        let Some(node) = select_record(repo, listing, self.config) else {
            return Ok(None);
        };

        let record = fetch_record(self.host, repo, listing, node).await?;
        let (_, extracted) = self.extractor.extract_text(&record.text);
        debug!("Extracted {}:/{}", repo.full_name, record.directory);

        let origin = RecordOrigin {
            repo_name: repo.full_name.clone(),
            url: node.html_url.clone(),
            parent_folder_url: node.html_url.as_deref().map(parent_url),
            language: repo.language.clone(),
            image_url: listing
                .images(&self.config.image_extensions)
                .next()
                .and_then(|image| image.link())
                .map(str::to_string),
        };

        Ok(Some(IngestionRow::new(&extracted, &origin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::{LanceDbClient, MemorySink, MetadataTable};
    use crate::error::PipelineError;
    use crate::models::{ContentNode, NodeKind};
    use crate::pipeline::ReadmeGenerator;
    use crate::repository::LocalHost;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config() -> PipelineConfig {
        PipelineConfig {
            show_progress: false,
            ..PipelineConfig::default()
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn file(path: &str) -> ContentNode {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        ContentNode {
            name,
            path: path.to_string(),
            kind: NodeKind::File,
            html_url: Some(format!("https://github.com/QuantLet/SFE/blob/main/{}", path)),
            download_url: Some(format!("https://raw.githubusercontent.com/QuantLet/SFE/main/{}", path)),
        }
    }

    fn dir(path: &str) -> ContentNode {
        ContentNode {
            kind: NodeKind::Directory,
            download_url: None,
            ..file(path)
        }
    }

    /// In-memory host with a single repository.
    struct FakeHost {
        repo: RepositoryInfo,
        listings: HashMap<String, Vec<ContentNode>>,
        files: HashMap<String, String>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self {
                repo: RepositoryInfo {
                    name: "SFE".to_string(),
                    full_name: "QuantLet/SFE".to_string(),
                    default_branch: "main".to_string(),
                    language: Some("R".to_string()),
                    html_url: "https://github.com/QuantLet/SFE".to_string(),
                },
                listings: HashMap::new(),
                files: HashMap::new(),
            }
        }
    }

    impl ContentHost for FakeHost {
        async fn list_repositories(&self) -> Result<Vec<RepositoryInfo>> {
            Ok(vec![self.repo.clone()])
        }

        async fn list_contents(&self, _repo: &RepositoryInfo, path: &str) -> Result<Vec<ContentNode>> {
            self.listings.get(path).cloned().ok_or(PipelineError::Hosting {
                status: 404,
                message: format!("no listing for {}", path),
            })
        }

        async fn fetch_file(&self, _repo: &RepositoryInfo, node: &ContentNode) -> Result<Vec<u8>> {
            Ok(self.files.get(&node.path).cloned().unwrap_or_default().into_bytes())
        }

        async fn create_file(&self, _: &RepositoryInfo, _: &str, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Rejects every row.
    #[derive(Default)]
    struct FailingSink {
        resets: usize,
    }

    impl MetadataSink for FailingSink {
        async fn reset(&mut self) -> Result<()> {
            self.resets += 1;
            Ok(())
        }

        async fn insert(&mut self, _row: &IngestionRow) -> Result<u64> {
            Err(PipelineError::Database("disk full".to_string()))
        }

        async fn row_count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_row_carries_origin_and_first_image() {
        let mut host = FakeHost::new();
        host.listings.insert(String::new(), vec![dir("SFEvar")]);
        host.listings.insert(
            "SFEvar".to_string(),
            vec![
                file("SFEvar/Metainfo.txt"),
                file("SFEvar/notes.txt"),
                file("SFEvar/plot.PNG"),
                file("SFEvar/other.jpg"),
            ],
        );
        host.files.insert(
            "SFEvar/Metainfo.txt".to_string(),
            "Name of Quantlet: SFEvar\nKeywords: VaR, risk\nAuthor: 'Wolfgang K. Haerdle'\n".to_string(),
        );

        let mut sink = MemorySink::new();
        let config = config();
        let stats = MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();

        assert_eq!(stats.rows_inserted, 1);
        assert_eq!(sink.resets, 1);

        let (id, row) = &sink.rows[0];
        assert_eq!(*id, 1);
        assert_eq!(row.repo_name, "QuantLet/SFE");
        assert_eq!(row.name_of_quantlet, "SFEvar");
        assert_eq!(row.keywords, "VaR, risk");
        assert_eq!(row.author, "Wolfgang K. Haerdle");
        assert_eq!(row.published_in, "nan");
        assert_eq!(row.description, "nan");
        assert_eq!(row.url, "https://github.com/QuantLet/SFE/blob/main/SFEvar/Metainfo.txt");
        assert_eq!(row.parent_folder_url, "https://github.com/QuantLet/SFE/blob/main/SFEvar");
        assert_eq!(row.language, "R");
        assert_eq!(
            row.image_url,
            "https://raw.githubusercontent.com/QuantLet/SFE/main/SFEvar/plot.PNG"
        );
    }

    #[tokio::test]
    async fn test_record_without_image_uses_sentinel() {
        let mut host = FakeHost::new();
        host.repo.language = None;
        host.listings.insert(String::new(), vec![file("Metainfo.txt")]);
        host.files.insert("Metainfo.txt".to_string(), "Published in: SFE\n".to_string());

        let mut sink = MemorySink::new();
        let config = config();
        MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();

        let row = &sink.rows[0].1;
        assert_eq!(row.published_in, "SFE");
        assert_eq!(row.image_url, "nan");
        assert_eq!(row.language, "nan");
        assert_eq!(row.parent_folder_url, "https://github.com/QuantLet/SFE/blob/main");
    }

    #[tokio::test]
    async fn test_insert_failures_are_counted_and_run_continues() {
        let mut host = FakeHost::new();
        host.listings.insert(String::new(), vec![file("Metainfo.txt"), dir("a")]);
        host.listings.insert("a".to_string(), vec![file("a/Metainfo.txt")]);

        let mut sink = FailingSink::default();
        let config = config();
        let stats = MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();

        assert_eq!(sink.resets, 1);
        assert_eq!(stats.records_found, 2);
        assert_eq!(stats.rows_failed, 2);
        assert_eq!(stats.rows_inserted, 0);
        assert_eq!(stats.repositories_processed, 1);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_only_that_repository() {
        let mut host = FakeHost::new();
        host.listings.insert(String::new(), vec![file("Metainfo.txt"), dir("missing")]);

        let mut sink = MemorySink::new();
        let config = config();
        let stats = MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();

        // The root record is kept; the repository counts as failed.
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(stats.repositories_failed, 1);
    }

    #[tokio::test]
    async fn test_zero_records_leaves_empty_table() {
        let repos = TempDir::new().unwrap();
        write(repos.path(), "Repo/data/chart.png", "png");
        let db = TempDir::new().unwrap();

        let host = LocalHost::new(repos.path()).unwrap();
        let client = LanceDbClient::new(DatabaseConfig {
            uri: db.path().display().to_string(),
            table_name: "metadata".to_string(),
        })
        .await
        .unwrap();
        let mut sink = MetadataTable::new(client);
        let config = config();

        let stats = MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();

        assert_eq!(stats.records_found, 0);
        assert!(sink.client().table_exists("metadata").await.unwrap());
        assert_eq!(sink.row_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_rows() {
        let repos = TempDir::new().unwrap();
        write(repos.path(), "Repo/a/Metainfo.txt", "Name of Quantlet: A\n");
        write(repos.path(), "Repo/b/Metainfo.txt", "Name of Quantlet: B\n");
        let db = TempDir::new().unwrap();

        let host = LocalHost::new(repos.path()).unwrap();
        let client = LanceDbClient::new(DatabaseConfig {
            uri: db.path().display().to_string(),
            table_name: "metadata".to_string(),
        })
        .await
        .unwrap();
        let mut sink = MetadataTable::new(client);
        let config = config();

        MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();
        fs::remove_dir_all(repos.path().join("Repo/b")).unwrap();
        MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();

        let rows = sink.fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 1);
        assert_eq!(rows[0].1.name_of_quantlet, "A");
    }

    #[tokio::test]
    async fn test_both_pipelines_agree_on_extracted_fields() {
        let text = "Name of Quantlet: Foo\nKeywords:\n- alpha, beta\n- gamma-ray\nDescription: 'first'\n- second\n";
        let repos = TempDir::new().unwrap();
        write(repos.path(), "Repo/Metainfo.txt", text);

        let host = LocalHost::new(repos.path()).unwrap();
        let config = config();

        let mut sink = MemorySink::new();
        MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();
        ReadmeGenerator::new(&host, &config).run().await.unwrap();

        // Re-extracting the rendered document yields the ingested values.
        let readme = fs::read_to_string(repos.path().join("Repo/README.md")).unwrap();
        let block = crate::exporter::ReadmeExporter::fenced_block(&readme).unwrap();
        let (_, from_readme) = FieldExtractor::new().extract_text(block);

        let row = &sink.rows[0].1;
        assert_eq!(from_readme.title.as_deref(), Some(row.name_of_quantlet.as_str()));
        assert_eq!(from_readme.keywords.as_deref(), Some(row.keywords.as_str()));
        assert_eq!(from_readme.description.as_deref(), Some(row.description.as_str()));
        assert_eq!(row.keywords, "alpha, beta, gamma-ray");
    }

    #[tokio::test]
    async fn test_first_of_several_records_is_used_by_both_pipelines() {
        let repos = TempDir::new().unwrap();
        write(repos.path(), "Repo/METAINFO.txt", "Name of Quantlet: First\n");
        write(repos.path(), "Repo/Metainfo.txt", "Name of Quantlet: Second\n");

        let host = LocalHost::new(repos.path()).unwrap();
        let config = config();

        let mut sink = MemorySink::new();
        let stats = MetadataIngestor::new(&host, &mut sink, &config).run().await.unwrap();
        assert_eq!(stats.rows_inserted, 1);
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.rows[0].1.name_of_quantlet, "First");
        assert!(sink.rows[0].1.url.ends_with("METAINFO.txt"));

        let stats = ReadmeGenerator::new(&host, &config).run().await.unwrap();
        assert_eq!(stats.documents_created, 1);

        let readme = fs::read_to_string(repos.path().join("Repo/README.md")).unwrap();
        assert!(readme.contains("Name of Quantlet: First"));
        assert!(!readme.contains("Second"));
    }
}
