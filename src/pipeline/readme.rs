// file: src/pipeline/readme.rs
// description: creates README.md in every directory that has a metainfo record but no README
// reference: walks each repository breadth-first and writes through the content host

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::exporter::ReadmeExporter;
use crate::extractor::FieldExtractor;
use crate::models::{DirectoryListing, RepositoryInfo};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::pipeline::{fetch_record, select_record, tracker};
use crate::repository::{ContentHost, TreeWalker};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    NoRecord,
    AlreadyDocumented,
    Created(String),
    DryRun(String),
    /// The document appeared between listing and creation; left untouched.
    Conflict(String),
}

pub struct ReadmeGenerator<'a, H: ContentHost> {
    host: &'a H,
    config: &'a PipelineConfig,
    extractor: FieldExtractor,
    exporter: ReadmeExporter,
    dry_run: bool,
}

impl<'a, H: ContentHost> ReadmeGenerator<'a, H> {
    pub fn new(host: &'a H, config: &'a PipelineConfig) -> Self {
        Self {
            host,
            config,
            extractor: FieldExtractor::new(),
            exporter: ReadmeExporter::new(),
            dry_run: false,
        }
    }

    pub fn with_exporter(mut self, exporter: ReadmeExporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        info!("Starting README generation");

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
        stats.log_summary("README Generation");
        Ok(stats)
    }

    pub async fn process_repository(
        &self,
        repo: &RepositoryInfo,
        progress: &ProgressTracker,
    ) -> Result<()> {
        info!("Processing repository: {}", repo.full_name);
        let mut walker = TreeWalker::new(self.host, repo);

        while let Some(listing) = walker.next_listing().await? {
            progress.add_directory();

            match self.process_listing(repo, &listing).await? {
                LocationOutcome::NoRecord => {}
                LocationOutcome::AlreadyDocumented | LocationOutcome::Conflict(_) => {
                    progress.add_record();
                    progress.add_document_skipped();
                }
                LocationOutcome::Created(_) | LocationOutcome::DryRun(_) => {
                    progress.add_record();
                    progress.add_document_created();
                }
            }
        }

        Ok(())
    }

    /// Generates at most one document for the directory, never replacing an existing one.
    pub async fn process_listing(
        &self,
        repo: &RepositoryInfo,
        listing: &DirectoryListing,
    ) -> Result<LocationOutcome> {
        let Some(node) = select_record(repo, listing, self.config) else {
            return Ok(LocationOutcome::NoRecord);
        };

        let document_names = [self.config.document_file_name.clone()];
        if let Some(existing) = listing.find_file(&document_names) {
            debug!("{}:/{} already documented", repo.full_name, existing.path);
            return Ok(LocationOutcome::AlreadyDocumented);
        }

        let record = fetch_record(self.host, repo, listing, node).await?;
        let (fields, extracted) = self.extractor.extract_text(&record.text);

        let images: Vec<&str> = listing
            .images(&self.config.image_extensions)
            .filter_map(|image| image.link())
            .collect();

        let content = self.exporter.render(&fields, &images);
        let path = listing.child_path(&self.config.document_file_name);
        let message = if listing.is_root() {
            &self.config.root_commit_message
        } else {
            &self.config.folder_commit_message
        };

        let title = extracted.title.as_deref().unwrap_or(&record.file_path);

        if self.dry_run {
            info!(
                "[dry-run] Would create {}:/{} for {} ({} images)",
                repo.full_name,
                path,
                title,
                images.len()
            );
            return Ok(LocationOutcome::DryRun(path));
        }

        match self
            .host
            .create_file(repo, &path, message, &content, &repo.default_branch)
            .await
        {
            Ok(()) => {
                info!("README.md created in {}:/{} for {}", repo.full_name, record.directory, title);
                Ok(LocationOutcome::Created(path))
            }
            Err(PipelineError::Conflict(target)) => {
                warn!("Not overwriting {}, it appeared after listing", target);
                Ok(LocationOutcome::Conflict(path))
            }
            Err(e) => Err(e),
        }
    }
}
