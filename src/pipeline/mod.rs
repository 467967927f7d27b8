// file: src/pipeline/mod.rs
// description: pipeline module exports and shared record lookup
// reference: pipeline orchestration

mod ingest;
mod progress;
mod readme;

pub use ingest::MetadataIngestor;
pub use progress::{PipelineStats, ProgressTracker};
pub use readme::{LocationOutcome, ReadmeGenerator};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{ContentNode, DirectoryListing, MetaInfoRecord, RepositoryInfo};
use crate::repository::ContentHost;
use tracing::warn;

fn tracker(config: &PipelineConfig, total: usize) -> ProgressTracker {
    if config.show_progress {
        ProgressTracker::new(total)
    } else {
        ProgressTracker::hidden(total)
    }
}

/// First metainfo file of a directory in listing order; further ones are ignored.
fn select_record<'l>(
    repo: &RepositoryInfo,
    listing: &'l DirectoryListing,
    config: &PipelineConfig,
) -> Option<&'l ContentNode> {
    let mut candidates = listing.metainfo_files(&config.metainfo_file_names);
    let first = candidates.next()?;

    let ignored: Vec<&str> = candidates.map(|n| n.name.as_str()).collect();
    if !ignored.is_empty() {
        warn!(
            "{}:/{} has several metainfo files, using {} and ignoring {:?}",
            repo.full_name, listing.path, first.name, ignored
        );
    }

    Some(first)
}

async fn fetch_record<H: ContentHost>(
    host: &H,
    repo: &RepositoryInfo,
    listing: &DirectoryListing,
    node: &ContentNode,
) -> Result<MetaInfoRecord> {
    let bytes = host.fetch_file(repo, node).await?;
    Ok(MetaInfoRecord::new(listing.path.clone(), node.path.clone(), &bytes))
}
