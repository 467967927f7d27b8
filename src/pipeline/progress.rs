// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for pipeline execution
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub repositories_processed: usize,
    pub repositories_failed: usize,
    pub directories_visited: usize,
    pub records_found: usize,
    pub documents_created: usize,
    pub documents_skipped: usize,
    pub rows_inserted: usize,
    pub rows_failed: usize,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.repositories_processed + self.repositories_failed;
        if total == 0 {
            return 0.0;
        }
        (self.repositories_processed as f64 / total as f64) * 100.0
    }

    pub fn directories_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.directories_visited as f64 / self.duration_secs as f64
    }

    pub fn log_summary(&self, title: &str) {
        info!("=== {} Summary ===", title);
        info!("Duration: {} seconds", self.duration_secs);
        info!("Repositories processed: {}", self.repositories_processed);
        info!("Repositories failed: {}", self.repositories_failed);
        info!("Success rate: {:.2}%", self.success_rate());
        info!("Directories visited: {}", self.directories_visited);
        info!("Metainfo records found: {}", self.records_found);
        info!("Documents created: {}", self.documents_created);
        info!("Documents skipped: {}", self.documents_skipped);
        info!("Rows inserted: {}", self.rows_inserted);
        info!("Rows failed: {}", self.rows_failed);
        info!(
            "Traversal speed: {:.2} directories/sec",
            self.directories_per_second()
        );
        info!("=================================");
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    repositories_processed: AtomicUsize,
    repositories_failed: AtomicUsize,
    directories_visited: AtomicUsize,
    records_found: AtomicUsize,
    documents_created: AtomicUsize,
    documents_skipped: AtomicUsize,
    rows_inserted: AtomicUsize,
    rows_failed: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_repositories: usize) -> Self {
        Self::with_color(total_repositories, true)
    }

    pub fn with_color(total_repositories: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        let main_bar = create_progress_bar(&multi_progress, total_repositories as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    pub fn hidden(total_repositories: usize) -> Self {
        let main_bar = ProgressBar::hidden();
        main_bar.set_length(total_repositories as u64);
        Self::from_bars(main_bar, ProgressBar::hidden())
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar) -> Self {
        Self {
            main_bar,
            detail_bar,
            repositories_processed: AtomicUsize::new(0),
            repositories_failed: AtomicUsize::new(0),
            directories_visited: AtomicUsize::new(0),
            records_found: AtomicUsize::new(0),
            documents_created: AtomicUsize::new(0),
            documents_skipped: AtomicUsize::new(0),
            rows_inserted: AtomicUsize::new(0),
            rows_failed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_repositories_processed(&self) {
        self.repositories_processed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_repositories_failed(&self) {
        self.repositories_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_directory(&self) {
        self.directories_visited.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_record(&self) {
        self.records_found.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_document_created(&self) {
        self.documents_created.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn add_document_skipped(&self) {
        self.documents_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_row_inserted(&self) {
        self.rows_inserted.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn add_row_failed(&self) {
        self.rows_failed.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Processing complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            repositories_processed: self.repositories_processed.load(Ordering::SeqCst),
            repositories_failed: self.repositories_failed.load(Ordering::SeqCst),
            directories_visited: self.directories_visited.load(Ordering::SeqCst),
            records_found: self.records_found.load(Ordering::SeqCst),
            documents_created: self.documents_created.load(Ordering::SeqCst),
            documents_skipped: self.documents_skipped.load(Ordering::SeqCst),
            rows_inserted: self.rows_inserted.load(Ordering::SeqCst),
            rows_failed: self.rows_failed.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Documents: {} | Rows: {} | Failed repos: {} | Failed rows: {}",
            self.documents_created.load(Ordering::SeqCst),
            self.rows_inserted.load(Ordering::SeqCst),
            self.repositories_failed.load(Ordering::SeqCst),
            self.rows_failed.load(Ordering::SeqCst),
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} repos {msg}",
            "=>-",
        )
    };

    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars);
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
