// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use metainfo_crawler::utils::logging::{
    format_error, format_info, format_step, format_success, format_warning,
};
use metainfo_crawler::{
    Config, ContentHost, FieldExtractor, GitHubClient, LanceDbClient, LocalHost, MemorySink,
    MetadataIngestor, MetadataSink, MetadataTable, PipelineStats, ReadmeGenerator, SchemaManager,
    Validator,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "metainfo_crawler")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Generate READMEs and ingest Metainfo.txt records across repositories", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Account whose repositories are crawled instead of hosting.owner
    #[arg(long, conflicts_with = "local")]
    owner: Option<String>,

    /// Crawl subdirectories of DIR as repositories instead of the hosting service
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create README.md next to every metainfo record that has none
    Readme {
        #[command(flatten)]
        source: SourceArgs,

        /// Log what would be created without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Rebuild the metadata table from every metainfo record
    Ingest {
        #[command(flatten)]
        source: SourceArgs,

        /// Extract rows in memory and leave the table untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the metadata table state
    Stats,

    /// Print the record extracted from a local metainfo file as JSON
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    metainfo_crawler::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Metainfo crawler");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Readme { source, dry_run } => {
            cmd_readme(&config, source, dry_run).await?;
        }
        Commands::Ingest { source, dry_run } => {
            cmd_ingest(&config, source, dry_run).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Inspect { file } => {
            cmd_inspect(&file)?;
        }
    }

    Ok(())
}

fn remote_host(config: &Config, owner: Option<String>) -> Result<GitHubClient> {
    let mut hosting = config.hosting.clone();
    if let Some(owner) = owner {
        hosting.owner = owner;
    }

    let token = config.require_token()?;
    info!("Crawling repositories of {}", hosting.owner);
    GitHubClient::new(&hosting, token).context("Failed to create GitHub client")
}

fn local_host(root: &Path) -> Result<LocalHost> {
    info!("Crawling local repositories under {}", root.display());
    LocalHost::new(root).with_context(|| format!("Invalid local root {}", root.display()))
}

async fn cmd_readme(config: &Config, source: SourceArgs, dry_run: bool) -> Result<()> {
    match source.local {
        Some(root) => run_readme(&local_host(&root)?, config, dry_run).await,
        None => run_readme(&remote_host(config, source.owner)?, config, dry_run).await,
    }
}

async fn run_readme<H: ContentHost>(host: &H, config: &Config, dry_run: bool) -> Result<()> {
    if dry_run {
        info!("Dry run: no README will be written");
    }

    let stats = ReadmeGenerator::new(host, &config.pipeline)
        .dry_run(dry_run)
        .run()
        .await
        .context("README generation failed")?;

    let verb = if dry_run { "would be created" } else { "created" };
    println!(
        "{}",
        format_success(&format!(
            "{} README files {}, {} records already documented",
            stats.documents_created, verb, stats.documents_skipped
        ))
    );
    report_failures(&stats);
    Ok(())
}

async fn cmd_ingest(config: &Config, source: SourceArgs, dry_run: bool) -> Result<()> {
    match source.local {
        Some(root) => run_ingest(&local_host(&root)?, config, dry_run).await,
        None => run_ingest(&remote_host(config, source.owner)?, config, dry_run).await,
    }
}

async fn run_ingest<H: ContentHost>(host: &H, config: &Config, dry_run: bool) -> Result<()> {
    let start_time = Instant::now();

    if dry_run {
        println!("{}", format_step(1, 1, "Extracting rows in memory"));
        let mut sink = MemorySink::new();
        let stats = MetadataIngestor::new(host, &mut sink, &config.pipeline)
            .run()
            .await
            .context("Metadata ingestion failed")?;

        for (id, row) in &sink.rows {
            info!("[dry-run] row {}: {} ({})", id, row.name_of_quantlet, row.url);
        }
        println!(
            "{}",
            format_success(&format!("{} rows extracted", stats.rows_inserted))
        );
        report_failures(&stats);
        return Ok(());
    }

    println!("{}", format_step(1, 2, "Connecting to LanceDB"));
    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    if !client.ping().await? {
        error!("Cannot connect to LanceDB");
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    println!("{}", format_step(2, 2, "Rebuilding metadata table"));
    let mut table = MetadataTable::new(client);
    let stats = MetadataIngestor::new(host, &mut table, &config.pipeline)
        .run()
        .await
        .context("Metadata ingestion failed")?;

    let rows = table.row_count().await?;
    info!(
        "Ingestion complete in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    println!(
        "{}",
        format_success(&format!(
            "{} rows in table '{}'",
            rows, config.database.table_name
        ))
    );
    report_failures(&stats);
    Ok(())
}

fn report_failures(stats: &PipelineStats) {
    if stats.repositories_failed > 0 {
        println!(
            "{}",
            format_error(&format!(
                "{} repositories failed, see the log for details",
                stats.repositories_failed
            ))
        );
    }
    if stats.rows_failed > 0 {
        println!(
            "{}",
            format_warning(&format!("{} rows could not be inserted", stats.rows_failed))
        );
    }
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to create LanceDB client")?;

    if !client.ping().await? {
        error!("Cannot connect to LanceDB");
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    if !SchemaManager::new(&client).verify_schema().await? {
        println!(
            "{}",
            format_warning("Metadata table missing or incomplete, run `ingest` first")
        );
        return Ok(());
    }

    let rows = client.row_count().await?;
    println!(
        "{}",
        format_info(&format!("Table '{}': {} rows", client.table_name(), rows))
    );
    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    file: String,
    fields: Vec<(&'a str, &'a str)>,
    record: metainfo_crawler::ExtractedRecord,
}

fn cmd_inspect(file: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Validator::validate_content_not_empty(&text)?;

    let (fields, record) = FieldExtractor::new().extract_text(&text);
    if let Some(description) = &record.description {
        info!("Description: {}", Validator::truncate_text(description, 80));
    }

    let report = InspectReport {
        file: file.display().to_string(),
        fields: fields.iter().collect(),
        record,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
