// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub hosting: HostingConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostingConfig {
    pub api_url: String,
    pub owner: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: String,
    pub table_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Matched case-insensitively against file names.
    pub metainfo_file_names: Vec<String>,
    pub document_file_name: String,
    /// Extensions without the leading dot, matched case-insensitively.
    pub image_extensions: Vec<String>,
    pub root_commit_message: String,
    pub folder_commit_message: String,
    pub show_progress: bool,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: "QuantLet".to_string(),
            token: None,
            user_agent: concat!("metainfo_crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            per_page: 100,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "data/lancedb".to_string(),
            table_name: "metadata".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            metainfo_file_names: vec!["metainfo.txt".to_string()],
            document_file_name: "README.md".to_string(),
            image_extensions: ["png", "jpg", "jpeg", "gif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            root_commit_message: "Create README.md at root level".to_string(),
            folder_commit_message: "Create README.md in folder".to_string(),
            show_progress: true,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new("config/default.toml")).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("METAINFO")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if config.hosting.token.is_none() {
            config.hosting.token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// The hosting credential is only required once a remote client is built.
    pub fn require_token(&self) -> Result<&str> {
        self.hosting
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "GitHub token not found; set {} or hosting.token",
                    TOKEN_ENV
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        if self.hosting.owner.trim().is_empty() {
            return Err(PipelineError::Config("hosting.owner must not be empty".to_string()));
        }

        if !self.hosting.api_url.starts_with("http://")
            && !self.hosting.api_url.starts_with("https://")
        {
            return Err(PipelineError::Config(format!(
                "hosting.api_url must be an http(s) url: {}",
                self.hosting.api_url
            )));
        }

        if !(1..=100).contains(&self.hosting.per_page) {
            return Err(PipelineError::Config(
                "hosting.per_page must be between 1 and 100".to_string(),
            ));
        }

        if self.database.table_name.trim().is_empty() {
            return Err(PipelineError::Config(
                "database.table_name must not be empty".to_string(),
            ));
        }

        if self.pipeline.metainfo_file_names.is_empty() {
            return Err(PipelineError::Config(
                "pipeline.metainfo_file_names must not be empty".to_string(),
            ));
        }

        if self.pipeline.image_extensions.is_empty() {
            return Err(PipelineError::Config(
                "pipeline.image_extensions must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
