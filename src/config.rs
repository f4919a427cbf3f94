//! Configuration loader and validator for the blog renderer.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest page size the Prismic search endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub prismic: PrismicConfig,
}

/// Rendering and export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub out_dir: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_export_concurrency")]
    pub export_concurrency: usize,
}

/// Content store connection. Passed explicitly to the client; nothing reads
/// it from process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrismicConfig {
    /// Repository API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_document_type")]
    pub document_type: String,
}

fn default_page_size() -> u32 {
    3
}

fn default_export_concurrency() -> usize {
    4
}

fn default_document_type() -> String {
    "post".to_string()
}

impl Config {
    /// Ensure the export directory exists.
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.out_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.out_dir)
    }
}

impl PrismicConfig {
    /// Token with blank values treated as absent.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.out_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.out_dir must be non-empty"));
    }
    if cfg.app.page_size == 0 || cfg.app.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Invalid("app.page_size must be within 1..=100"));
    }
    if cfg.app.export_concurrency == 0 {
        return Err(ConfigError::Invalid("app.export_concurrency must be > 0"));
    }

    if cfg.prismic.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid("prismic.endpoint must be non-empty"));
    }
    match Url::parse(cfg.prismic.endpoint.trim()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => {
            return Err(ConfigError::Invalid(
                "prismic.endpoint must be an http(s) URL",
            ))
        }
    }
    if cfg.prismic.document_type.trim().is_empty() {
        return Err(ConfigError::Invalid("prismic.document_type must be non-empty"));
    }

    Ok(())
}

/// Returns an example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  out_dir: "./public"
  page_size: 3
  export_concurrency: 4

prismic:
  endpoint: "https://spacetraveling.cdn.prismic.io/api/v2"
  # Only needed for private repositories; PRISMIC_ACCESS_TOKEN overrides it.
  access_token: "YOUR_PRISMIC_ACCESS_TOKEN"
  document_type: "post"
"#
}
