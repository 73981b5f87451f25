use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub content_cache_age_sec: Option<usize>,
    pub frontend_dir_path: Option<String>,

    // Feature configs
    pub storage: Option<StorageConfig>,
    pub upload: Option<UploadConfig>,
    pub suggestions: Option<SuggestionsConfig>,
    pub now_playing: Option<NowPlayingConfig>,
    pub contributions: Option<ContributionsConfig>,
}

/// Non-secret storage settings. Environment variables win over these.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the local backend, used when no S3 credentials are set.
    pub storage_dir: Option<String>,
    /// S3-compatible endpoint. Defaults to the R2 account endpoint.
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub metadata_key: Option<String>,
    pub upload_prefix: Option<String>,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub gemini_base_url: Option<String>,
    pub gemini_model: Option<String>,
    /// Remote colors resource the theme pipeline should call instead of the local service.
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct NowPlayingConfig {
    pub accounts_url: Option<String>,
    pub api_url: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ContributionsConfig {
    pub api_url: Option<String>,
    pub login: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
