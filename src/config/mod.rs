mod file_config;

pub use file_config::{
    ContributionsConfig, FileConfig, NowPlayingConfig, StorageConfig, SuggestionsConfig,
    UploadConfig,
};

use crate::auth::Credentials;
use crate::color_suggest::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::contributions::{DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_LOGIN};
use crate::now_playing::{SpotifyConfig, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL, DEFAULT_REDIRECT_URI};
use crate::palette::SUGGESTION_TIMEOUT;
use crate::photo_store::S3Config;
use crate::server::RequestsLoggingLevel;
use crate::upload::DEFAULT_UPLOAD_PREFIX;
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BUCKET: &str = "yashs3324";
pub const DEFAULT_METADATA_KEY: &str = "photos/photos.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub storage_dir: Option<PathBuf>,
    pub frontend_dir_path: Option<String>,
}

/// Secret and deployment values taken from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub upload_password: Option<String>,
    pub jwt_secret: Option<String>,
    pub r2_account_id: Option<String>,
    pub r2_access_key_id: Option<String>,
    pub r2_secret_access_key: Option<String>,
    pub r2_bucket_name: Option<String>,
    pub r2_metadata_key: Option<String>,
    pub r2_upload_prefix: Option<String>,
    pub r2_public_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_refresh_token: Option<String>,
    pub spotify_redirect_uri: Option<String>,
    pub github_token: Option<String>,
}

impl Secrets {
    /// Reads every value through `lookup`; empty strings count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            upload_password: get("UPLOAD_PASSWORD"),
            jwt_secret: get("JWT_SECRET"),
            r2_account_id: get("R2_ACCOUNT_ID"),
            r2_access_key_id: get("R2_ACCESS_KEY_ID"),
            r2_secret_access_key: get("R2_SECRET_ACCESS_KEY"),
            r2_bucket_name: get("R2_BUCKET_NAME"),
            r2_metadata_key: get("R2_METADATA_KEY"),
            r2_upload_prefix: get("R2_UPLOAD_PREFIX"),
            r2_public_base_url: get("R2_PUBLIC_BASE_URL"),
            gemini_api_key: get("GEMINI_API_KEY"),
            spotify_client_id: get("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: get("SPOTIFY_CLIENT_SECRET"),
            spotify_refresh_token: get("SPOTIFY_REFRESH_TOKEN"),
            spotify_redirect_uri: get("SPOTIFY_REDIRECT_URI"),
            github_token: get("GITHUB_TOKEN"),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    S3(S3Config),
    Local(PathBuf),
    Unconfigured,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub metadata_key: String,
    pub upload_prefix: String,
    pub public_base_url: Option<String>,
}

/// Which storage values are present. Never carries the values of credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReport {
    pub backend: &'static str,
    pub bucket: String,
    pub metadata_key: String,
    pub account_id: &'static str,
    pub access_key_id: &'static str,
    pub secret_access_key: &'static str,
}

fn set_or_not(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "SET"
    } else {
        "NOT SET"
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionSettings {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub remote_endpoint: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ContributionSettings {
    pub api_url: String,
    pub login: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub max_upload_bytes: usize,

    // Feature configs
    pub storage: StorageSettings,
    pub storage_report: StorageReport,
    pub credentials: Credentials,
    pub suggestions: SuggestionSettings,
    pub spotify: SpotifyConfig,
    pub contributions: ContributionSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, optional TOML file config and secrets.
    /// TOML values override CLI values where present; environment values override TOML.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>, secrets: Secrets) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ (both {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let storage_file = file.storage.unwrap_or_default();
        let bucket = secrets
            .r2_bucket_name
            .clone()
            .or(storage_file.bucket)
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let metadata_key = secrets
            .r2_metadata_key
            .clone()
            .or(storage_file.metadata_key)
            .unwrap_or_else(|| DEFAULT_METADATA_KEY.to_string());
        let upload_prefix = secrets
            .r2_upload_prefix
            .clone()
            .or(storage_file.upload_prefix)
            .unwrap_or_else(|| DEFAULT_UPLOAD_PREFIX.to_string());
        let public_base_url = secrets
            .r2_public_base_url
            .clone()
            .or(storage_file.public_base_url);

        let storage_dir = storage_file
            .storage_dir
            .map(PathBuf::from)
            .or_else(|| cli.storage_dir.clone());
        if let Some(dir) = &storage_dir {
            if dir.exists() && !dir.is_dir() {
                bail!("storage_dir is not a directory: {:?}", dir);
            }
        }

        let backend = match (
            &secrets.r2_account_id,
            &secrets.r2_access_key_id,
            &secrets.r2_secret_access_key,
        ) {
            (Some(account), Some(key_id), Some(secret)) => {
                let mut s3 = S3Config::r2(account, &bucket, key_id, secret);
                if let Some(endpoint) = storage_file.endpoint {
                    s3.endpoint = endpoint;
                }
                if let Some(region) = storage_file.region {
                    s3.region = region;
                }
                StorageBackend::S3(s3)
            }
            _ => match storage_dir {
                Some(dir) => StorageBackend::Local(dir),
                None => StorageBackend::Unconfigured,
            },
        };

        let storage_report = StorageReport {
            backend: match backend {
                StorageBackend::S3(_) => "s3",
                StorageBackend::Local(_) => "local",
                StorageBackend::Unconfigured => "none",
            },
            bucket: bucket.clone(),
            metadata_key: metadata_key.clone(),
            account_id: set_or_not(&secrets.r2_account_id),
            access_key_id: set_or_not(&secrets.r2_access_key_id),
            secret_access_key: set_or_not(&secrets.r2_secret_access_key),
        };

        let max_upload_bytes = file
            .upload
            .and_then(|u| u.max_body_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let suggestions_file = file.suggestions.unwrap_or_default();
        let suggestions = SuggestionSettings {
            gemini_api_key: secrets.gemini_api_key.clone(),
            gemini_base_url: suggestions_file
                .gemini_base_url
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: suggestions_file
                .gemini_model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            remote_endpoint: suggestions_file.endpoint,
            timeout: suggestions_file
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(SUGGESTION_TIMEOUT),
        };

        let now_playing_file = file.now_playing.unwrap_or_default();
        let spotify = SpotifyConfig {
            client_id: secrets.spotify_client_id.clone(),
            client_secret: secrets.spotify_client_secret.clone(),
            refresh_token: secrets.spotify_refresh_token.clone(),
            redirect_uri: secrets
                .spotify_redirect_uri
                .clone()
                .or(now_playing_file.redirect_uri)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            accounts_url: now_playing_file
                .accounts_url
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string()),
            api_url: now_playing_file
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };

        let contributions_file = file.contributions.unwrap_or_default();
        let contributions = ContributionSettings {
            api_url: contributions_file
                .api_url
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            login: contributions_file
                .login
                .unwrap_or_else(|| DEFAULT_GITHUB_LOGIN.to_string()),
            token: secrets.github_token.clone(),
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            content_cache_age_sec,
            frontend_dir_path,
            max_upload_bytes,
            storage: StorageSettings {
                backend,
                metadata_key,
                upload_prefix,
                public_base_url,
            },
            storage_report,
            credentials: Credentials::new(secrets.upload_password, secrets.jwt_secret),
            suggestions,
            spotify,
            contributions,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
