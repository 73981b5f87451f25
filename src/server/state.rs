use axum::extract::FromRef;

use crate::auth::Credentials;
use crate::color_suggest::{ColorSuggestionService, GeminiClient};
use crate::config::{AppConfig, StorageBackend, StorageReport};
use crate::contributions::GitHubClient;
use crate::now_playing::SpotifyClient;
use crate::palette::{PaletteSuggester, RemoteSuggestionClient, ThemePipeline};
use crate::photo_store::{FsStore, ObjectMetadataRepository, ObjectStore, PhotoGateway, S3Store};
use crate::upload::UploadService;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::ServerConfig;

pub type OptionalPhotoGateway = Option<Arc<PhotoGateway>>;
pub type OptionalUploadService = Option<Arc<UploadService>>;
pub type GuardedColorService = Arc<ColorSuggestionService>;
pub type GuardedThemePipeline = Arc<ThemePipeline>;
pub type GuardedSpotifyClient = Arc<SpotifyClient>;
pub type GuardedGitHubClient = Arc<GitHubClient>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub credentials: Credentials,
    pub photos: OptionalPhotoGateway,
    pub uploads: OptionalUploadService,
    pub colors: GuardedColorService,
    pub theme: GuardedThemePipeline,
    pub now_playing: GuardedSpotifyClient,
    pub contributions: GuardedGitHubClient,
    pub storage_report: StorageReport,
}

impl ServerState {
    /// Builds every service the routes need from a resolved configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let store: Option<Arc<dyn ObjectStore>> = match &config.storage.backend {
            StorageBackend::S3(s3) => {
                info!("Using S3-compatible storage at {} (bucket {})", s3.endpoint, s3.bucket);
                Some(Arc::new(
                    S3Store::new(s3.clone()).context("Invalid object store configuration")?,
                ))
            }
            StorageBackend::Local(dir) => {
                info!("Using local storage under {:?}", dir);
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create storage dir {:?}", dir))?;
                Some(Arc::new(FsStore::new(dir.clone())))
            }
            StorageBackend::Unconfigured => {
                info!("No storage configured, photo and upload routes are disabled");
                None
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Builds the suggestion services from `config` around an already chosen object store.
    pub fn with_store(config: &AppConfig, store: Option<Arc<dyn ObjectStore>>) -> Self {
        let suggestions = &config.suggestions;
        let colors = Arc::new(ColorSuggestionService::new(
            suggestions.gemini_api_key.clone().map(|key| {
                GeminiClient::new(
                    suggestions.gemini_base_url.clone(),
                    suggestions.gemini_model.clone(),
                    key,
                )
            }),
        ));

        let suggester: Option<Arc<dyn PaletteSuggester>> = match &suggestions.remote_endpoint {
            Some(endpoint) => Some(Arc::new(RemoteSuggestionClient::new(endpoint.clone()))),
            None if colors.is_configured() => Some(colors.clone() as Arc<dyn PaletteSuggester>),
            None => None,
        };

        Self::new(
            config,
            store,
            colors,
            ThemePipeline::new(suggester).with_suggestion_timeout(suggestions.timeout),
        )
    }

    /// Assembles state from explicit parts.
    pub fn new(
        config: &AppConfig,
        store: Option<Arc<dyn ObjectStore>>,
        colors: GuardedColorService,
        theme: ThemePipeline,
    ) -> Self {
        let photos = store.clone().map(|store| {
            let repository =
                ObjectMetadataRepository::new(store, config.storage.metadata_key.clone());
            Arc::new(PhotoGateway::new(Arc::new(repository)))
        });
        let uploads = store.map(|store| {
            Arc::new(UploadService::new(
                store,
                config.storage.upload_prefix.clone(),
                config.storage.public_base_url.clone(),
            ))
        });

        let contributions = &config.contributions;
        ServerState {
            config: ServerConfig::from(config),
            start_time: Instant::now(),
            credentials: config.credentials.clone(),
            photos,
            uploads,
            colors,
            theme: Arc::new(theme),
            now_playing: Arc::new(SpotifyClient::new(config.spotify.clone())),
            contributions: Arc::new(GitHubClient::new(
                contributions.api_url.clone(),
                contributions.login.clone(),
                contributions.token.clone(),
            )),
            storage_report: config.storage_report.clone(),
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for Credentials {
    fn from_ref(input: &ServerState) -> Self {
        input.credentials.clone()
    }
}

impl FromRef<ServerState> for OptionalPhotoGateway {
    fn from_ref(input: &ServerState) -> Self {
        input.photos.clone()
    }
}

impl FromRef<ServerState> for OptionalUploadService {
    fn from_ref(input: &ServerState) -> Self {
        input.uploads.clone()
    }
}

impl FromRef<ServerState> for GuardedColorService {
    fn from_ref(input: &ServerState) -> Self {
        input.colors.clone()
    }
}

impl FromRef<ServerState> for GuardedThemePipeline {
    fn from_ref(input: &ServerState) -> Self {
        input.theme.clone()
    }
}

impl FromRef<ServerState> for GuardedSpotifyClient {
    fn from_ref(input: &ServerState) -> Self {
        input.now_playing.clone()
    }
}

impl FromRef<ServerState> for GuardedGitHubClient {
    fn from_ref(input: &ServerState) -> Self {
        input.contributions.clone()
    }
}

impl FromRef<ServerState> for StorageReport {
    fn from_ref(input: &ServerState) -> Self {
        input.storage_report.clone()
    }
}
