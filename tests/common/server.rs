//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own in-memory object store and
//! its own mock upstreams.

use super::constants::*;
use super::mocks::MockUpstreams;
use portfolio_server::config::{
    AppConfig, CliConfig, ContributionsConfig, FileConfig, NowPlayingConfig, Secrets,
    StorageConfig, SuggestionsConfig,
};
use portfolio_server::photo_store::{MemoryStore, ObjectStore};
use portfolio_server::server::{make_app, RequestsLoggingLevel, ServerState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// What the spawned server is configured with.
#[derive(Debug, Clone)]
pub struct TestServerOptions {
    /// Back photo and upload routes with an in-memory store
    pub storage: bool,
    pub upload_password: Option<&'static str>,
    pub jwt_secret: Option<&'static str>,
    /// Configure the suggestion provider key
    pub suggestions: bool,
    /// Configure now-playing client credentials
    pub now_playing: bool,
    /// Have the theme pipeline call this colors resource over HTTP instead of in-process
    pub remote_suggestions_endpoint: Option<String>,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            storage: true,
            upload_password: Some(UPLOAD_PASSWORD),
            jwt_secret: Some(JWT_SECRET),
            suggestions: true,
            now_playing: true,
            remote_suggestions_endpoint: None,
        }
    }
}

/// Test server instance with isolated storage and upstreams
///
/// When dropped, the server gracefully shuts down along with its mocks.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Object store behind the server, for direct inspection in tests
    pub store: Option<Arc<MemoryStore>>,

    /// Mock third-party services the server talks to
    pub upstreams: MockUpstreams,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a fully configured test server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if port binding fails, configuration does not resolve or the
    /// server doesn't become ready within the timeout.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let upstreams = MockUpstreams::spawn().await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = resolve_config(&options, &upstreams.base_url);
        let store = options.storage.then(|| Arc::new(MemoryStore::new()));
        let state = ServerState::with_store(
            &config,
            store.clone().map(|s| s as Arc<dyn ObjectStore>),
        );
        let app = make_app(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            upstreams,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// The object store, for tests that run with storage enabled
    pub fn memory_store(&self) -> &MemoryStore {
        self.store
            .as_deref()
            .expect("Test server was spawned without storage")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn resolve_config(options: &TestServerOptions, upstreams_url: &str) -> AppConfig {
    let mut env: HashMap<&str, &str> = HashMap::new();
    if let Some(password) = options.upload_password {
        env.insert("UPLOAD_PASSWORD", password);
    }
    if let Some(secret) = options.jwt_secret {
        env.insert("JWT_SECRET", secret);
    }
    if options.suggestions {
        env.insert("GEMINI_API_KEY", GEMINI_API_KEY);
    }
    if options.now_playing {
        env.insert("SPOTIFY_CLIENT_ID", SPOTIFY_CLIENT_ID);
        env.insert("SPOTIFY_CLIENT_SECRET", SPOTIFY_CLIENT_SECRET);
        env.insert("SPOTIFY_REFRESH_TOKEN", SPOTIFY_REFRESH_TOKEN);
    }
    env.insert("R2_PUBLIC_BASE_URL", PUBLIC_BASE_URL);

    let cli = CliConfig {
        logging_level: RequestsLoggingLevel::None,
        // Disable caching in tests
        content_cache_age_sec: 0,
        ..Default::default()
    };
    let file_config = FileConfig {
        storage: Some(StorageConfig {
            metadata_key: Some(METADATA_KEY.to_string()),
            upload_prefix: Some(UPLOAD_PREFIX.to_string()),
            ..Default::default()
        }),
        suggestions: Some(SuggestionsConfig {
            gemini_base_url: Some(upstreams_url.to_string()),
            gemini_model: Some(GEMINI_MODEL.to_string()),
            endpoint: options.remote_suggestions_endpoint.clone(),
            timeout_ms: Some(TEST_SUGGESTION_TIMEOUT_MS),
        }),
        now_playing: Some(NowPlayingConfig {
            accounts_url: Some(upstreams_url.to_string()),
            api_url: Some(upstreams_url.to_string()),
            redirect_uri: None,
        }),
        contributions: Some(ContributionsConfig {
            api_url: Some(upstreams_url.to_string()),
            login: Some(GITHUB_LOGIN.to_string()),
        }),
        ..Default::default()
    };

    AppConfig::resolve(
        &cli,
        Some(file_config),
        Secrets::from_lookup(|name| env.get(name).map(|v| v.to_string())),
    )
    .expect("Failed to resolve test config")
}
