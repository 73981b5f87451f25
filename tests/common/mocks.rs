//! Mock third-party upstreams
//!
//! One axum server stands in for the suggestion provider, the now-playing
//! accounts and player APIs, the contribution provider and an album art host.
//! Each test server gets its own instance so modes can be flipped per test.

use super::constants::*;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// Valid palette wrapped in a ```json fence
    Valid,
    /// Parses, but the accent is not a hex color
    InvalidPalette,
    /// Answers 500
    Failing,
    /// Valid palette after `SLOW_PROVIDER_DELAY_MS`
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    Playing,
    /// 204 No Content
    Idle,
    /// 500
    Broken,
}

struct MockState {
    base_url: String,
    provider_mode: Mutex<ProviderMode>,
    provider_calls: AtomicUsize,
    player_mode: Mutex<PlayerMode>,
    graphql_available: AtomicBool,
}

pub struct MockUpstreams {
    pub base_url: String,
    state: Arc<MockState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockUpstreams {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstreams");
        let port = listener
            .local_addr()
            .expect("Failed to get mock address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(MockState {
            base_url: base_url.clone(),
            provider_mode: Mutex::new(ProviderMode::Valid),
            provider_calls: AtomicUsize::new(0),
            player_mode: Mutex::new(PlayerMode::Playing),
            graphql_available: AtomicBool::new(true),
        });

        let app = Router::new()
            .route("/v1beta/models/{model_action}", post(generate_content))
            .route("/api/token", post(token))
            .route("/v1/me/player/currently-playing", get(currently_playing))
            .route("/art.png", get(album_art))
            .route("/graphql", post(graphql))
            .route("/users/{login}", get(user))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock upstreams failed");
        });

        Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn set_provider_mode(&self, mode: ProviderMode) {
        *self.state.provider_mode.lock().unwrap() = mode;
    }

    /// Number of requests the suggestion provider has received
    pub fn provider_calls(&self) -> usize {
        self.state.provider_calls.load(Ordering::SeqCst)
    }

    pub fn set_player_mode(&self, mode: PlayerMode) {
        *self.state.player_mode.lock().unwrap() = mode;
    }

    pub fn set_graphql_available(&self, available: bool) {
        self.state
            .graphql_available
            .store(available, Ordering::SeqCst);
    }

    pub fn album_art_url(&self) -> String {
        format!("{}/art.png", self.base_url)
    }
}

impl Drop for MockUpstreams {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn provider_text(accent: &str) -> Value {
    let palette = json!({
        "accent": accent,
        "accentMuted": "rgb(255 51 102 / 0.15)",
        "bgBase": "#0a0306",
        "bgElevated": "#1a0a10",
        "meshColors": MOCK_MESH,
    });
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": format!("```json\n{}\n```", palette) }] }
        }]
    })
}

async fn generate_content(
    State(state): State<Arc<MockState>>,
    Path(model_action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.provider_calls.fetch_add(1, Ordering::SeqCst);

    if model_action != format!("{}:generateContent", GEMINI_MODEL)
        || query.get("key").map(String::as_str) != Some(GEMINI_API_KEY)
    {
        return StatusCode::FORBIDDEN.into_response();
    }

    let mode = *state.provider_mode.lock().unwrap();
    match mode {
        ProviderMode::Valid => Json(provider_text(MOCK_ACCENT)).into_response(),
        ProviderMode::InvalidPalette => Json(provider_text("red")).into_response(),
        ProviderMode::Failing => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ProviderMode::Slow => {
            tokio::time::sleep(Duration::from_millis(SLOW_PROVIDER_DELAY_MS)).await;
            Json(provider_text(MOCK_ACCENT)).into_response()
        }
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("refresh_token") if form.get("refresh_token").map(String::as_str) == Some(SPOTIFY_REFRESH_TOKEN) => {
            Json(json!({ "access_token": "mock-access-token" })).into_response()
        }
        Some("authorization_code") if form.get("code").map(String::as_str) == Some(MOCK_BAD_CODE) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid <authorization> code",
            })),
        )
            .into_response(),
        Some("authorization_code") => Json(json!({
            "access_token": "mock-access-token",
            "refresh_token": MOCK_GRANTED_REFRESH_TOKEN,
        }))
        .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response(),
    }
}

async fn currently_playing(State(state): State<Arc<MockState>>) -> Response {
    let mode = *state.player_mode.lock().unwrap();
    match mode {
        PlayerMode::Playing => Json(json!({
            "is_playing": true,
            "item": {
                "name": MOCK_TRACK_TITLE,
                "artists": MOCK_ARTISTS.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
                "album": { "images": [
                    { "url": format!("{}/art.png", state.base_url) },
                    { "url": format!("{}/small.png", state.base_url) },
                ]},
                "external_urls": { "spotify": MOCK_SONG_URL },
            }
        }))
        .into_response(),
        PlayerMode::Idle => StatusCode::NO_CONTENT.into_response(),
        PlayerMode::Broken => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Solid vivid red, so the extracted seed is predictable.
async fn album_art() -> Response {
    let image = image::RgbaImage::from_pixel(16, 16, image::Rgba([255, 0, 0, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("Failed to encode album art");
    ([(header::CONTENT_TYPE, "image/png")], bytes.into_inner()).into_response()
}

async fn graphql(State(state): State<Arc<MockState>>) -> Response {
    if !state.graphql_available.load(Ordering::SeqCst) {
        return StatusCode::BAD_GATEWAY.into_response();
    }
    Json(json!({
        "data": { "user": { "contributionsCollection": { "contributionCalendar": {
            "totalContributions": MOCK_TOTAL_CONTRIBUTIONS,
            "weeks": [{ "contributionDays": [
                { "contributionCount": 2, "date": "2024-01-01", "color": "#9be9a8" },
                { "contributionCount": 0, "date": "2024-01-02", "color": "#ebedf0" },
            ]}]
        }}}}
    }))
    .into_response()
}

async fn user(Path(login): Path<String>) -> Response {
    if login != GITHUB_LOGIN {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "login": login,
        "public_repos": MOCK_PUBLIC_REPOS,
        "followers": MOCK_FOLLOWERS,
    }))
    .into_response()
}
