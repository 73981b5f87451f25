//! Third-party integrations and diagnostics.
//!
//! - GET /api/now-playing
//! - GET /api/callback?code=..|error=..
//! - GET /api/github
//! - GET /api/debug/storage

use axum::{
    extract::{Query, State},
    middleware,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, info};

use super::http_cache;
use super::state::{GuardedGitHubClient, GuardedSpotifyClient, ServerState};
use crate::config::StorageReport;
use crate::contributions::Contributions;
use crate::now_playing::{
    authorization_failed_page, error_page, exchange_page, missing_code_page, NowPlaying,
};

pub const CONTRIBUTIONS_CACHE_AGE_SEC: usize = 3600;

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

async fn get_now_playing(State(client): State<GuardedSpotifyClient>) -> Json<NowPlaying> {
    Json(client.now_playing().await)
}

async fn get_callback(
    State(client): State<GuardedSpotifyClient>,
    Query(query): Query<CallbackQuery>,
) -> Html<String> {
    if let Some(err) = query.error {
        return Html(authorization_failed_page(&err));
    }
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Html(missing_code_page());
    };

    match client.exchange_code(&code).await {
        Ok(result) => {
            info!("Authorization code exchanged");
            Html(exchange_page(&result))
        }
        Err(err) => {
            error!("Authorization code exchange failed: {:#}", err);
            Html(error_page(&err.to_string()))
        }
    }
}

async fn get_github(State(client): State<GuardedGitHubClient>) -> Json<Contributions> {
    Json(client.contributions().await)
}

async fn get_debug_storage(State(report): State<StorageReport>) -> Json<StorageReport> {
    Json(report)
}

pub fn integration_routes() -> Router<ServerState> {
    let github = Router::new()
        .route("/github", get(get_github))
        .layer(middleware::from_fn_with_state(
            CONTRIBUTIONS_CACHE_AGE_SEC,
            http_cache,
        ));

    Router::new()
        .route("/now-playing", get(get_now_playing))
        .route("/callback", get(get_callback))
        .route("/debug/storage", get(get_debug_storage))
        .merge(github)
}
