use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;

use super::integration_routes::integration_routes;
use super::metrics::metrics_handler;
use super::photo_routes::photo_routes;
use super::state::ServerState;
use super::theme_routes::theme_routes;
use super::upload_routes::upload_routes;
use super::{http_cache, log_requests};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
    pub hash: &'static str,
    pub storage: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> Json<ServerStats> {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
        hash: env!("GIT_HASH"),
        storage: state.storage_report.backend,
    })
}

pub fn make_app(state: ServerState) -> Router {
    let config = state.config.clone();

    let api_routes: Router<ServerState> = Router::new()
        .merge(photo_routes())
        .merge(upload_routes(config.max_upload_bytes))
        .merge(theme_routes())
        .merge(integration_routes());

    let home_router: Router<ServerState> = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service).layer(
                middleware::from_fn_with_state(config.content_cache_age_sec, http_cache),
            )
        }
        None => Router::new().route("/", get(home)),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            config.requests_logging_level.clone(),
            log_requests,
        ))
        .with_state(state)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;
    let app = make_app(state);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
