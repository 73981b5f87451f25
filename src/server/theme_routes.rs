//! Color suggestion and theme routes.
//!
//! - POST /api/colors `{ extractedColor, songTitle?, artist? }`
//! - GET /api/theme

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;

use super::errors::ApiError;
use super::photo_routes::json_body;
use super::state::{GuardedColorService, GuardedSpotifyClient, GuardedThemePipeline, ServerState};
use crate::color_suggest::ColorRequest;
use crate::now_playing::NowPlaying;
use crate::palette::{
    is_hex_color, PaletteSource, SuggestedPalette, SuggestionError, ThemePalette, TrackSeed,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    pub track: NowPlaying,
    pub palette: ThemePalette,
    pub source: PaletteSource,
    pub css_variables: BTreeMap<&'static str, String>,
}

async fn post_colors(
    State(colors): State<GuardedColorService>,
    body: Result<Json<ColorRequest>, JsonRejection>,
) -> Result<Json<SuggestedPalette>, ApiError> {
    if !colors.is_configured() {
        return Err(SuggestionError::NotConfigured.into());
    }
    let request = json_body(body)?;

    let extracted = request
        .extracted_color
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("extractedColor is required"))?;
    if !is_hex_color(&extracted) {
        return Err(ApiError::bad_request(format!(
            "extractedColor {:?} is not a #RRGGBB color",
            extracted
        )));
    }

    let palette = colors
        .suggest_for(
            &extracted,
            request.song_title.as_deref().unwrap_or_default(),
            request.artist.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(palette))
}

async fn get_theme(
    State(now_playing): State<GuardedSpotifyClient>,
    State(theme): State<GuardedThemePipeline>,
) -> Json<ThemeResponse> {
    let track = now_playing.now_playing().await;
    let snapshot = theme.refresh(&TrackSeed::from(&track)).await;
    let css_variables = snapshot.palette.css_variables().into_iter().collect();

    Json(ThemeResponse {
        track,
        palette: snapshot.palette,
        source: snapshot.source,
        css_variables,
    })
}

pub fn theme_routes() -> Router<ServerState> {
    Router::new()
        .route("/colors", post(post_colors))
        .route("/theme", get(get_theme))
}
