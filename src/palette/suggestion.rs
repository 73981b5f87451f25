//! Externally suggested palettes and the guarded client that consumes them.
//!
//! A suggestion is only ever an upgrade over the local palette: every failure
//! (timeout, transport error, bad JSON, invalid colors) collapses into `None`
//! and the caller keeps what it already has.

use super::color::{is_hex_color, Rgb};
use super::engine::{bg_base, bg_elevated, generate_gradient, muted_accent, ThemePalette};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// How long a caller waits for a suggestion before keeping the local palette.
pub const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Color suggestions are not configured")]
    NotConfigured,

    #[error("Suggestion service request failed: {0}")]
    Upstream(String),

    #[error("Suggestion service returned malformed data: {0}")]
    Malformed(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),
}

/// Palette shape returned by the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedPalette {
    pub accent: String,
    #[serde(default)]
    pub accent_muted: String,
    #[serde(default)]
    pub bg_base: String,
    #[serde(default)]
    pub bg_elevated: String,
    pub mesh_colors: Vec<String>,
}

impl SuggestedPalette {
    /// Accent and all four mesh entries must be strict `#RRGGBB`.
    pub fn validate(&self) -> Result<(), SuggestionError> {
        if !is_hex_color(&self.accent) {
            return Err(SuggestionError::InvalidPalette(format!(
                "accent {:?} is not a #RRGGBB color",
                self.accent
            )));
        }
        if self.mesh_colors.len() != 4 {
            return Err(SuggestionError::InvalidPalette(format!(
                "expected 4 mesh colors, got {}",
                self.mesh_colors.len()
            )));
        }
        if let Some(bad) = self.mesh_colors.iter().find(|c| !is_hex_color(c)) {
            return Err(SuggestionError::InvalidPalette(format!(
                "mesh color {:?} is not a #RRGGBB color",
                bad
            )));
        }
        Ok(())
    }

    /// Converts a validated suggestion, filling blank fields from the local formulas.
    pub fn into_theme(self) -> Result<ThemePalette, SuggestionError> {
        self.validate()?;
        let accent = Rgb::from_hex(&self.accent)
            .map_err(|e| SuggestionError::InvalidPalette(e.to_string()))?;
        let or_local = |value: String, local: fn(Rgb) -> String| {
            if value.trim().is_empty() {
                local(accent)
            } else {
                value
            }
        };

        let mesh_colors: [String; 4] = self
            .mesh_colors
            .try_into()
            .map_err(|_| SuggestionError::InvalidPalette("mesh colors".to_string()))?;

        Ok(ThemePalette {
            accent: self.accent,
            accent_rgb: accent.triplet(),
            accent_muted: or_local(self.accent_muted, muted_accent),
            bg_base: or_local(self.bg_base, bg_base),
            bg_elevated: or_local(self.bg_elevated, bg_elevated),
            mesh_colors,
            background_gradient: generate_gradient(accent),
        })
    }
}

/// Anything that can turn a seed and track metadata into a palette suggestion.
#[async_trait]
pub trait PaletteSuggester: Send + Sync {
    async fn suggest(
        &self,
        seed: Rgb,
        title: &str,
        artist: &str,
    ) -> Result<SuggestedPalette, SuggestionError>;
}

/// Asks `suggester` for a palette, giving up after `timeout`.
///
/// Returns `None` on any failure so the caller keeps its local palette.
pub async fn fetch_suggested_palette(
    suggester: &dyn PaletteSuggester,
    seed: Rgb,
    title: &str,
    artist: &str,
    timeout: Duration,
) -> Option<ThemePalette> {
    let suggestion = match tokio::time::timeout(timeout, suggester.suggest(seed, title, artist)).await
    {
        Ok(Ok(s)) => s,
        Ok(Err(err)) => {
            debug!(seed = %seed, error = %err, "Palette suggestion unavailable");
            return None;
        }
        Err(_) => {
            warn!(seed = %seed, timeout_ms = timeout.as_millis() as u64, "Palette suggestion timed out");
            return None;
        }
    };

    match suggestion.into_theme() {
        Ok(theme) => Some(theme),
        Err(err) => {
            warn!(seed = %seed, error = %err, "Discarding invalid palette suggestion");
            None
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionRequest<'a> {
    extracted_color: String,
    song_title: &'a str,
    artist: &'a str,
}

/// HTTP client for a `POST /api/colors` style suggestion resource.
pub struct RemoteSuggestionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSuggestionClient {
    /// `endpoint` is the full URL of the colors resource.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PaletteSuggester for RemoteSuggestionClient {
    async fn suggest(
        &self,
        seed: Rgb,
        title: &str,
        artist: &str,
    ) -> Result<SuggestedPalette, SuggestionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SuggestionRequest {
                extracted_color: seed.to_hex(),
                song_title: title,
                artist,
            })
            .send()
            .await
            .map_err(|e| SuggestionError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SuggestionError::Upstream(format!(
                "status {}",
                response.status()
            )));
        }

        response
            .json::<SuggestedPalette>()
            .await
            .map_err(|e| SuggestionError::Malformed(e.to_string()))
    }
}
