//! Dynamic theming: derives a full UI palette from whatever is playing.
//!
//! Layers, from cheapest to most expensive:
//! 1. the fixed default palette when idle,
//! 2. a local palette from a genre guess, then from the album art color,
//! 3. an externally suggested palette, which replaces the local one only if it
//!    arrives in time, validates, and belongs to the newest request.

mod color;
mod controller;
mod engine;
mod seed;
mod suggestion;

pub use color::{is_hex_color, ColorParseError, Hsl, Rgb};
pub use controller::{PaletteSource, ThemeController, ThemeSnapshot, ThemeTicket};
pub use engine::{
    ensure_visible_on_dark, generate_gradient, generate_local_palette, generate_mesh_colors,
    ThemePalette, PAGE_BACKGROUND,
};
pub use seed::{dominant_color, dominant_color_from_url, genre_color, FALLBACK_SEED};
pub use suggestion::{
    fetch_suggested_palette, PaletteSuggester, RemoteSuggestionClient, SuggestedPalette,
    SuggestionError, SUGGESTION_TIMEOUT,
};

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const ALBUM_ART_TIMEOUT: Duration = Duration::from_secs(3);

/// What the theme needs to know about the current track.
#[derive(Debug, Clone, Default)]
pub struct TrackSeed {
    pub is_playing: bool,
    pub title: String,
    pub artist: String,
    pub album_art: Option<String>,
}

/// Runs the full derivation for a track and publishes through a [`ThemeController`].
///
/// Holds no theme state of its own, so one pipeline can serve concurrent requests.
pub struct ThemePipeline {
    suggester: Option<Arc<dyn PaletteSuggester>>,
    http: reqwest::Client,
    suggestion_timeout: Duration,
}

impl ThemePipeline {
    pub fn new(suggester: Option<Arc<dyn PaletteSuggester>>) -> Self {
        Self {
            suggester,
            http: reqwest::Client::new(),
            suggestion_timeout: SUGGESTION_TIMEOUT,
        }
    }

    pub fn with_suggestion_timeout(mut self, timeout: Duration) -> Self {
        self.suggestion_timeout = timeout;
        self
    }

    /// Derives a palette for `track` with a controller of its own.
    pub async fn refresh(&self, track: &TrackSeed) -> ThemeSnapshot {
        let controller = ThemeController::new();
        self.refresh_with(&controller, track).await
    }

    /// Derives and publishes a palette for `track` through `controller`, returning
    /// the theme current afterwards.
    ///
    /// Callers sharing one controller supersede each other: the returned snapshot
    /// may belong to a newer refresh if one started meanwhile.
    pub async fn refresh_with(&self, controller: &ThemeController, track: &TrackSeed) -> ThemeSnapshot {
        let ticket = controller.begin();

        if !track.is_playing {
            controller
                .publish(ticket, ThemePalette::default_palette(), PaletteSource::Default)
                .await;
            return controller.current().await;
        }

        let mut seed = genre_color(&track.artist, &track.title);
        controller
            .publish(ticket, generate_local_palette(seed, true), PaletteSource::Genre)
            .await;

        if let Some(url) = &track.album_art {
            if let Some(extracted) = dominant_color_from_url(&self.http, url, ALBUM_ART_TIMEOUT).await {
                seed = extracted;
                let applied = controller
                    .publish(ticket, generate_local_palette(seed, true), PaletteSource::Extracted)
                    .await;
                if !applied {
                    debug!(request_id = ticket.id(), "Dropping stale album art palette");
                    return controller.current().await;
                }
            }
        }

        if let Some(suggester) = &self.suggester {
            if let Some(suggested) = fetch_suggested_palette(
                suggester.as_ref(),
                seed,
                &track.title,
                &track.artist,
                self.suggestion_timeout,
            )
            .await
            {
                if !controller
                    .publish(ticket, suggested, PaletteSource::Suggested)
                    .await
                {
                    debug!(request_id = ticket.id(), "Dropping stale palette suggestion");
                }
            }
        }

        controller.current().await
    }
}
