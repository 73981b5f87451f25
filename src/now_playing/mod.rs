//! Currently-playing track provider and its OAuth callback.

mod callback;
mod client;

pub use callback::{
    authorization_failed_page, error_page, escape_html, exchange_page, missing_code_page,
};
pub use client::{
    CodeExchange, NowPlaying, SpotifyClient, SpotifyConfig, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL,
    DEFAULT_REDIRECT_URI,
};

use crate::palette::TrackSeed;

impl From<&NowPlaying> for TrackSeed {
    fn from(now: &NowPlaying) -> Self {
        TrackSeed {
            is_playing: now.is_playing,
            title: now.title.clone().unwrap_or_default(),
            artist: now.artist.clone().unwrap_or_default(),
            album_art: now.album_art.clone(),
        }
    }
}
