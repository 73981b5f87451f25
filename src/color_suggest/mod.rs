//! Server side of the color suggestion resource.
//!
//! Requests are answered from a short-lived cache when possible, otherwise
//! forwarded to the generative provider and validated before being cached.

mod cache;
mod gemini;

pub use cache::{cache_key, SuggestionCache, SUGGESTION_CACHE_TTL};
pub use gemini::{
    build_prompt, clean_json_response, GeminiClient, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};

use crate::palette::{PaletteSuggester, Rgb, SuggestedPalette, SuggestionError};
use crate::server::metrics::record_suggestion_cache;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::debug;

/// Body of a color suggestion request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRequest {
    #[serde(default)]
    pub extracted_color: Option<String>,
    #[serde(default)]
    pub song_title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

pub struct ColorSuggestionService {
    provider: Option<Arc<GeminiClient>>,
    cache: Mutex<SuggestionCache>,
}

impl ColorSuggestionService {
    pub fn new(provider: Option<GeminiClient>) -> Self {
        Self {
            provider: provider.map(Arc::new),
            cache: Mutex::new(SuggestionCache::default()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Returns a validated palette for the seed, hitting the provider only on a cache miss.
    pub async fn suggest_for(
        &self,
        extracted_color: &str,
        song_title: &str,
        artist: &str,
    ) -> Result<SuggestedPalette, SuggestionError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(SuggestionError::NotConfigured)?;

        let key = cache_key(extracted_color, song_title, artist);
        if let Some(hit) = self.lock_cache().get(&key, Instant::now()) {
            debug!(key = %key, "Suggestion cache hit");
            record_suggestion_cache("hit");
            return Ok(hit);
        }
        record_suggestion_cache("miss");

        let palette = provider
            .generate_palette(extracted_color, song_title, artist)
            .await?;

        self.lock_cache()
            .insert(key, palette.clone(), Instant::now());
        Ok(palette)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, SuggestionCache> {
        // A poisoned cache only holds plain data; keep using it.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Lets the theme pipeline use the service in-process instead of over HTTP.
#[async_trait]
impl PaletteSuggester for ColorSuggestionService {
    async fn suggest(
        &self,
        seed: Rgb,
        title: &str,
        artist: &str,
    ) -> Result<SuggestedPalette, SuggestionError> {
        self.suggest_for(&seed.to_hex(), title, artist).await
    }
}
