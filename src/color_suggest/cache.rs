use crate::palette::SuggestedPalette;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const SUGGESTION_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Expired entries are only swept once the cache grows past this size.
const EVICTION_THRESHOLD: usize = 50;

pub fn cache_key(extracted_color: &str, song_title: &str, artist: &str) -> String {
    format!("{}:{}:{}", extracted_color, song_title, artist)
}

/// Time-bounded memo of provider answers. Callers pass `now` explicitly.
pub struct SuggestionCache {
    ttl: Duration,
    entries: HashMap<String, (SuggestedPalette, Instant)>,
}

impl SuggestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str, now: Instant) -> Option<SuggestedPalette> {
        self.entries
            .get(key)
            .filter(|(_, stored_at)| now.duration_since(*stored_at) < self.ttl)
            .map(|(palette, _)| palette.clone())
    }

    pub fn insert(&mut self, key: String, palette: SuggestedPalette, now: Instant) {
        self.entries.insert(key, (palette, now));

        if self.entries.len() > EVICTION_THRESHOLD {
            let ttl = self.ttl;
            self.entries
                .retain(|_, (_, stored_at)| now.duration_since(*stored_at) <= ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(SUGGESTION_CACHE_TTL)
    }
}
