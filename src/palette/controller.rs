//! Current-theme ownership with newest-request-wins publishing.

use super::engine::ThemePalette;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Where the published palette came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSource {
    Default,
    Genre,
    Extracted,
    Suggested,
}

/// Identity of one theme derivation. Only the most recently issued ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTicket(u64);

impl ThemeTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    pub palette: ThemePalette,
    pub source: PaletteSource,
    pub request_id: u64,
}

pub struct ThemeController {
    latest: AtomicU64,
    current: RwLock<ThemeSnapshot>,
}

impl ThemeController {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            current: RwLock::new(ThemeSnapshot {
                palette: ThemePalette::default_palette(),
                source: PaletteSource::Default,
                request_id: 0,
            }),
        }
    }

    /// Starts a new derivation, superseding every earlier ticket.
    pub fn begin(&self) -> ThemeTicket {
        ThemeTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: ThemeTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Publishes `palette` if `ticket` is still the newest one. Returns whether it was applied.
    pub async fn publish(
        &self,
        ticket: ThemeTicket,
        palette: ThemePalette,
        source: PaletteSource,
    ) -> bool {
        let mut current = self.current.write().await;
        // Checked under the write lock so a stale publish can't land after a newer one.
        if !self.is_current(ticket) {
            return false;
        }
        *current = ThemeSnapshot {
            palette,
            source,
            request_id: ticket.0,
        };
        true
    }

    pub async fn current(&self) -> ThemeSnapshot {
        self.current.read().await.clone()
    }
}

impl Default for ThemeController {
    fn default() -> Self {
        Self::new()
    }
}
