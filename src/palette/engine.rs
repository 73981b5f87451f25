//! Deterministic palette derivation from a seed color.

use super::color::{Hsl, Rgb};
use serde::{Deserialize, Serialize};

/// Base page color every dark tone is blended against.
pub const PAGE_BACKGROUND: &str = "#050508";

pub const DEFAULT_ACCENT: &str = "#00e5ff";
pub const DEFAULT_ACCENT_RGB: &str = "0 229 255";
pub const DEFAULT_ACCENT_MUTED: &str = "rgb(0 229 255 / 0.15)";
pub const DEFAULT_BG_BASE: &str = "#050508";
pub const DEFAULT_BG_ELEVATED: &str = "#10101c";
pub const DEFAULT_MESH: [&str; 4] = ["#020818", "#050a1a", "#0a0e24", "#02060f"];
pub const DEFAULT_GRADIENT: &str =
    "radial-gradient(ellipse at top, #0A0A1A 0%, #050508 50%, #020205 100%)";

const MIN_VISIBLE_SATURATION: f64 = 0.55;
const MIN_VISIBLE_LIGHTNESS: f64 = 0.5;
const MAX_VISIBLE_LIGHTNESS: f64 = 0.65;
const SATURATION_NUDGE: f64 = 0.01;
const LIGHTNESS_NUDGE: f64 = 1.0 / 255.0;
const MAX_BOOST_NUDGES: usize = 16;

/// The full set of theme colors handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePalette {
    /// Primary highlight color, `#rrggbb`.
    pub accent: String,
    /// Accent as `"r g b"`.
    pub accent_rgb: String,
    /// Accent at 15% opacity, for borders and glows.
    pub accent_muted: String,
    /// Deepest background layer, tinted toward the accent.
    pub bg_base: String,
    /// Card/surface background.
    pub bg_elevated: String,
    /// Near-black tones for the animated mesh background.
    pub mesh_colors: [String; 4],
    /// CSS radial gradient for the page background.
    pub background_gradient: String,
}

impl ThemePalette {
    /// Palette used whenever nothing is playing.
    pub fn default_palette() -> Self {
        Self {
            accent: DEFAULT_ACCENT.to_string(),
            accent_rgb: DEFAULT_ACCENT_RGB.to_string(),
            accent_muted: DEFAULT_ACCENT_MUTED.to_string(),
            bg_base: DEFAULT_BG_BASE.to_string(),
            bg_elevated: DEFAULT_BG_ELEVATED.to_string(),
            mesh_colors: DEFAULT_MESH.map(str::to_string),
            background_gradient: DEFAULT_GRADIENT.to_string(),
        }
    }

    /// CSS custom properties in the order a stylesheet declares them.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--accent", self.accent.clone()),
            ("--accent-rgb", self.accent_rgb.clone()),
            ("--bg-base", self.bg_base.clone()),
            ("--bg-elevated", self.bg_elevated.clone()),
        ]
    }
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::default_palette()
    }
}

/// Boosts muddy or too dark/light seeds so they read on a near-black page.
///
/// Seeds with saturation above 0.4 and lightness inside (0.35, 0.75) are
/// returned unchanged. Everything else gets saturation of at least 0.55 and
/// lightness inside [0.5, 0.65], measured on the rounded output color.
pub fn ensure_visible_on_dark(seed: Rgb) -> Rgb {
    let hsl = seed.to_hsl();
    if hsl.s > 0.4 && hsl.l > 0.35 && hsl.l < 0.75 {
        return seed;
    }

    let mut target = Hsl::new(
        hsl.h,
        hsl.s.max(MIN_VISIBLE_SATURATION),
        hsl.l.clamp(MIN_VISIBLE_LIGHTNESS, MAX_VISIBLE_LIGHTNESS),
    );
    let mut out = target.to_rgb();
    // Rounding to u8 channels can push the result just outside the band.
    for _ in 0..MAX_BOOST_NUDGES {
        let got = out.to_hsl();
        let saturated = got.s >= MIN_VISIBLE_SATURATION;
        if saturated && (MIN_VISIBLE_LIGHTNESS..=MAX_VISIBLE_LIGHTNESS).contains(&got.l) {
            break;
        }
        if !saturated {
            target.s = (target.s + SATURATION_NUDGE).min(1.0);
        }
        if got.l < MIN_VISIBLE_LIGHTNESS {
            target.l += LIGHTNESS_NUDGE;
        } else if got.l > MAX_VISIBLE_LIGHTNESS {
            target.l -= LIGHTNESS_NUDGE;
        }
        out = target.to_rgb();
    }
    out
}

pub fn generate_local_palette(seed: Rgb, is_playing: bool) -> ThemePalette {
    if !is_playing {
        return ThemePalette::default_palette();
    }

    let accent = ensure_visible_on_dark(seed);
    palette_from_accent(accent)
}

/// Derives every non-accent field from an accent that is already visible.
pub(crate) fn palette_from_accent(accent: Rgb) -> ThemePalette {
    ThemePalette {
        accent: accent.to_hex(),
        accent_rgb: accent.triplet(),
        accent_muted: muted_accent(accent),
        bg_base: bg_base(accent),
        bg_elevated: bg_elevated(accent),
        mesh_colors: generate_mesh_colors(accent),
        background_gradient: generate_gradient(accent),
    }
}

pub(crate) fn muted_accent(accent: Rgb) -> String {
    format!("rgb({} / 0.15)", accent.triplet())
}

pub(crate) fn bg_base(accent: Rgb) -> String {
    format!("rgb({})", accent.scaled(0.16).triplet())
}

pub(crate) fn bg_elevated(accent: Rgb) -> String {
    format!("rgb({})", accent.scaled(0.28).triplet())
}

/// Four near-black tints, each leaning toward a different channel.
pub fn generate_mesh_colors(accent: Rgb) -> [String; 4] {
    [
        accent.scaled(0.12),
        accent.scaled_each([0.08, 0.06, 0.15], [5.0, 0.0, 0.0]),
        accent.scaled_each([0.06, 0.1, 0.08], [0.0, 3.0, 0.0]),
        accent.scaled_each([0.04, 0.04, 0.06], [0.0; 3]),
    ]
    .map(Rgb::to_hex)
}

pub fn generate_gradient(accent: Rgb) -> String {
    let dark = accent.scaled(0.15);
    let mid = accent.scaled(0.08);
    format!(
        "radial-gradient(ellipse at top, rgb({}, {}, {}) 0%, rgb({}, {}, {}) 40%, {} 100%)",
        dark.r, dark.g, dark.b, mid.r, mid.g, mid.b, PAGE_BACKGROUND
    )
}
