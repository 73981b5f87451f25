//! RGB / HSL / hex conversions.
//!
//! Hue is kept in `[0, 1)`, saturation and lightness in `[0, 1]`. Hex output is
//! always lowercase `#rrggbb` with zero-padded channels.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use thiserror::Error;

lazy_static! {
    static ref HEX_COLOR_RE: Regex = Regex::new("^#[0-9a-fA-F]{6}$").expect("valid hex regex");
}

/// Returns true for a strict `#RRGGBB` string.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid hex color: {0:?}")]
pub struct ColorParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb` (any case).
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let clean = value.strip_prefix('#').unwrap_or(value);
        if clean.len() != 6 || !clean.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(value.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&clean[range], 16).map_err(|_| ColorParseError(value.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Builds a color from float channels, rounding and clamping into `0..=255`.
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let clamp = |x: f64| x.round().clamp(0.0, 255.0) as u8;
        Self {
            r: clamp(r),
            g: clamp(g),
            b: clamp(b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Space separated `"r g b"`, the form consumed by `rgb(var(--accent-rgb) / a)`.
    pub fn triplet(self) -> String {
        format!("{} {} {}", self.r, self.g, self.b)
    }

    /// Multiplies each channel and floors the result.
    pub fn scaled(self, factor: f64) -> Self {
        self.scaled_each([factor; 3], [0.0; 3])
    }

    /// Per-channel `floor(channel * factor + offset)`.
    pub fn scaled_each(self, factors: [f64; 3], offsets: [f64; 3]) -> Self {
        let apply = |c: u8, i: usize| (c as f64 * factors[i] + offsets[i]).floor();
        Self::from_f64(apply(self.r, 0), apply(self.g, 1), apply(self.b, 2))
    }

    pub fn to_hsl(self) -> Hsl {
        let rn = self.r as f64 / 255.0;
        let gn = self.g as f64 / 255.0;
        let bn = self.b as f64 / 255.0;
        let max = rn.max(gn).max(bn);
        let min = rn.min(gn).min(bn);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta == 0.0 {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };

        let h = if max == rn {
            (gn - bn) / delta + if gn < bn { 6.0 } else { 0.0 }
        } else if max == gn {
            (bn - rn) / delta + 2.0
        } else {
            (rn - gn) / delta + 4.0
        };

        Hsl {
            h: (h / 6.0).rem_euclid(1.0),
            s,
            l,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: h.rem_euclid(1.0),
            s: s.clamp(0.0, 1.0),
            l: l.clamp(0.0, 1.0),
        }
    }

    pub fn to_rgb(self) -> Rgb {
        if self.s == 0.0 {
            let v = self.l * 255.0;
            return Rgb::from_f64(v, v, v);
        }

        let q = if self.l < 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let p = 2.0 * self.l - q;

        Rgb::from_f64(
            hue_to_channel(p, q, self.h + 1.0 / 3.0) * 255.0,
            hue_to_channel(p, q, self.h) * 255.0,
            hue_to_channel(p, q, self.h - 1.0 / 3.0) * 255.0,
        )
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
