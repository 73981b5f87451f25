//! Seed color selection: genre keyword fallback and album-art extraction.

use super::color::Rgb;
use image::imageops::FilterType;
use std::time::Duration;
use tracing::debug;

pub const FALLBACK_SEED: Rgb = Rgb::new(0x00, 0xe5, 0xff);

/// Keyword to color table, scanned in order. The first keyword found in the
/// lower-cased "artist title" text wins.
const GENRE_COLORS: &[(&str, Rgb)] = &[
    ("pop", Rgb::new(0xff, 0x6b, 0x9d)),
    ("rock", Rgb::new(0xff, 0x47, 0x57)),
    ("electronic", Rgb::new(0x00, 0xe5, 0xff)),
    ("edm", Rgb::new(0x00, 0xe5, 0xff)),
    ("hip", Rgb::new(0xff, 0xd7, 0x00)),
    ("rap", Rgb::new(0xff, 0xd7, 0x00)),
    ("jazz", Rgb::new(0xdd, 0xa0, 0xdd)),
    ("classical", Rgb::new(0xf5, 0xde, 0xb3)),
    ("indie", Rgb::new(0x98, 0xd8, 0xc8)),
    ("rnb", Rgb::new(0xe6, 0xa8, 0xd7)),
    ("soul", Rgb::new(0xe6, 0xa8, 0xd7)),
    ("metal", Rgb::new(0x2f, 0x35, 0x42)),
    ("country", Rgb::new(0xde, 0xb8, 0x87)),
    ("folk", Rgb::new(0xd2, 0x69, 0x1e)),
    ("blues", Rgb::new(0x41, 0x69, 0xe1)),
    ("reggae", Rgb::new(0x32, 0xcd, 0x32)),
    ("latin", Rgb::new(0xff, 0x63, 0x47)),
    ("kpop", Rgb::new(0xff, 0x69, 0xb4)),
    ("lofi", Rgb::new(0x8b, 0x9d, 0xc3)),
    ("ambient", Rgb::new(0xb0, 0xc4, 0xde)),
    ("house", Rgb::new(0x7b, 0x68, 0xee)),
    ("techno", Rgb::new(0x48, 0x3d, 0x8b)),
];

pub fn genre_color(artist: &str, title: &str) -> Rgb {
    let text = format!("{} {}", artist, title).to_lowercase();
    GENRE_COLORS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_SEED)
}

const SAMPLE_SIZE: u32 = 64;
const MIN_ALPHA: u8 = 200;

/// Average color of an encoded image, preferring its vivid pixels.
///
/// The image is stretched to 64x64; pixels with alpha below 200 are skipped.
/// Returns `None` when the bytes don't decode or no pixel is opaque enough.
pub fn dominant_color(bytes: &[u8]) -> Option<Rgb> {
    let image = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(err) => {
            debug!("Could not decode album art: {}", err);
            return None;
        }
    };
    let sample = image
        .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
        .to_rgba8();

    let mut all = ChannelSum::default();
    let mut vivid = ChannelSum::default();

    for pixel in sample.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < MIN_ALPHA {
            continue;
        }
        let color = Rgb::new(r, g, b);
        all.add(color);

        let hsl = color.to_hsl();
        if hsl.s > 0.35 && hsl.l > 0.2 && hsl.l < 0.85 {
            vivid.add(color);
        }
    }

    vivid.average().or_else(|| all.average())
}

/// Downloads album art and extracts its dominant color. Any failure yields `None`.
pub async fn dominant_color_from_url(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Option<Rgb> {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            debug!("Album art request returned {}", r.status());
            return None;
        }
        Err(err) => {
            debug!("Album art request failed: {}", err);
            return None;
        }
    };
    let bytes = response.bytes().await.ok()?;
    tokio::task::spawn_blocking(move || dominant_color(&bytes))
        .await
        .ok()
        .flatten()
}

#[derive(Default)]
struct ChannelSum {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

impl ChannelSum {
    fn add(&mut self, c: Rgb) {
        self.count += 1;
        self.r += c.r as u64;
        self.g += c.g as u64;
        self.b += c.b as u64;
    }

    fn average(&self) -> Option<Rgb> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Rgb::from_f64(
            self.r as f64 / n,
            self.g as f64 / n,
            self.b as f64 / n,
        ))
    }
}
