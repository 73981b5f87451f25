//! Generative-language provider client for palette suggestions.

use crate::palette::{PaletteSuggester, Rgb, SuggestedPalette, SuggestionError, PAGE_BACKGROUND};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 512;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Builds the instruction text sent to the provider.
pub fn build_prompt(extracted_color: &str, song_title: &str, artist: &str) -> String {
    let or_unknown = |s: &str| {
        if s.trim().is_empty() {
            "unknown".to_string()
        } else {
            s.to_string()
        }
    };
    let title = or_unknown(song_title);
    let artist = or_unknown(artist);
    let bg = PAGE_BACKGROUND;

    format!(
        r##"You are a color expert for a dark-themed portfolio website. The background is very dark ({bg}).

A user is listening to "{title}" by "{artist}".
The dominant color extracted from the album art is: {extracted_color}

Your job: Generate an optimized color palette that:
1. "accent": the PRIMARY accent color. Must be VIBRANT and clearly visible on a {bg} dark background. If the extracted color is too dark (lightness < 35%), too desaturated (saturation < 40%), or too close to black/gray, brighten and saturate it significantly. Minimum lightness: 40%. Minimum saturation: 50%.
2. "accentMuted": the accent at ~15% opacity for borders/glows. Format: "rgb(R G B / 0.15)" using the accent RGB values.
3. "bgBase": very dark background tinted slightly toward the accent hue (lightness 3-8%).
4. "bgElevated": slightly lighter surface for cards (lightness 6-12%), tinted toward the accent.
5. "meshColors": array of 4 very dark hex colors for an animated mesh gradient background, lightness 2-10%, subtly tinted toward the accent hue with slight variations.

IMPORTANT RULES:
- ALL hex colors must be valid 6-digit hex (#RRGGBB format)
- accent MUST have enough contrast on dark backgrounds
- bgBase and bgElevated must remain very dark to maintain readability
- meshColors should be dark moody variants, NOT bright
- Match the mood of the song if possible

Return ONLY valid JSON, no markdown, no explanation:
{{
  "accent": "#HEXCOLOR",
  "accentMuted": "rgb(R G B / 0.15)",
  "bgBase": "#HEXCOLOR",
  "bgElevated": "#HEXCOLOR",
  "meshColors": ["#HEX1", "#HEX2", "#HEX3", "#HEX4"]
}}"##
    )
}

/// Strips a surrounding ```` ```json ```` fence from provider output.
pub fn clean_json_response(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        cleaned = rest.trim_start();
        if let Some(body) = cleaned.trim_end().strip_suffix("```") {
            cleaned = body;
        }
    }
    cleaned.trim()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Client for the `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Sends the prompt and returns the validated palette the provider answered with.
    pub async fn generate_palette(
        &self,
        extracted_color: &str,
        song_title: &str,
        artist: &str,
    ) -> Result<SuggestedPalette, SuggestionError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(extracted_color, song_title, artist)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(model = %self.model, seed = extracted_color, "Requesting palette suggestion");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| SuggestionError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Palette provider request failed");
            return Err(SuggestionError::Upstream(format!("status {}", status)));
        }

        let text = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| SuggestionError::Malformed(e.to_string()))?
            .first_text()
            .ok_or_else(|| SuggestionError::Malformed("empty provider response".to_string()))?;

        let palette: SuggestedPalette = serde_json::from_str(clean_json_response(&text))
            .map_err(|e| SuggestionError::Malformed(e.to_string()))?;
        palette.validate()?;
        Ok(palette)
    }
}

#[async_trait]
impl PaletteSuggester for GeminiClient {
    async fn suggest(
        &self,
        seed: Rgb,
        title: &str,
        artist: &str,
    ) -> Result<SuggestedPalette, SuggestionError> {
        self.generate_palette(&seed.to_hex(), title, artist).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(clean_json_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json_response("```\n{\"a\":1}```  "), "{\"a\":1}");
        assert_eq!(clean_json_response("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn prompt_defaults_missing_track_info() {
        let prompt = build_prompt("#123456", "", "  ");
        assert!(prompt.contains("\"unknown\" by \"unknown\""));
        assert!(prompt.contains("#123456"));
        assert!(prompt.contains("#050508"));
    }

    #[test]
    fn prompt_ends_with_full_json_template() {
        let prompt = build_prompt("#123456", "Song", "Band");
        assert!(prompt.contains(r##""accent": "#HEXCOLOR""##));
        assert!(prompt.ends_with(r##""meshColors": ["#HEX1", "#HEX2", "#HEX3", "#HEX4"]
}"##));
    }

    #[test]
    fn response_text_extraction() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("hello"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.first_text().is_none());
    }
}
