use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::server::metrics::record_upstream_fallback;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3001/api/callback";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub redirect_uri: String,
    pub accounts_url: String,
    pub api_url: String,
}

/// What the site shows about the current track.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_url: Option<String>,
}

impl NowPlaying {
    pub fn idle() -> Self {
        Self::default()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct CurrentlyPlaying {
    #[serde(default)]
    is_playing: bool,
    item: Option<Item>,
}

#[derive(Deserialize)]
struct Item {
    name: String,
    #[serde(default)]
    artists: Vec<Named>,
    #[serde(default)]
    album: Album,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize, Default)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Deserialize)]
struct Image {
    url: String,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl From<CurrentlyPlaying> for NowPlaying {
    fn from(data: CurrentlyPlaying) -> Self {
        let Some(item) = data.item else {
            return NowPlaying::idle();
        };
        NowPlaying {
            is_playing: data.is_playing,
            title: Some(item.name),
            artist: Some(
                item.artists
                    .into_iter()
                    .map(|a| a.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            album_art: item.album.images.into_iter().next().map(|i| i.url),
            song_url: item.external_urls.spotify,
        }
    }
}

/// Result of exchanging an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeExchange {
    Granted { refresh_token: String },
    Rejected { error: String, description: String },
}

pub struct SpotifyClient {
    client: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.config.accounts_url.trim_end_matches('/'))
    }

    fn client_credentials(&self) -> (&str, &str) {
        (
            self.config.client_id.as_deref().unwrap_or_default(),
            self.config.client_secret.as_deref().unwrap_or_default(),
        )
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let (id, secret) = self.client_credentials();
        let response = self
            .client
            .post(self.token_url())
            .basic_auth(id, Some(secret))
            .form(form)
            .send()
            .await
            .context("token request failed")?;
        let status = response.status();
        let body: TokenResponse = response
            .json()
            .await
            .with_context(|| format!("token response ({}) is not JSON", status))?;
        Ok(body)
    }

    /// Currently playing track. Every failure reads as "not playing".
    pub async fn now_playing(&self) -> NowPlaying {
        match self.try_now_playing().await {
            Ok(now) => now,
            Err(err) => {
                warn!("Now playing unavailable: {:#}", err);
                record_upstream_fallback("now_playing");
                NowPlaying::idle()
            }
        }
    }

    async fn try_now_playing(&self) -> Result<NowPlaying> {
        let (Some(_), Some(_), Some(refresh_token)) = (
            &self.config.client_id,
            &self.config.client_secret,
            &self.config.refresh_token,
        ) else {
            debug!("Now playing credentials not configured");
            return Ok(NowPlaying::idle());
        };

        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await?;
        let Some(access_token) = token.access_token else {
            bail!(
                "token refresh returned no access token: {}",
                token.error.unwrap_or_default()
            );
        };

        let response = self
            .client
            .get(format!(
                "{}/v1/me/player/currently-playing",
                self.config.api_url.trim_end_matches('/')
            ))
            .bearer_auth(access_token)
            .send()
            .await
            .context("currently-playing request failed")?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status.as_u16() > 400 {
            debug!("Currently-playing returned {}", status);
            return Ok(NowPlaying::idle());
        }

        let data: CurrentlyPlaying = response
            .json()
            .await
            .context("currently-playing response is not valid")?;
        Ok(data.into())
    }

    /// Exchanges an OAuth authorization code for a refresh token.
    pub async fn exchange_code(&self, code: &str) -> Result<CodeExchange> {
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        if let Some(error) = token.error {
            return Ok(CodeExchange::Rejected {
                error,
                description: token.error_description.unwrap_or_default(),
            });
        }
        Ok(CodeExchange::Granted {
            refresh_token: token.refresh_token.unwrap_or_default(),
        })
    }
}
