//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use base64::Engine;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// How write requests authenticate.
#[derive(Debug, Clone)]
pub enum Credential {
    None,
    /// `Authorization: Bearer <value>` / `x-upload-password: <value>`
    Password(String),
    /// `Authorization: Bearer <token>` / `x-upload-token: <token>`
    Token(String),
}

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    pub credential: Credential,
}

impl TestClient {
    /// Creates a client that sends no credentials
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            credential: Credential::None,
        }
    }

    /// Creates a client that authenticates with the shared upload password
    pub fn with_password(base_url: String) -> Self {
        Self::new(base_url).credential(Credential::Password(UPLOAD_PASSWORD.to_string()))
    }

    /// Creates a client holding a token obtained from the token endpoint
    ///
    /// # Panics
    ///
    /// Panics if the token exchange fails (indicates test infrastructure problem).
    pub async fn with_token(base_url: String) -> Self {
        let client = Self::new(base_url);
        let response = client.request_token(Some(UPLOAD_PASSWORD)).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Token exchange failed"
        );
        let body: Value = response.json().await.expect("Token response is not JSON");
        let token = body["token"].as_str().expect("No token in response").to_string();
        client.credential(Credential::Token(token))
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::None => request,
            Credential::Password(value) | Credential::Token(value) => request.bearer_auth(value),
        }
    }

    fn upload_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::None => request,
            Credential::Password(value) => request.header("x-upload-password", value),
            Credential::Token(value) => request.header("x-upload-token", value),
        }
    }

    // ========================================================================
    // Photo Endpoints
    // ========================================================================

    /// GET /api/photos
    pub async fn get_photos(&self) -> Response {
        self.client
            .get(self.url("/api/photos"))
            .send()
            .await
            .expect("Get photos request failed")
    }

    /// GET /api/photos, parsed
    pub async fn photos_document(&self) -> Value {
        let response = self.get_photos().await;
        assert!(response.status().is_success());
        response.json().await.expect("Photos document is not JSON")
    }

    /// POST /api/photos
    pub async fn create_photo(&self, photo: Value) -> Response {
        self.bearer(self.client.post(self.url("/api/photos")))
            .json(&json!({ "photo": photo }))
            .send()
            .await
            .expect("Create photo request failed")
    }

    /// PUT /api/photos
    pub async fn update_photos(&self, update: Value) -> Response {
        self.bearer(self.client.put(self.url("/api/photos")))
            .json(&update)
            .send()
            .await
            .expect("Update photos request failed")
    }

    /// DELETE /api/photos
    pub async fn delete_photo(&self, id: &str) -> Response {
        self.bearer(self.client.delete(self.url("/api/photos")))
            .json(&json!({ "id": id }))
            .send()
            .await
            .expect("Delete photo request failed")
    }

    // ========================================================================
    // Auth and Upload Endpoints
    // ========================================================================

    /// POST /api/auth/token
    pub async fn request_token(&self, password: Option<&str>) -> Response {
        let body = match password {
            Some(password) => json!({ "password": password }),
            None => json!({}),
        };
        self.client
            .post(self.url("/api/auth/token"))
            .json(&body)
            .send()
            .await
            .expect("Token request failed")
    }

    /// POST /api/upload with the file name encoded the way the browser client does
    pub async fn upload(&self, file_name: &str, content_type: &str, body: Vec<u8>) -> Response {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(urlencoding::encode(file_name).as_bytes());
        self.upload_headers(self.client.post(self.url("/api/upload")))
            .header("content-type", content_type)
            .header("x-file-name", encoded)
            .body(body)
            .send()
            .await
            .expect("Upload request failed")
    }

    /// POST /api/upload/presigned
    pub async fn presign(&self, body: Value) -> Response {
        self.upload_headers(self.client.post(self.url("/api/upload/presigned")))
            .json(&body)
            .send()
            .await
            .expect("Presign request failed")
    }

    // ========================================================================
    // Theme Endpoints
    // ========================================================================

    /// POST /api/colors
    pub async fn suggest_colors(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/colors"))
            .json(&body)
            .send()
            .await
            .expect("Colors request failed")
    }

    /// GET /api/theme
    pub async fn get_theme(&self) -> Response {
        self.client
            .get(self.url("/api/theme"))
            .send()
            .await
            .expect("Theme request failed")
    }

    // ========================================================================
    // Integration Endpoints
    // ========================================================================

    /// GET /api/now-playing
    pub async fn now_playing(&self) -> Response {
        self.client
            .get(self.url("/api/now-playing"))
            .send()
            .await
            .expect("Now playing request failed")
    }

    /// GET /api/callback with the given query string
    pub async fn callback(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/api/callback"))
            .query(query)
            .send()
            .await
            .expect("Callback request failed")
    }

    /// GET /api/github
    pub async fn contributions(&self) -> Response {
        self.client
            .get(self.url("/api/github"))
            .send()
            .await
            .expect("Contributions request failed")
    }

    /// GET /api/debug/storage
    pub async fn debug_storage(&self) -> Response {
        self.client
            .get(self.url("/api/debug/storage"))
            .send()
            .await
            .expect("Debug storage request failed")
    }
}
