//! S3-compatible object store (Cloudflare R2 in production), path-style addressing.

use super::object_store::{ObjectStore, StoreError};
use super::sigv4::{presign_query, sha256_hex, sign_request, uri_encode, SigningCredentials};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3Config {
    /// R2 account endpoint, region `auto`.
    pub fn r2(account_id: &str, bucket: &str, access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            endpoint: format!("https://{}.r2.cloudflarestorage.com", account_id),
            bucket: bucket.to_string(),
            region: "auto".to_string(),
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        }
    }
}

pub struct S3Store {
    client: Client,
    endpoint: String,
    host: String,
    bucket: String,
    credentials: SigningCredentials,
}

impl S3Store {
    pub fn new(config: S3Config) -> Result<Self, StoreError> {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| StoreError::NotConfigured(format!("invalid endpoint: {}", e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(StoreError::NotConfigured(
                    "endpoint has no host".to_string(),
                ))
            }
        };

        Ok(Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| StoreError::Transport(e.to_string()))?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            host,
            bucket: config.bucket,
            credentials: SigningCredentials {
                access_key_id: config.access_key_id,
                secret_access_key: config.secret_access_key,
                region: config.region,
            },
        })
    }

    fn canonical_uri(&self, key: &str) -> String {
        format!("/{}/{}", uri_encode(&self.bucket, false), uri_encode(key, true))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let uri = self.canonical_uri(key);
        let signed = sign_request(
            &self.credentials,
            "GET",
            &self.host,
            &uri,
            &[],
            &sha256_hex(b""),
            chrono::Utc::now(),
        );

        debug!("S3 GET {}/{}", self.bucket, key);
        let response = self
            .client
            .get(format!("{}{}", self.endpoint, uri))
            .header("authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            s if s.is_success() => Ok(response
                .bytes()
                .await
                .map_err(|e| StoreError::Transport(e.to_string()))?
                .to_vec()),
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Transport(format!("GET {} returned {}: {}", key, s, body)))
            }
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let uri = self.canonical_uri(key);
        let signed = sign_request(
            &self.credentials,
            "PUT",
            &self.host,
            &uri,
            &[("content-type", content_type)],
            &sha256_hex(&body),
            chrono::Utc::now(),
        );

        debug!("S3 PUT {}/{} ({} bytes)", self.bucket, key, body.len());
        let response = self
            .client
            .put(format!("{}{}", self.endpoint, uri))
            .header("authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transport(format!(
                "PUT {} returned {}: {}",
                key, status, body
            )));
        }
        Ok(())
    }

    fn presign_put(&self, key: &str, expires_in: Duration) -> Result<String, StoreError> {
        let uri = self.canonical_uri(key);
        let query = presign_query(
            &self.credentials,
            "PUT",
            &self.host,
            &uri,
            expires_in.as_secs(),
            chrono::Utc::now(),
        );
        Ok(format!("{}{}?{}", self.endpoint, uri, query))
    }

    fn object_url(&self, key: &str) -> Option<String> {
        Some(format!("{}/{}/{}", self.endpoint, self.bucket, key))
    }

    fn location(&self) -> String {
        self.bucket.clone()
    }
}
