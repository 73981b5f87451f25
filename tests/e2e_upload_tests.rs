//! End-to-end tests for token exchange and image uploads

mod common;

use chrono::Utc;
use common::{
    Credential, TestClient, TestServer, TestServerOptions, FOREIGN_JWT_SECRET, PUBLIC_BASE_URL,
    UPLOAD_PASSWORD, UPLOAD_PREFIX,
};
use portfolio_server::auth::Credentials;
use reqwest::StatusCode;
use serde_json::{json, Value};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[tokio::test]
async fn test_token_exchange() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.request_token(Some(UPLOAD_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["expiresIn"], "30d");
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_exchange_rejects_wrong_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.request_token(Some("guess")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid password");

    let response = client.request_token(None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_exchange_without_secret_is_server_error() {
    let server = TestServer::spawn_with(TestServerOptions {
        jwt_secret: None,
        ..Default::default()
    })
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.request_token(Some(UPLOAD_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upload_with_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_password(server.base_url.clone());

    let response = client
        .upload("Beach Day ✓.png", "image/png", PNG_BYTES.to_vec())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["size"], PNG_BYTES.len());
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.ends_with("-Beach-Day--.png"), "{}", filename);
    let path = body["path"].as_str().unwrap();
    assert_eq!(path, format!("{}/{}", UPLOAD_PREFIX, filename));
    assert_eq!(
        body["url"],
        format!("{}{}", PUBLIC_BASE_URL, path)
    );

    let stored = server.memory_store().object(path).unwrap();
    assert_eq!(stored.body, PNG_BYTES);
    assert_eq!(stored.content_type, "image/png");
}

#[tokio::test]
async fn test_upload_with_token() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_token(server.base_url.clone()).await;

    let response = client.upload("a.jpg", "image/jpeg", vec![1, 2, 3]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.memory_store().put_count(), 1);
}

#[tokio::test]
async fn test_upload_rejects_bad_credentials() {
    let server = TestServer::spawn().await;

    let anonymous = TestClient::new(server.base_url.clone());
    let response = anonymous.upload("a.jpg", "image/jpeg", vec![1]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong_password = TestClient::new(server.base_url.clone())
        .credential(Credential::Password("guess".to_string()));
    let response = wrong_password.upload("a.jpg", "image/jpeg", vec![1]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let garbage_token = TestClient::new(server.base_url.clone())
        .credential(Credential::Token("not-a-token".to_string()));
    let response = garbage_token.upload("a.jpg", "image/jpeg", vec![1]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let foreign = Credentials::new(
        Some(UPLOAD_PASSWORD.to_string()),
        Some(FOREIGN_JWT_SECRET.to_string()),
    )
    .mint_token(Utc::now())
    .unwrap();
    let foreign_token = TestClient::new(server.base_url.clone())
        .credential(Credential::Token(foreign.token));
    let response = foreign_token.upload("a.jpg", "image/jpeg", vec![1]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(server.memory_store().put_count(), 0);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_password(server.base_url.clone());

    let response = client
        .upload("notes.pdf", "application/pdf", vec![1, 2, 3])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Only image files are allowed");
    assert_eq!(server.memory_store().put_count(), 0);
}

#[tokio::test]
async fn test_presigned_upload() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_password(server.base_url.clone());

    let response = client
        .presign(json!({ "fileName": "sunset shot.jpg", "fileType": "image/jpeg" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    let key = body["key"].as_str().unwrap();
    assert!(key.starts_with(&format!("{}/", UPLOAD_PREFIX)));
    assert!(key.ends_with("-sunset-shot.jpg"));
    assert_eq!(body["presignedUrl"], format!("memory://{}?expires=3600", key));
    assert_eq!(body["publicUrl"], format!("{}{}", PUBLIC_BASE_URL, key));
    // Nothing is stored until the client uses the URL
    assert_eq!(server.memory_store().put_count(), 0);
}

#[tokio::test]
async fn test_presign_requires_both_fields() {
    let server = TestServer::spawn().await;
    let client = TestClient::with_password(server.base_url.clone());

    let response = client.presign(json!({ "fileName": "a.jpg" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.presign(json!({ "fileType": "image/jpeg" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_presign_requires_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .presign(json!({ "fileName": "a.jpg", "fileType": "image/jpeg" }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_without_storage() {
    let server = TestServer::spawn_with(TestServerOptions {
        storage: false,
        ..Default::default()
    })
    .await;
    let client = TestClient::with_password(server.base_url.clone());

    let response = client.upload("a.jpg", "image/jpeg", vec![1]).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upload_token_without_secret_is_unauthorized() {
    let server = TestServer::spawn_with(TestServerOptions {
        jwt_secret: None,
        ..Default::default()
    })
    .await;

    let token = Credentials::new(
        Some(UPLOAD_PASSWORD.to_string()),
        Some(FOREIGN_JWT_SECRET.to_string()),
    )
    .mint_token(Utc::now())
    .unwrap();
    let client = TestClient::new(server.base_url.clone()).credential(Credential::Token(token.token));

    let response = client.upload("a.jpg", "image/jpeg", vec![1]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.memory_store().put_count(), 0);
}
