//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_photos() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_photos().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(dead_code, unused_imports)]

mod client;
mod constants;
mod mocks;
mod server;

// Public API - this is what tests import
pub use client::{Credential, TestClient};
pub use constants::*;
pub use mocks::{MockUpstreams, PlayerMode, ProviderMode};
pub use server::{TestServer, TestServerOptions};
