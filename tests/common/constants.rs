//! Shared constants for end-to-end tests
//!
//! When credentials or mock upstream data change, update only this file.

// ============================================================================
// Credentials
// ============================================================================

pub const UPLOAD_PASSWORD: &str = "test-upload-pass";

pub const JWT_SECRET: &str = "test-jwt-secret";

/// Signed with a different secret than the server's
pub const FOREIGN_JWT_SECRET: &str = "someone-elses-secret";

pub const GEMINI_API_KEY: &str = "test-gemini-key";

pub const GEMINI_MODEL: &str = "test-model";

pub const SPOTIFY_CLIENT_ID: &str = "client-id";

pub const SPOTIFY_CLIENT_SECRET: &str = "client-secret";

pub const SPOTIFY_REFRESH_TOKEN: &str = "refresh-token";

// ============================================================================
// Storage
// ============================================================================

pub const METADATA_KEY: &str = "photos/photos.json";

pub const UPLOAD_PREFIX: &str = "photos";

pub const PUBLIC_BASE_URL: &str = "https://cdn.test.invalid/";

// ============================================================================
// Mock upstream data
// ============================================================================

pub const MOCK_TRACK_TITLE: &str = "Midnight City";

pub const MOCK_ARTISTS: [&str; 2] = ["M83", "Anthony Gonzalez"];

pub const MOCK_SONG_URL: &str = "https://open.spotify.com/track/mock";

/// Accent returned by the mock suggestion provider
pub const MOCK_ACCENT: &str = "#ff3366";

pub const MOCK_MESH: [&str; 4] = ["#0a0208", "#12040c", "#08020a", "#050106"];

/// Refresh token the mock accounts service grants for a valid code
pub const MOCK_GRANTED_REFRESH_TOKEN: &str = "granted-refresh-token";

/// Authorization code the mock accounts service rejects
pub const MOCK_BAD_CODE: &str = "bad-code";

pub const GITHUB_LOGIN: &str = "octo";

pub const MOCK_TOTAL_CONTRIBUTIONS: u64 = 42;

pub const MOCK_PUBLIC_REPOS: u64 = 7;

pub const MOCK_FOLLOWERS: u64 = 3;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Suggestion timeout used by the test server (milliseconds)
pub const TEST_SUGGESTION_TIMEOUT_MS: u64 = 500;

/// How long the slow mock provider stalls before answering (milliseconds)
pub const SLOW_PROVIDER_DELAY_MS: u64 = 2000;
