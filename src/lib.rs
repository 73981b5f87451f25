//! Portfolio server library
//!
//! Photo metadata, uploads, dynamic theming and the third-party integrations
//! behind the portfolio site. Exposed as a library for the binaries and tests.

pub mod auth;
pub mod color_suggest;
pub mod config;
pub mod contributions;
pub mod now_playing;
pub mod palette;
pub mod photo_store;
pub mod server;
pub mod upload;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig, Secrets};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerState};
