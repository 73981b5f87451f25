pub mod config;
mod errors;
mod http_layers;
mod integration_routes;
pub mod metrics;
mod photo_routes;
pub mod server;
pub(self) mod session;
pub mod state;
mod theme_routes;
mod upload_routes;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::{HEADER_UPLOAD_PASSWORD, HEADER_UPLOAD_TOKEN};
pub use state::ServerState;
pub use upload_routes::HEADER_FILE_NAME;
