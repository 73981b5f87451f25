//! JSON error bodies and the status codes each domain error maps to.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::palette::SuggestionError;
use crate::photo_store::{GatewayError, StoreError};
use crate::upload::UploadError;

/// `{ "error": message }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn storage_not_configured() -> Self {
        Self::internal("Storage not configured")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Missing | AuthError::InvalidToken | AuthError::Expired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Invalid => StatusCode::FORBIDDEN,
        };
        ApiError::new(status, err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!("Storage failure: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(message) => ApiError::bad_request(message),
            GatewayError::Store(err) => err.into(),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotImage | UploadError::MissingFields => {
                ApiError::bad_request(err.to_string())
            }
            UploadError::Store(err) => err.into(),
        }
    }
}

/// Every suggestion failure reads as "unavailable" so callers keep their local palette.
impl From<SuggestionError> for ApiError {
    fn from(err: SuggestionError) -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_keep_absent_and_invalid_apart() {
        assert_eq!(ApiError::from(AuthError::Missing).status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::Invalid).status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(AuthError::Expired).status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(AuthError::NotConfigured("Upload password")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_is_a_bad_request() {
        let err = ApiError::from(GatewayError::Validation("Photo id required".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Photo id required");

        let err = ApiError::from(GatewayError::Store(StoreError::Transport("down".into())));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn suggestion_failures_are_unavailable() {
        assert_eq!(
            ApiError::from(SuggestionError::NotConfigured).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
