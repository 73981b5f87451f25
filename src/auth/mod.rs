//! Write credentials: the shared upload password and the signed tokens exchanged for it.

mod token;

pub use token::{UploadClaims, TOKEN_VALIDITY_DAYS, TOKEN_VALIDITY_LABEL};

use chrono::{DateTime, Utc};
use thiserror::Error;
use token::TokenCheck;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("Unauthorized - credential required")]
    Missing,

    #[error("Invalid password")]
    Invalid,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid or expired token")]
    Expired,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: &'static str,
}

#[derive(Clone, Default)]
pub struct Credentials {
    upload_password: Option<String>,
    jwt_secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("upload_password", &self.upload_password.is_some())
            .field("jwt_secret", &self.jwt_secret.is_some())
            .finish()
    }
}

impl Credentials {
    /// Empty values count as unset.
    pub fn new(upload_password: Option<String>, jwt_secret: Option<String>) -> Self {
        Self {
            upload_password: upload_password.filter(|s| !s.is_empty()),
            jwt_secret: jwt_secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn has_password(&self) -> bool {
        self.upload_password.is_some()
    }

    fn password(&self) -> Result<&str, AuthError> {
        self.upload_password
            .as_deref()
            .ok_or(AuthError::NotConfigured("Upload password"))
    }

    fn secret(&self) -> Result<&str, AuthError> {
        self.jwt_secret
            .as_deref()
            .ok_or(AuthError::NotConfigured("Token secret"))
    }

    /// Signs a token without checking any password. Used by the offline token tool.
    pub fn mint_token(&self, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let token = token::mint(self.secret()?, now)
            .map_err(|_| AuthError::NotConfigured("Token signing"))?;
        Ok(IssuedToken {
            token,
            expires_in: TOKEN_VALIDITY_LABEL,
        })
    }

    /// Exchanges the shared password for a signed token.
    pub fn issue_token(&self, password: Option<&str>) -> Result<IssuedToken, AuthError> {
        let expected = self.password()?;
        match password {
            Some(p) if !p.is_empty() && p == expected => self.mint_token(Utc::now()),
            _ => Err(AuthError::Invalid),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<UploadClaims, AuthError> {
        match token::check(self.secret()?, token) {
            TokenCheck::Valid(claims) => Ok(claims),
            TokenCheck::Expired => Err(AuthError::Expired),
            TokenCheck::Invalid => Err(AuthError::InvalidToken),
        }
    }

    /// Checks an `Authorization` header value. Accepts the password itself or a signed token.
    pub fn check_bearer(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let expected = self.password()?;
        let provided = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::Missing)?;

        if provided == expected {
            return Ok(());
        }
        if self.jwt_secret.is_some() && self.verify_token(provided).is_ok() {
            debug!("Bearer accepted as signed token");
            return Ok(());
        }
        Err(AuthError::Invalid)
    }

    /// Checks upload headers. A token, when present, takes precedence over the password.
    ///
    /// Without a token secret no token can verify, so a presented token is rejected as invalid.
    pub fn check_upload_headers(
        &self,
        token: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), AuthError> {
        let expected = self.password()?;
        match (token.filter(|t| !t.is_empty()), password.filter(|p| !p.is_empty())) {
            (Some(_), _) if self.jwt_secret.is_none() => {
                debug!("Upload token presented but no token secret is configured");
                Err(AuthError::InvalidToken)
            }
            (Some(token), _) => self.verify_token(token).map(|_| ()),
            (None, Some(password)) if password == expected => Ok(()),
            (None, Some(_)) => Err(AuthError::Invalid),
            (None, None) => Err(AuthError::Missing),
        }
    }
}
