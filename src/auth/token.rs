use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_VALIDITY_DAYS: i64 = 30;
pub const TOKEN_VALIDITY_LABEL: &str = "30d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadClaims {
    pub authorized: bool,
    pub iat: i64,
    pub exp: i64,
}

pub(super) enum TokenCheck {
    Valid(UploadClaims),
    Expired,
    Invalid,
}

pub(super) fn mint(secret: &str, now: DateTime<Utc>) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = UploadClaims {
        authorized: true,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub(super) fn check(secret: &str, token: &str) -> TokenCheck {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<UploadClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) if data.claims.authorized => TokenCheck::Valid(data.claims),
        Ok(_) => TokenCheck::Invalid,
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => TokenCheck::Expired,
        Err(_) => TokenCheck::Invalid,
    }
}
