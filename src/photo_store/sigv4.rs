//! AWS Signature Version 4 for S3-compatible stores: header signing and query presigning.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const SERVICE: &str = "s3";

#[derive(Clone)]
pub struct SigningCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA-256 accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// RFC 3986 encoding as S3 expects it. Slashes are kept when encoding a path.
pub fn uri_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if keep_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

fn scope(creds: &SigningCredentials, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}/aws4_request",
        now.format("%Y%m%d"),
        creds.region,
        SERVICE
    )
}

fn signature(creds: &SigningCredentials, now: DateTime<Utc>, canonical_request: &str) -> String {
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date(now),
        scope(creds, now),
        sha256_hex(canonical_request.as_bytes())
    );

    let date_key = hmac(
        format!("AWS4{}", creds.secret_access_key).as_bytes(),
        now.format("%Y%m%d").to_string().as_bytes(),
    );
    let region_key = hmac(&date_key, creds.region.as_bytes());
    let service_key = hmac(&region_key, SERVICE.as_bytes());
    let signing_key = hmac(&service_key, b"aws4_request");
    hex::encode(hmac(&signing_key, string_to_sign.as_bytes()))
}

fn canonical_query(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (uri_encode(k, false), uri_encode(v, false)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Headers to attach to a signed request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub content_sha256: String,
}

/// Signs a request in the `Authorization` header.
///
/// `canonical_uri` must already be URI-encoded. `headers` are the extra headers to
/// sign besides `host`, `x-amz-content-sha256` and `x-amz-date`, lower-case names.
pub fn sign_request(
    creds: &SigningCredentials,
    method: &str,
    host: &str,
    canonical_uri: &str,
    headers: &[(&str, &str)],
    payload_hash: &str,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let date = amz_date(now);
    let mut all: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    all.push(("host".to_string(), host.to_string()));
    all.push(("x-amz-content-sha256".to_string(), payload_hash.to_string()));
    all.push(("x-amz-date".to_string(), date.clone()));
    all.sort();

    let canonical_headers: String = all.iter().map(|(k, v)| format!("{}:{}\n", k, v)).collect();
    let signed_headers = all
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        method, canonical_uri, canonical_headers, signed_headers, payload_hash
    );

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        creds.access_key_id,
        scope(creds, now),
        signed_headers,
        signature(creds, now, &canonical_request)
    );

    SignedHeaders {
        authorization,
        amz_date: date,
        content_sha256: payload_hash.to_string(),
    }
}

/// Builds the query string of a pre-signed URL. Only `host` is signed.
pub fn presign_query(
    creds: &SigningCredentials,
    method: &str,
    host: &str,
    canonical_uri: &str,
    expires_secs: u64,
    now: DateTime<Utc>,
) -> String {
    let params = vec![
        ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
        (
            "X-Amz-Credential".to_string(),
            format!("{}/{}", creds.access_key_id, scope(creds, now)),
        ),
        ("X-Amz-Date".to_string(), amz_date(now)),
        ("X-Amz-Expires".to_string(), expires_secs.to_string()),
        ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
    ];
    let query = canonical_query(&params);

    let canonical_request = format!(
        "{}\n{}\n{}\nhost:{}\n\nhost\n{}",
        method, canonical_uri, query, host, UNSIGNED_PAYLOAD
    );

    format!(
        "{}&X-Amz-Signature={}",
        query,
        signature(creds, now, &canonical_request)
    )
}
