use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const DEFAULT_FILE_NAME: &str = "upload.jpg";

/// Decodes the `x-file-name` header: base64 of a URI-encoded name.
/// Values that don't decode that way are used verbatim.
pub fn decode_file_name(header: Option<&str>) -> String {
    let Some(raw) = header.filter(|h| !h.is_empty()) else {
        return DEFAULT_FILE_NAME.to_string();
    };

    STANDARD
        .decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|encoded| urlencoding::decode(&encoded).ok().map(|c| c.into_owned()))
        .unwrap_or_else(|| raw.to_string())
}

/// Replaces every character outside `[a-zA-Z0-9.-]` with `-`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Stored file name and full object key for an upload made at `epoch_ms`.
pub fn object_key(prefix: &str, file_name: &str, epoch_ms: i64) -> (String, String) {
    let filename = format!("{}-{}", epoch_ms, sanitize_file_name(file_name));
    let key = format!("{}/{}", prefix, filename);
    (filename, key)
}

/// Public URL for `key`: the configured CDN base, else the store's direct URL, else the key.
pub fn public_url(public_base_url: Option<&str>, direct_url: Option<String>, key: &str) -> String {
    if let Some(base) = public_base_url.filter(|b| !b.is_empty()) {
        let base = base.strip_suffix('/').unwrap_or(base);
        return format!("{}/{}", base, key);
    }
    direct_url.unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_uri_encoded_names() {
        let header = STANDARD.encode("My%20Photo%20%E2%9C%93.jpg");
        assert_eq!(decode_file_name(Some(&header)), "My Photo ✓.jpg");
    }

    #[test]
    fn falls_back_to_raw_header_or_default() {
        assert_eq!(decode_file_name(Some("plain name.jpg")), "plain name.jpg");
        assert_eq!(decode_file_name(None), "upload.jpg");
        assert_eq!(decode_file_name(Some("")), "upload.jpg");
    }

    #[test]
    fn sanitizes_and_prefixes() {
        assert_eq!(sanitize_file_name("My Photo (1).JPG"), "My-Photo--1-.JPG");
        assert_eq!(sanitize_file_name("ünï.png"), "-n-.png");

        let (filename, key) = object_key("photos", "a b.jpg", 1700000000000);
        assert_eq!(filename, "1700000000000-a-b.jpg");
        assert_eq!(key, "photos/1700000000000-a-b.jpg");
    }

    #[test]
    fn public_url_precedence() {
        let direct = || Some("https://acct.r2.cloudflarestorage.com/bucket/photos/k.jpg".to_string());
        assert_eq!(
            public_url(Some("https://cdn.example.com/"), direct(), "photos/k.jpg"),
            "https://cdn.example.com/photos/k.jpg"
        );
        assert_eq!(
            public_url(None, direct(), "photos/k.jpg"),
            "https://acct.r2.cloudflarestorage.com/bucket/photos/k.jpg"
        );
        assert_eq!(public_url(None, None, "photos/k.jpg"), "photos/k.jpg");
    }
}
