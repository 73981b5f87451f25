//! HTML pages for the OAuth redirect target.

use super::client::CodeExchange;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{}</title></head>
<body style="background:#050508;color:#f0f0f0;font-family:monospace;padding:40px;max-width:600px;">
{}
</body></html>"#,
        escape_html(title),
        body
    )
}

pub fn authorization_failed_page(error: &str) -> String {
    page(
        "Authorization Failed",
        &format!(
            r#"<h1 style="color:#ff4444;">Authorization Failed</h1><p>Error: {}</p>"#,
            escape_html(error)
        ),
    )
}

pub fn missing_code_page() -> String {
    page("No Code", "<h1>No authorization code received</h1>")
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        &format!(
            r#"<h1 style="color:#ff4444;">Error</h1><p>{}</p>"#,
            escape_html(message)
        ),
    )
}

pub fn exchange_page(result: &CodeExchange) -> String {
    match result {
        CodeExchange::Rejected { error, description } => page(
            "Token Exchange Failed",
            &format!(
                r#"<h1 style="color:#ff4444;">Token Exchange Failed</h1><p>Error: {}</p><p>{}</p>"#,
                escape_html(error),
                escape_html(description)
            ),
        ),
        CodeExchange::Granted { refresh_token } => page(
            "Spotify Connected",
            &format!(
                r#"<h1 style="color:#00E5FF;">Spotify Connected!</h1>
<p style="color:#22C55E;font-size:18px;">Authorization successful.</p>
<p style="color:#5A5A6A;">Your refresh token (set it as SPOTIFY_REFRESH_TOKEN):</p>
<div id="token-box" style="background:#0C0C14;border:1px solid #1A1A2E;border-radius:8px;padding:16px;margin:16px 0;word-break:break-all;">
<code style="color:#00E5FF;font-size:14px;">{}</code>
</div>"#,
                escape_html(refresh_token)
            ),
        ),
    }
}
