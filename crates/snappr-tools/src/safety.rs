//! Redaction helpers for anything that ends up in logs or tool results.
//!
//! Query strings can carry customer addresses and emails, so outbound URLs are logged and reported
//! without them. The API key travels in a header and is never formatted at all.

use url::Url;

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

/// Render a `reqwest` error for humans, with the request URL redacted and the failure classified.
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    if e.is_timeout() {
        format!("Snappr API request timed out: {msg}")
    } else if e.is_connect() {
        format!("Failed to connect to Snappr API: {msg}")
    } else {
        msg
    }
}
