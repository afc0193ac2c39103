//! URL checks for ad media sources and click-through links.
//!
//! Ads come from an external data service, so their URLs are untrusted
//! input. Click-through links must be absolute `http://` / `https://`
//! URLs with a host. Media sources may also be root-relative paths
//! (`/uploads/spot.mp4`), which the player resolves against its own
//! origin. Anything else makes the ad ineligible.

use url::Url;

/// Validate that `raw` is an absolute http(s) URL with a host.
///
/// Returns a human-readable reason on rejection.
pub fn check_http_url(raw: &str) -> Result<(), String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty URL".to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|e| format!("invalid URL '{trimmed}': {e}"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "scheme '{scheme}' not allowed, only http/https permitted"
            ));
        }
    }

    if parsed.host().is_none() {
        return Err(format!("no host in URL '{trimmed}'"));
    }

    Ok(())
}

/// Validate an ad media source: an absolute http(s) URL or a root-relative path.
///
/// Protocol-relative `//host/...` strings go through the absolute URL check
/// and are rejected there.
pub fn check_media_source(raw: &str) -> Result<(), String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') && !trimmed.starts_with("//") {
        if trimmed.contains('\\') || trimmed.chars().any(char::is_control) {
            return Err(format!("invalid path '{trimmed}'"));
        }
        return Ok(());
    }
    check_http_url(trimmed)
}
