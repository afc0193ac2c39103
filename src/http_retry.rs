//! GET with a fixed number of attempts and a constant backoff.
//!
//! Used by the remote ad pool source; the data service is polled once per
//! session, so a single quick retry covers most transient failures.

use reqwest::{Client, Response};
use std::time::Duration;
use tracing::warn;

/// Default number of attempts (1 initial + 1 retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default pause between attempts in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 250;

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Retry policy for [`fetch_with_retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts; 0 is treated as 1.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub backoff: Duration,
    /// Timeout for each individual attempt.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// GET `url`, retrying network errors and non-2xx responses.
///
/// # Errors
///
/// Returns the error from the last attempt once all attempts fail.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    config: &RetryConfig,
) -> Result<Response, reqwest::Error> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = client
            .get(url)
            .timeout(config.timeout)
            .send()
            .await
            .and_then(Response::error_for_status);

        match result {
            Ok(response) => return Ok(response),
            Err(e) if attempt >= max_attempts => {
                warn!(
                    "GET {} failed after {} attempt(s): {}",
                    url, max_attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "GET {} failed (attempt {}/{}): {}, retrying in {}ms",
                    url,
                    attempt,
                    max_attempts,
                    e,
                    config.backoff.as_millis()
                );
            }
        }

        tokio::time::sleep(config.backoff).await;
        attempt += 1;
    }
}
