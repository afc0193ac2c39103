//! Per-IP rate limiting middleware.
//!
//! Fixed-window counter using DashMap. Progress ticks arrive a few times a
//! second per viewer, so limits should be sized for that.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use super::state::AppState;

/// A client's request count in the window that started at `started`
#[derive(Clone, Copy, Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Per-IP fixed-window rate limiter.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` per client.
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_window(requests_per_minute, Duration::from_secs(60))
    }

    fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            limit,
            window,
        }
    }

    /// Count a request from `client`; `false` once the window's budget is spent.
    fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(client.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                count: 0,
                started: now,
            };
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.limit
    }

    /// Forget clients whose window has expired.
    pub fn cleanup(&self) {
        self.windows
            .retain(|_, w| w.started.elapsed() < self.window);
    }
}

/// First hop of X-Forwarded-For, or "unknown" when not behind a proxy.
fn client_key(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Axum middleware: reject requests exceeding the per-IP rate limit.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let client = client_key(&req);
        if !limiter.allow(&client) {
            warn!("Rate limit exceeded for {}", client);
            return (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded\n").into_response();
        }
    }

    next.run(req).await
}
