use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

// ── Metric names ────────────────────────────────────────────────────────

/// Total HTTP requests by endpoint and status
pub const REQUESTS_TOTAL: &str = "adroll_requests_total";
/// Request duration in seconds
pub const REQUEST_DURATION: &str = "adroll_request_duration_seconds";
/// Currently hosted playback sessions
pub const ACTIVE_SESSIONS: &str = "adroll_active_sessions";
/// Playback events by kind and outcome
pub const PLAYBACK_EVENTS: &str = "adroll_playback_events_total";
/// Ads bound to a surface, by slot
pub const AD_IMPRESSIONS: &str = "adroll_ad_impressions_total";
/// Sessions that reached `ended`
pub const SESSIONS_ENDED: &str = "adroll_sessions_ended_total";
/// Ad pool loads by result (success, error)
pub const POOL_FETCHES: &str = "adroll_pool_fetches_total";

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process and return its handle.
///
/// If another recorder is already installed, a detached handle is
/// returned so `/metrics` still answers (with nothing recorded).
pub fn prometheus_handle() -> PrometheusHandle {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Prometheus recorder not installed: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

// ── Recording helpers ───────────────────────────────────────────────────

/// Record an incoming request
pub fn record_request(endpoint: &str, status: u16) {
    counter!(REQUESTS_TOTAL, "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record request duration
pub fn record_duration(endpoint: &str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    histogram!(REQUEST_DURATION, "endpoint" => endpoint.to_string()).record(duration);
}

/// Update active session count
pub fn set_active_sessions(count: usize) {
    gauge!(ACTIVE_SESSIONS).set(count as f64);
}

/// Record a delivered playback event and what it did
pub fn record_playback_event(kind: &'static str, outcome: &'static str) {
    counter!(PLAYBACK_EVENTS, "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record an ad being bound for playback in `slot`
pub fn record_ad_impression(slot: &'static str) {
    counter!(AD_IMPRESSIONS, "slot" => slot).increment(1);
}

/// Record a session reaching its end
pub fn record_session_ended() {
    counter!(SESSIONS_ENDED).increment(1);
}

/// Record an ad pool load
pub fn record_pool_fetch(result: &'static str) {
    counter!(POOL_FETCHES, "result" => result).increment(1);
}
