use crate::{ad::Advertisement, metrics, server::state::AppState};
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::info;

/// List the active ads of the configured pool.
///
/// Always answers 200: an unavailable pool source yields `[]` so players
/// fall through to content instead of breaking.
pub async fn list_active_ads(State(state): State<AppState>) -> Json<Vec<Advertisement>> {
    let start = Instant::now();

    let active: Vec<Advertisement> = state
        .pool_provider
        .fetch_pool()
        .await
        .into_iter()
        .filter(|ad| ad.is_active)
        .collect();

    info!("Serving {} active ad(s)", active.len());
    metrics::record_request("ads", 200);
    metrics::record_duration("ads", start);

    Json(active)
}

/// VAST tag configuration for client-side ad SDKs, `{}` when none is set
pub async fn vast_config(State(state): State<AppState>) -> Response {
    metrics::record_request("ads_config", 200);

    if state.config.vast.is_configured() {
        Json(state.config.vast.clone()).into_response()
    } else {
        Json(serde_json::json!({})).into_response()
    }
}
