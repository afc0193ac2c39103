use crate::ad::{AdPoolProvider, Advertisement, StaticPoolProvider};
use axum::Json;
use tracing::info;

/// Serve the built-in sample pool.
///
/// Point `AD_POOL_URL` at this endpoint to exercise the remote pool
/// source locally:
///   `DEV_MODE=true AD_POOL_URL=http://localhost:3000/demo/ads cargo run`
pub async fn serve_demo_pool() -> Json<Vec<Advertisement>> {
    info!("Serving demo ad pool");
    Json(StaticPoolProvider::sample().fetch_pool().await)
}
