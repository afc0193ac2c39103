pub mod handlers;
pub mod rate_limit;
pub mod state;

use crate::config::Config;
use crate::error::Result;
use crate::metrics;
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    response::Response,
    routing::{get, post, put},
};
use state::AppState;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often idle sessions and stale rate-limit windows are swept
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

async fn add_version_header(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert("x-adroll-version", HeaderValue::from_static(VERSION));
    response
}

fn routes(state: AppState) -> Router {
    let is_dev = state.config.is_dev;
    let prometheus = metrics::prometheus_handle();

    // CORS: permissive in dev so browser players on other origins can call in
    let cors = if is_dev {
        info!("CORS: Permissive mode (dev)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS: Restrictive mode (prod)");
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/metrics",
            get(move || handlers::metrics::serve_metrics(prometheus.clone())),
        )
        .route("/demo/ads", get(handlers::demo::serve_demo_pool))
        // Ad data for client-side players
        .route("/api/ads", get(handlers::ads::list_active_ads))
        .route("/api/ads/config", get(handlers::ads::vast_config))
        // Hosted playback sessions
        .route("/sessions", post(handlers::sessions::open_session))
        .route(
            "/sessions/{session_id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::close_session),
        )
        .route(
            "/sessions/{session_id}/source",
            put(handlers::sessions::change_source),
        )
        .route(
            "/sessions/{session_id}/events",
            post(handlers::sessions::post_event),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(middleware::map_response(add_version_header))
        .layer(cors)
        .with_state(state)
}

/// Build the router with fresh state; used by `start` and by tests
pub async fn build_router(config: Config) -> Result<Router> {
    let state = AppState::new(config)?;
    Ok(routes(state))
}

/// Periodically evict idle sessions and expired rate-limit windows until cancelled
async fn run_cleanup(state: AppState, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                state.sessions.cleanup_expired();
                if let Some(limiter) = &state.rate_limiter {
                    limiter.cleanup();
                }
            }
        }
    }
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);
    let base_url = config.base_url.clone();

    let state = AppState::new(config)?;
    let shutdown = CancellationToken::new();
    let cleanup = tokio::spawn(run_cleanup(state.clone(), shutdown.clone()));
    let app = routes(state);

    // Bind TCP listener
    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("🚀 Server listening on http://{}", addr);
    info!("📺 Demo pool: {}/demo/ads", base_url);

    let signal = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            signal.cancel();
        })
        .await;

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        error!("Cleanup task failed: {}", e);
    }

    if let Err(e) = served {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
