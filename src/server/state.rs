use crate::{
    ad::{AdPoolProvider, FilePoolProvider, HttpPoolProvider, StaticPoolProvider},
    config::{Config, PoolSourceType},
    error::{AdrollError, Result},
    server::rate_limit::RateLimiter,
    session::SessionManager,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Hosted playback sessions
    pub sessions: SessionManager,
    /// Where each new session's ad pool comes from
    pub pool_provider: Arc<dyn AdPoolProvider>,
    /// Per-IP limiter; `None` when RATE_LIMIT_RPM is 0
    pub rate_limiter: Option<RateLimiter>,
    /// Server start time for uptime tracking
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()?;

        let pool_provider: Arc<dyn AdPoolProvider> = match config.pool_source {
            PoolSourceType::Static => Arc::new(StaticPoolProvider::sample()),
            PoolSourceType::File => {
                let path = config.pool_path.as_deref().ok_or_else(|| {
                    AdrollError::ConfigError("AD_POOL_PATH is not set".to_string())
                })?;
                Arc::new(FilePoolProvider::new(path))
            }
            PoolSourceType::Http => {
                let url = config.pool_url.clone().ok_or_else(|| {
                    AdrollError::ConfigError("AD_POOL_URL is not set".to_string())
                })?;
                Arc::new(HttpPoolProvider::new(url, http_client))
            }
        };
        info!("Ad pool: {}", pool_provider.describe());

        let rate_limiter = (config.rate_limit_rpm > 0).then(|| {
            info!("Rate limit: {} requests/minute per IP", config.rate_limit_rpm);
            RateLimiter::new(config.rate_limit_rpm)
        });

        let sessions = SessionManager::new(Duration::from_secs(config.session_ttl_secs));

        Ok(Self {
            config: Arc::new(config),
            sessions,
            pool_provider,
            rate_limiter,
            started_at: Instant::now(),
        })
    }
}
