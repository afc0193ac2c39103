use serde::Serialize;
use std::env;

/// Where the ad pool for new sessions comes from
#[derive(Clone, Debug, PartialEq)]
pub enum PoolSourceType {
    /// Built-in sample pool (default for dev)
    Static,
    /// JSON file on disk (`AD_POOL_PATH`)
    File,
    /// Remote ad data service returning JSON (`AD_POOL_URL`)
    Http,
}

/// VAST ad tag URLs handed to client-side ad SDKs.
///
/// Served as-is by `/api/ads/config`; adroll never fetches or parses them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VastTagConfig {
    pub preroll_vast_url: Option<String>,
    pub midroll_vast_url: Option<String>,
    pub postroll_vast_url: Option<String>,
    pub bumper_vast_url: Option<String>,
    pub is_active: bool,
}

impl VastTagConfig {
    /// True when at least one tag URL is configured
    pub fn is_configured(&self) -> bool {
        self.preroll_vast_url.is_some()
            || self.midroll_vast_url.is_some()
            || self.postroll_vast_url.is_some()
            || self.bumper_vast_url.is_some()
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub is_dev: bool,
    /// Ad pool source selection
    pub pool_source: PoolSourceType,
    /// Pool file path (used when pool_source = File)
    pub pool_path: Option<String>,
    /// Pool service URL (used when pool_source = Http)
    pub pool_url: Option<String>,
    /// Idle session TTL in seconds (default: 300)
    pub session_ttl_secs: u64,
    /// Per-IP requests per minute; 0 disables rate limiting
    pub rate_limit_rpm: u32,
    /// VAST tag pass-through configuration
    pub vast: VastTagConfig,
}

impl Config {
    /// Load configuration from environment variables
    /// In DEV mode, provides sensible defaults. In PROD mode, PORT and BASE_URL are required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        // Base URL: required in prod, defaults to localhost in dev
        let base_url = if is_dev {
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"))
        } else {
            env::var("BASE_URL").map_err(|_| "BASE_URL is required in production")?
        };

        let pool_path = env::var("AD_POOL_PATH").ok();
        let pool_url = env::var("AD_POOL_URL").ok();

        // Pool source: explicit AD_POOL_SOURCE, otherwise inferred from which location is set
        let pool_source = match env::var("AD_POOL_SOURCE")
            .unwrap_or_else(|_| "auto".to_string())
            .to_lowercase()
            .as_str()
        {
            "static" => PoolSourceType::Static,
            "file" => PoolSourceType::File,
            "http" => PoolSourceType::Http,
            _ => {
                if pool_url.is_some() {
                    PoolSourceType::Http
                } else if pool_path.is_some() {
                    PoolSourceType::File
                } else {
                    PoolSourceType::Static
                }
            }
        };

        if pool_source == PoolSourceType::File && pool_path.is_none() {
            return Err("AD_POOL_PATH is required when AD_POOL_SOURCE=file".into());
        }
        if pool_source == PoolSourceType::Http && pool_url.is_none() {
            return Err("AD_POOL_URL is required when AD_POOL_SOURCE=http".into());
        }

        let session_ttl_secs: u64 = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let rate_limit_rpm: u32 = env::var("RATE_LIMIT_RPM")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .unwrap_or(0);

        let vast = VastTagConfig {
            preroll_vast_url: env::var("PREROLL_VAST_URL").ok(),
            midroll_vast_url: env::var("MIDROLL_VAST_URL").ok(),
            postroll_vast_url: env::var("POSTROLL_VAST_URL").ok(),
            bumper_vast_url: env::var("BUMPER_VAST_URL").ok(),
            is_active: env::var("VAST_ACTIVE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        };

        Ok(Config {
            port,
            base_url,
            is_dev,
            pool_source,
            pool_path,
            pool_url,
            session_ttl_secs,
            rate_limit_rpm,
            vast,
        })
    }
}
