use crate::ad::model::{Advertisement, SkipCategory, SlotType};
use crate::error::{AdrollError, Result};
use crate::http_retry::{RetryConfig, fetch_with_retry};
use crate::metrics;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};

/// Source of the candidate ad pool handed to each new playback session.
///
/// The sequencer never fetches ads itself; a host asks a provider for the
/// pool once per session (and again when the content source changes).
#[async_trait]
pub trait AdPoolProvider: Send + Sync {
    /// Load the full pool, active and inactive entries alike
    async fn load(&self) -> Result<Vec<Advertisement>>;

    /// Short description for logs
    fn describe(&self) -> String;

    /// Load the pool, degrading to an empty pool on failure.
    ///
    /// An empty pool makes the sequencer go straight to content, so a
    /// broken ad service never blocks playback.
    async fn fetch_pool(&self) -> Vec<Advertisement> {
        match self.load().await {
            Ok(pool) => {
                metrics::record_pool_fetch("success");
                pool
            }
            Err(e) => {
                warn!("Ad pool from {} unavailable, using empty pool: {}", self.describe(), e);
                metrics::record_pool_fetch("error");
                Vec::new()
            }
        }
    }
}

/// Parse a JSON array of ads, dropping entries that do not deserialize.
///
/// One bad record (unknown category, missing title) must not take the
/// rest of the pool down with it.
pub fn parse_pool(body: &str) -> Result<Vec<Advertisement>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| AdrollError::PoolUnavailable(format!("pool is not a JSON array: {e}")))?;

    let total = raw.len();
    let pool: Vec<Advertisement> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(ad) => Some(ad),
            Err(e) => {
                warn!("Dropping malformed ad record #{}: {}", i, e);
                None
            }
        })
        .collect();

    if pool.len() < total {
        info!("Ad pool: kept {} of {} records", pool.len(), total);
    }

    Ok(pool)
}

/// Fixed in-memory pool
#[derive(Clone, Debug, Default)]
pub struct StaticPoolProvider {
    pool: Vec<Advertisement>,
}

impl StaticPoolProvider {
    pub fn new(pool: Vec<Advertisement>) -> Self {
        Self { pool }
    }

    /// Built-in sample pool: a 15s skippable pre-roll (skip after 5s) and
    /// a 6s bumper post-roll.
    pub fn sample() -> Self {
        Self::new(sample_pool())
    }
}

#[async_trait]
impl AdPoolProvider for StaticPoolProvider {
    async fn load(&self) -> Result<Vec<Advertisement>> {
        Ok(self.pool.clone())
    }

    fn describe(&self) -> String {
        format!("static pool ({} ads)", self.pool.len())
    }
}

/// Pool read from a JSON file on every fetch, so edits apply to the next session
#[derive(Clone, Debug)]
pub struct FilePoolProvider {
    path: PathBuf,
}

impl FilePoolProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AdPoolProvider for FilePoolProvider {
    async fn load(&self) -> Result<Vec<Advertisement>> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AdrollError::PoolUnavailable(format!("cannot read {}: {e}", self.path.display()))
        })?;
        parse_pool(&body)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Pool fetched from a remote ad data service returning a JSON array
#[derive(Clone, Debug)]
pub struct HttpPoolProvider {
    url: String,
    client: Client,
    retry: RetryConfig,
}

impl HttpPoolProvider {
    pub fn new(url: String, client: Client) -> Self {
        Self {
            url,
            client,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl AdPoolProvider for HttpPoolProvider {
    async fn load(&self) -> Result<Vec<Advertisement>> {
        let response = fetch_with_retry(&self.client, &self.url, &self.retry).await?;
        let body = response.text().await?;
        parse_pool(&body)
    }

    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }
}

fn sample_pool() -> Vec<Advertisement> {
    vec![
        Advertisement {
            id: "sample-preroll".to_string(),
            title: "Sample skippable pre-roll".to_string(),
            slot_type: SlotType::Preroll,
            skip_category: SkipCategory::Skippable,
            media_url: "https://test-videos.co.uk/vids/bigbuckbunny/mp4/h264/360/Big_Buck_Bunny_360_10s_1MB.mp4"
                .to_string(),
            link_url: Some("https://example.com/sponsor".to_string()),
            duration: 15.0,
            skip_after: Some(5.0),
            is_active: true,
        },
        Advertisement {
            id: "sample-bumper".to_string(),
            title: "Sample bumper post-roll".to_string(),
            slot_type: SlotType::Postroll,
            skip_category: SkipCategory::Bumper,
            media_url: "https://test-videos.co.uk/vids/jellyfish/mp4/h264/360/Jellyfish_360_10s_1MB.mp4"
                .to_string(),
            link_url: None,
            duration: 6.0,
            skip_after: None,
            is_active: true,
        },
    ]
}
