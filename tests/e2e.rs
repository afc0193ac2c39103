//! End-to-end tests for the adroll session host
//!
//! Starts a real Axum server on a random port and drives whole playback
//! sessions over HTTP.
//!
//! The remote pool tests bind the listener first to discover the port, then
//! point `pool_url` at the server's own `/demo/ads` endpoint, so the pool is
//! fetched over a real connection without any external service.

use adroll::config::{Config, PoolSourceType, VastTagConfig};
use adroll::server::build_router;
use serde_json::{Value, json};
use std::net::SocketAddr;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOVIE: &str = "https://cdn.example.com/movie.mp4";

// ── Test server helpers ───────────────────────────────────────────────────────

/// Spin up a test server whose pool is fetched from `pool_url`, or from the
/// server's own demo endpoint when `None`.
async fn start_server(pool_url: Option<String>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();

    let config = Config {
        port: 0,
        base_url: format!("http://{}", addr),
        is_dev: true,
        pool_source: PoolSourceType::Http,
        pool_path: None,
        pool_url: Some(pool_url.unwrap_or_else(|| format!("http://{}/demo/ads", addr))),
        session_ttl_secs: 300,
        rate_limit_rpm: 0,
        vast: VastTagConfig::default(),
    };

    let app = build_router(config).await.unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

async fn open_session(client: &reqwest::Client, addr: SocketAddr) -> Value {
    let resp = client
        .post(format!("http://{}/sessions", addr))
        .json(&json!({ "contentSource": MOVIE }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    resp.json().await.unwrap()
}

async fn post_event(client: &reqwest::Client, addr: SocketAddr, id: &str, event: Value) -> Value {
    let resp = client
        .post(format!("http://{}/sessions/{}/events", addr, id))
        .json(&event)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check() {
    let addr = start_server(None).await;

    let resp = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["x-adroll-version"].to_str().unwrap(),
        env!("CARGO_PKG_VERSION")
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn remote_pool_feeds_preroll() {
    let addr = start_server(None).await;
    let client = reqwest::Client::new();

    let view = open_session(&client, addr).await;
    assert_eq!(view["render"]["mode"], "preroll");
    assert_eq!(view["render"]["ad"]["id"], "sample-preroll");

    let ads: Value = client
        .get(format!("http://{}/api/ads", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ads.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn natural_playback_runs_to_end() {
    let addr = start_server(None).await;
    let client = reqwest::Client::new();

    let view = open_session(&client, addr).await;
    let id = view["sessionId"].as_str().unwrap();
    let mut surface = view["render"]["surface"].clone();

    // Ticks through the whole pre-roll without skipping
    for elapsed in [1.0, 4.0, 5.0, 14.9] {
        let reply = post_event(
            &client,
            addr,
            id,
            json!({ "type": "ad_progress", "surface": surface, "elapsed": elapsed }),
        )
        .await;
        assert_eq!(reply["outcome"]["kind"], "updated");
    }

    let expected = [
        ("ad_ended", "advanced", "content"),
        ("content_ended", "advanced", "postroll"),
        ("ad_ended", "ended", "content"),
    ];
    for (kind, outcome, mode) in expected {
        let reply = post_event(
            &client,
            addr,
            id,
            json!({ "type": kind, "surface": surface }),
        )
        .await;
        assert_eq!(reply["outcome"]["kind"], outcome, "after {kind}");
        assert_eq!(reply["session"]["render"]["mode"], mode, "after {kind}");
        surface = reply["session"]["render"]["surface"].clone();
    }

    let view: Value = client
        .get(format!("http://{}/sessions/{}", addr, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["render"]["ended"], true);
    assert_eq!(view["render"]["activeSource"], MOVIE);
}

#[tokio::test]
async fn unavailable_pool_goes_straight_to_content() {
    let pool = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&pool)
        .await;

    let addr = start_server(Some(format!("{}/ads", pool.uri()))).await;
    let client = reqwest::Client::new();

    let view = open_session(&client, addr).await;
    assert_eq!(view["render"]["mode"], "content");
    assert_eq!(view["render"]["activeSource"], MOVIE);

    let id = view["sessionId"].as_str().unwrap();
    let surface = view["render"]["surface"].clone();
    let reply = post_event(
        &client,
        addr,
        id,
        json!({ "type": "content_ended", "surface": surface }),
    )
    .await;
    assert_eq!(reply["outcome"]["kind"], "ended");
}

#[tokio::test]
async fn pool_with_malformed_records_keeps_the_rest() {
    let pool = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "title": "Broken", "type": "preroll", "category": "mystery",
              "videoUrl": "https://cdn.example.com/x.mp4", "duration": 10, "isActive": true },
            { "id": 8, "title": "Pre", "type": "preroll", "category": "non_skippable",
              "videoUrl": "https://cdn.example.com/pre.mp4", "linkUrl": null,
              "duration": 10, "skipAfter": null, "isActive": true }
        ])))
        .mount(&pool)
        .await;

    let addr = start_server(Some(format!("{}/ads", pool.uri()))).await;
    let client = reqwest::Client::new();

    let view = open_session(&client, addr).await;
    assert_eq!(view["render"]["mode"], "preroll");
    assert_eq!(view["render"]["ad"]["id"], "8");
    assert_eq!(view["render"]["skipUi"]["state"], "hidden");
    assert_eq!(view["render"]["clickThrough"], Value::Null);
}
