//! adroll: ad-interstitial playback sequencer
//!
//! Library interface for the binary, benchmarks and integration tests.
//! The sequencer core lives in [`sequencer`] and [`ad`]; [`server`] and
//! [`session`] host it over HTTP.

pub mod ad;
pub mod config;
pub mod error;
pub mod http_retry;
pub mod metrics;
pub mod sequencer;
pub mod server;
pub mod session;
