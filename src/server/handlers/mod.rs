pub mod ads;
pub mod demo;
pub mod health;
pub mod metrics;
pub mod sessions;
