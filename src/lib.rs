// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod kv;
pub mod logging;
pub mod metrics;
pub mod observer;
pub mod runtime;
pub mod score_store;
pub mod session;
pub mod time_series;
pub mod word_bank;
pub mod word_sampler;
