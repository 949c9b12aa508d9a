//! PHP-FPM status exporter
//!
//! Polls PHP-FPM pool status pages over FastCGI and republishes the counters
//! as Prometheus gauges. One [`PoolCollector`] is registered per configured
//! pool; every pull of the metrics endpoint triggers a fresh scrape of each
//! pool, serialized per pool.
//!
//! # Layout
//!
//! - [`fastcgi`] - minimal FastCGI client used as the status transport
//! - [`status`] - decoding of the `?json` status document
//! - [`collector`] - per-pool gauges and the scrape cycle
//! - [`registry`] - bootstrap of the Prometheus registry from config
//! - [`server`] - axum listener serving the exposition format
//! - [`config`] - pool list loading and validation

pub mod args;
pub mod collector;
pub mod config;
pub mod constants;
pub mod fastcgi;
pub mod logging;
pub mod registry;
pub mod server;
pub mod status;
pub mod types;

pub use collector::{PoolCollector, PoolMetrics, ScrapeError};
pub use config::{Config, PoolConfig, load_config};
pub use fastcgi::{FastCgiClient, StatusTransport, TransportError};
pub use registry::build_registry;
pub use status::{DecodeError, PoolStatus};
pub use types::{PoolAddress, Protocol, StatusPath};
