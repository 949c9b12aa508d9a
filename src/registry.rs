//! Registry bootstrap
//!
//! Builds the Prometheus registry the HTTP layer gathers from: one
//! [`PoolCollector`] per configured pool, all sharing one transport.

use anyhow::{Context, Result};
use prometheus::Registry;
use std::sync::Arc;

use crate::collector::PoolCollector;
use crate::config::Config;
use crate::fastcgi::StatusTransport;

/// Register a collector for every pool in `config`
///
/// Registration failures (for instance two pools with the same address) are
/// fatal; the exporter should not start with a partial pool set.
pub fn build_registry(config: &Config, transport: Arc<dyn StatusTransport>) -> Result<Registry> {
    let registry = Registry::new();

    for pool in &config.pools {
        let collector = PoolCollector::new(pool.clone(), Arc::clone(&transport))
            .with_context(|| format!("Failed to create collector for pool {}", pool))?;
        registry
            .register(Box::new(collector))
            .with_context(|| format!("Failed to register collector for pool {}", pool))?;
        tracing::info!("Registered pool {}", pool);
    }

    Ok(registry)
}
