//! Per-pool scrape cycle
//!
//! A [`PoolCollector`] is a `prometheus` collector for one pool. Every
//! `collect` call fetches the pool's status page, overwrites the twelve
//! gauges and reports them, all under the collector's own lock. Pools never
//! share a lock, so a slow pool does not hold up the others' bookkeeping.

mod metrics;

pub use metrics::PoolMetrics;

use std::sync::Arc;

use parking_lot::Mutex;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use thiserror::Error;

use crate::config::PoolConfig;
use crate::constants::status_request::{QUERY_STRING, REMOTE_ADDR, REQUEST_METHOD};
use crate::fastcgi::{StatusTransport, TransportError};
use crate::status::{self, DecodeError, PoolStatus};

/// Why a scrape did not produce a status record
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("status request to pool {address} failed: {source}")]
    Transport {
        address: String,
        #[source]
        source: TransportError,
    },

    #[error("pool {address} returned an unreadable status page: {source}")]
    Decode {
        address: String,
        #[source]
        source: DecodeError,
    },
}

/// Collector for one PHP-FPM pool
pub struct PoolCollector {
    pool: PoolConfig,
    metrics: PoolMetrics,
    transport: Arc<dyn StatusTransport>,
    scrape_lock: Mutex<()>,
}

impl std::fmt::Debug for PoolCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolCollector")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl PoolCollector {
    /// Create a collector with all gauges at zero
    pub fn new(pool: PoolConfig, transport: Arc<dyn StatusTransport>) -> prometheus::Result<Self> {
        let metrics = PoolMetrics::new(pool.address.as_str())?;
        Ok(Self {
            pool,
            metrics,
            transport,
            scrape_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn pool(&self) -> &PoolConfig {
        &self.pool
    }

    #[must_use]
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Fetch, decode and publish one snapshot
    ///
    /// The gauges are overwritten even on failure: with zeros if the pool was
    /// unreachable or its page unreadable. The error is returned so callers
    /// other than the registry can tell the two apart.
    pub fn scrape(&self) -> Result<PoolStatus, ScrapeError> {
        let _guard = self.scrape_lock.lock();
        self.scrape_and_publish()
    }

    /// Caller must hold `scrape_lock`
    fn scrape_and_publish(&self) -> Result<PoolStatus, ScrapeError> {
        let address = self.pool.address.as_str();
        let params = self.request_params();

        let (raw, transport_err) =
            match self.transport.fetch(self.pool.protocol, address, &params) {
                Ok(raw) => (raw, None),
                Err(e) => {
                    tracing::warn!("Failed to fetch status from pool {}: {}", self.pool, e);
                    (Vec::new(), Some(e))
                }
            };

        let (snapshot, decode_err) = status::decode_or_zero(&raw);
        self.metrics.update(&snapshot);

        if let Some(source) = transport_err {
            return Err(ScrapeError::Transport {
                address: address.to_string(),
                source,
            });
        }
        if let Some(source) = decode_err {
            tracing::warn!("Pool {} returned an unreadable status page: {}", self.pool, source);
            return Err(ScrapeError::Decode {
                address: address.to_string(),
                source,
            });
        }

        tracing::debug!(
            "Scraped pool {}: {} active, {} idle, {} accepted",
            self.pool,
            snapshot.active_processes,
            snapshot.idle_processes,
            snapshot.accepted_conn
        );
        Ok(snapshot)
    }

    /// Parameters of the status request
    fn request_params(&self) -> Vec<(String, String)> {
        vec![
            ("REQUEST_METHOD".to_string(), REQUEST_METHOD.to_string()),
            ("SCRIPT_NAME".to_string(), self.pool.location.to_string()),
            ("REMOTE_ADDR".to_string(), REMOTE_ADDR.to_string()),
            ("QUERY_STRING".to_string(), QUERY_STRING.to_string()),
            ("SCRIPT_FILENAME".to_string(), self.pool.script_filename()),
        ]
    }
}

impl Collector for PoolCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.metrics.descs()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        // Held across the read so a concurrent scrape cannot interleave its
        // update with this one's report
        let _guard = self.scrape_lock.lock();
        // Failures are already logged and the gauges zeroed
        let _ = self.scrape_and_publish();
        self.metrics.collect()
    }
}
