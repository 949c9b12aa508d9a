//! Configuration validation
//!
//! Field-level checks (empty address, relative location) are enforced by the
//! validated types at parse time. This covers the constraints that span the
//! whole pool list.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

use super::types::{Config, PoolConfig};
use crate::types::Protocol;

impl Config {
    /// Validate configuration for correctness
    ///
    /// - Pool addresses are unique (the address is the metric label, so two
    ///   pools sharing one would publish colliding series)
    ///
    /// An empty pool list is accepted with a warning; the exporter then serves
    /// an empty metrics page.
    pub fn validate(&self) -> Result<()> {
        if self.pools.is_empty() {
            tracing::warn!("No pools configured; the metrics endpoint will be empty");
        }

        let mut seen = HashSet::with_capacity(self.pools.len());
        for pool in &self.pools {
            if !seen.insert(pool.address.as_str()) {
                return Err(anyhow::anyhow!(
                    "Pool address '{}' is configured more than once",
                    pool.address
                ));
            }
            validate_pool(pool);
        }

        Ok(())
    }
}

/// Warn about pool entries that are valid but probably not what was meant
fn validate_pool(pool: &PoolConfig) {
    match pool.protocol {
        Protocol::Unix if Path::new(pool.address.as_str()).is_relative() => {
            tracing::warn!(
                "Pool '{}' uses a relative socket path; it resolves against the exporter's \
                 working directory",
                pool.address
            );
        }
        Protocol::Tcp if !pool.address.contains(':') => {
            tracing::warn!(
                "Pool '{}' has no port; TCP addresses are expected as host:port",
                pool.address
            );
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PoolAddress, StatusPath};

    fn pool(address: &str) -> PoolConfig {
        PoolConfig::new(
            Protocol::Tcp,
            PoolAddress::new(address).unwrap(),
            StatusPath::default(),
        )
    }

    #[test]
    fn test_empty_pool_list_accepted() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_single_pool_valid() {
        let config = Config {
            pools: vec![pool("127.0.0.1:9001")],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let config = Config {
            pools: vec![pool("127.0.0.1:9001"), pool("127.0.0.1:9001")],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_same_host_different_ports_valid() {
        let config = Config {
            pools: vec![pool("127.0.0.1:9001"), pool("127.0.0.1:9002")],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_portless_address_only_warns() {
        let config = Config {
            pools: vec![pool("localhost")],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
