//! Configuration type definitions

use crate::constants::status_request::SCRIPT_ROOT;
use crate::types::{PoolAddress, Protocol, StatusPath, option_duration_secs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Exporter configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// PHP-FPM pools to scrape, one collector each
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
    /// Bound on each FastCGI exchange (connect, read, write); unbounded if unset
    #[serde(
        default,
        with = "option_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub fcgi_timeout: Option<Duration>,
}

/// Identity of one PHP-FPM pool
///
/// Immutable once loaded. `address` is also the `pool` label on every metric
/// the pool's collector publishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Transport scheme of the pool's listener
    #[serde(default = "super::defaults::protocol")]
    pub protocol: Protocol,
    /// `host:port` or socket path
    pub address: PoolAddress,
    /// Status page path (`pm.status_path`)
    #[serde(default = "super::defaults::location")]
    pub location: StatusPath,
}

impl PoolConfig {
    /// Create a pool entry from already-validated parts
    #[must_use]
    pub fn new(protocol: Protocol, address: PoolAddress, location: StatusPath) -> Self {
        Self {
            protocol,
            address,
            location,
        }
    }

    /// `SCRIPT_FILENAME` sent with the status request
    ///
    /// PHP-FPM requires the parameter but never opens the file for its
    /// status page, so a path under a nonexistent root is enough.
    #[must_use]
    pub fn script_filename(&self) -> String {
        format!("{}{}", SCRIPT_ROOT, self.location)
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.protocol, self.address, self.location)
    }
}
