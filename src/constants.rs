//! Constants used throughout the exporter
//!
//! This module centralizes fixed protocol values and defaults so that the
//! collector, transport and CLI agree on them.

/// Published metric naming
pub mod metrics {
    /// Namespace prefix for every published metric (`fpm_*`)
    pub const NAMESPACE: &str = "fpm";

    /// Const label carrying the pool address on every metric
    pub const POOL_LABEL: &str = "pool";

    /// Number of gauges published per pool
    pub const GAUGES_PER_POOL: usize = 12;
}

/// Fixed parameters of the outbound status request
///
/// PHP-FPM answers its status page for any request whose `SCRIPT_NAME`
/// matches `pm.status_path`, so everything except the location is constant.
pub mod status_request {
    pub const REQUEST_METHOD: &str = "GET";

    /// Synthetic client address reported to the pool
    pub const REMOTE_ADDR: &str = "127.0.0.1";

    /// Selects the JSON form of the status page
    pub const QUERY_STRING: &str = "json";

    /// Prefix for `SCRIPT_FILENAME`; never dereferenced on disk
    pub const SCRIPT_ROOT: &str = "/var/www/nonexistent";

    /// Default status location when a pool entry omits one
    pub const DEFAULT_LOCATION: &str = "/status";
}

/// FastCGI client limits
pub mod fastcgi {
    /// Request id used for the single request sent per connection
    pub const REQUEST_ID: u16 = 1;

    /// Upper bound on accumulated STDOUT (1MB)
    /// A JSON status page without `&full` is well under 1KB
    pub const MAX_RESPONSE: usize = 1024 * 1024;

    /// Initial capacity for the STDOUT accumulation buffer
    pub const RESPONSE_INITIAL: usize = 1024;
}

/// HTTP listener and CLI defaults
pub mod server {
    /// Default listen address for the metrics endpoint
    pub const DEFAULT_LISTEN: &str = "0.0.0.0:9030";

    /// Default path of the metrics endpoint
    pub const DEFAULT_METRICS_PATH: &str = "/metrics";

    /// Default pool list location
    pub const DEFAULT_CONFIG_PATH: &str = "/etc/prometheus-fpm-exporter.json";
}
