//! Command-line arguments for the exporter binary

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::server::{DEFAULT_CONFIG_PATH, DEFAULT_LISTEN, DEFAULT_METRICS_PATH};

/// Parse an HTTP route path
///
/// `:` and `*` are route capture syntax for the router and are rejected.
fn parse_metrics_path(s: &str) -> Result<String, String> {
    if !s.starts_with('/') {
        return Err(format!("metrics path must start with '/', got '{}'", s));
    }
    if s.contains([':', '*']) {
        return Err(format!(
            "metrics path must be a literal path without ':' or '*', got '{}'",
            s
        ));
    }
    Ok(s.to_string())
}

/// Prometheus exporter for PHP-FPM pool status
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to serve metrics on
    #[arg(short, long, default_value = DEFAULT_LISTEN, env = "FPM_EXPORTER_LISTEN")]
    pub listen: SocketAddr,

    /// Path of the metrics endpoint
    #[arg(
        long,
        default_value = DEFAULT_METRICS_PATH,
        env = "FPM_EXPORTER_METRICS_PATH",
        value_parser = parse_metrics_path
    )]
    pub metrics_path: String,

    /// Pool list file (JSON, or TOML with a .toml extension)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "FPM_EXPORTER_CONFIG")]
    pub config: PathBuf,

    /// FastCGI timeout in seconds (overrides the config file; unbounded if unset).
    /// Bounds TCP connects and all reads and writes; Unix socket connects are
    /// not bounded
    #[arg(long, env = "FPM_EXPORTER_FCGI_TIMEOUT")]
    pub fcgi_timeout: Option<u64>,

    /// Also write logs to this file
    #[arg(long, env = "FPM_EXPORTER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// FastCGI timeout from the command line; 0 means unbounded
    #[must_use]
    pub fn fcgi_timeout(&self) -> Option<Duration> {
        self.fcgi_timeout
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}
