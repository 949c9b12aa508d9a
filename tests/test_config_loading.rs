//! Tests for loading the pool list from disk

use anyhow::Result;
use php_fpm_exporter::config::load_config;
use php_fpm_exporter::Protocol;
use std::io::Write;
use std::time::Duration;
use tempfile::{Builder, NamedTempFile};

fn write_config(suffix: &str, content: &str) -> Result<NamedTempFile> {
    let mut file = Builder::new().suffix(suffix).tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Plain JSON array, the historical format
#[test]
fn test_load_json_array() -> Result<()> {
    let file = write_config(
        ".json",
        r#"[
  {"protocol": "tcp", "address": "127.0.0.1:9001", "location": "/status"},
  {"protocol": "unix", "address": "/run/php/api.sock", "location": "/fpm-status"}
]"#,
    )?;

    let config = load_config(file.path())?;
    assert_eq!(config.pools.len(), 2);
    assert_eq!(config.pools[0].protocol, Protocol::Tcp);
    assert_eq!(config.pools[1].protocol, Protocol::Unix);
    assert_eq!(config.pools[1].location.as_str(), "/fpm-status");
    assert!(config.fcgi_timeout.is_none());
    Ok(())
}

#[test]
fn test_load_json_object_with_timeout() -> Result<()> {
    let file = write_config(
        ".json",
        r#"{"fcgi_timeout": 4, "pools": [{"address": "127.0.0.1:9001"}]}"#,
    )?;
    let config = load_config(file.path())?;
    assert_eq!(config.fcgi_timeout, Some(Duration::from_secs(4)));
    assert_eq!(config.pools[0].location.as_str(), "/status");
    Ok(())
}

#[test]
fn test_load_toml() -> Result<()> {
    let file = write_config(
        ".toml",
        r#"
[[pools]]
protocol = "tcp"
address = "10.0.0.5:9000"
"#,
    )?;
    let config = load_config(file.path())?;
    assert_eq!(config.pools.len(), 1);
    assert_eq!(config.pools[0].address.as_str(), "10.0.0.5:9000");
    Ok(())
}

#[test]
fn test_missing_file_is_error() {
    let err = load_config("/nonexistent/prometheus-fpm-exporter.json").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_invalid_json_is_error() -> Result<()> {
    let file = write_config(".json", "[{\"address\": ")?;
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_unknown_protocol_is_error() -> Result<()> {
    let file = write_config(".json", r#"[{"protocol": "udp", "address": "127.0.0.1:9001"}]"#)?;
    assert!(load_config(file.path()).is_err());
    Ok(())
}

#[test]
fn test_empty_pool_list_loads() -> Result<()> {
    let file = write_config(".json", "[]")?;
    let config = load_config(file.path())?;
    assert!(config.pools.is_empty());
    Ok(())
}

#[test]
fn test_duplicate_address_is_error() -> Result<()> {
    let file = write_config(
        ".json",
        r#"[{"address": "127.0.0.1:9001"}, {"address": "127.0.0.1:9001", "location": "/other"}]"#,
    )?;
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("more than once"));
    Ok(())
}
