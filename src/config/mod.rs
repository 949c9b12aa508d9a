//! Configuration module
//!
//! This module handles loading and validating the pool list consumed at
//! startup. Any failure here is fatal; the exporter never starts serving
//! with a half-read pool list.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{ConfigFormat, load_config, load_pools_from_env, parse_config};
pub use types::{Config, PoolConfig};
