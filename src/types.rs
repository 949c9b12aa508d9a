//! Core types for pool identification
//!
//! Validated newtypes for the fields of a pool entry, plus serde helpers used
//! by the configuration layer.

pub mod duration;
pub mod protocol;
pub mod validated;

pub use duration::option_duration_secs;
pub use protocol::Protocol;
pub use validated::{PoolAddress, StatusPath, ValidationError};
