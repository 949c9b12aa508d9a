//! Default values for configuration fields
//!
//! This module centralizes all default value functions used in serde deserialization.

use crate::types::{Protocol, StatusPath};

/// Default pool protocol (TCP)
#[inline]
pub fn protocol() -> Protocol {
    Protocol::Tcp
}

/// Default status location (`/status`, PHP-FPM's stock `pm.status_path`)
#[inline]
pub fn location() -> StatusPath {
    StatusPath::default()
}
