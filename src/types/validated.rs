//! Validated string types for pool identities
//!
//! Pool addresses and status locations are checked once when the pool list is
//! loaded; everything downstream can rely on them being usable.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation errors for pool identity fields
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("pool address cannot be empty or whitespace")]
    EmptyAddress,

    #[error("status location cannot be empty")]
    EmptyLocation,

    #[error("status location must start with '/': {0}")]
    RelativeLocation(String),

    #[error("unknown protocol '{0}' (expected tcp or unix)")]
    UnknownProtocol(String),
}

/// Generates a string newtype whose constructor runs `$check`.
///
/// Each type gets `new()`, `as_str()`, `AsRef<str>`, `Deref`, `Display`,
/// `TryFrom<String>`, and serde impls that validate on deserialize.
macro_rules! validated_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident(String) => $check:path;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        $vis struct $name(String);

        impl $name {
            #[doc = concat!("Create a new ", stringify!($name), " after validation")]
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                $check(&value)?;
                Ok(Self(value))
            }

            #[doc = concat!("Get the ", stringify!($name), " as a string slice")]
            #[must_use]
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fn check_address(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        Err(ValidationError::EmptyAddress)
    } else {
        Ok(())
    }
}

fn check_location(s: &str) -> Result<(), ValidationError> {
    if s.is_empty() {
        Err(ValidationError::EmptyLocation)
    } else if !s.starts_with('/') {
        Err(ValidationError::RelativeLocation(s.to_string()))
    } else {
        Ok(())
    }
}

validated_string! {
    /// Address of a pool's FastCGI listener
    ///
    /// `host:port` for TCP pools, a socket path for Unix pools. The address
    /// doubles as the `pool` label value on every published metric.
    ///
    /// # Examples
    /// ```
    /// use php_fpm_exporter::types::PoolAddress;
    ///
    /// let addr = PoolAddress::new("127.0.0.1:9001").unwrap();
    /// assert_eq!(addr.as_str(), "127.0.0.1:9001");
    ///
    /// assert!(PoolAddress::new("  ").is_err());
    /// ```
    pub struct PoolAddress(String) => check_address;
}

validated_string! {
    /// Path of the pool's status page (`pm.status_path`)
    ///
    /// # Examples
    /// ```
    /// use php_fpm_exporter::types::StatusPath;
    ///
    /// let path = StatusPath::new("/status").unwrap();
    /// assert_eq!(path.as_str(), "/status");
    ///
    /// assert!(StatusPath::new("status").is_err());
    /// ```
    pub struct StatusPath(String) => check_location;
}

impl Default for StatusPath {
    fn default() -> Self {
        Self(crate::constants::status_request::DEFAULT_LOCATION.to_string())
    }
}
