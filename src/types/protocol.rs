//! Network protocol used to reach a pool

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Transport scheme of a pool's FastCGI listener
///
/// Mirrors the `listen` directive of a PHP-FPM pool: either a TCP
/// `host:port` or a Unix domain socket path. `tcp4` and `tcp6` are accepted
/// as spellings of `tcp`; the address itself decides the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    #[serde(alias = "tcp4", alias = "tcp6")]
    Tcp,
    Unix,
}

impl Protocol {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Unix => "unix",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" | "tcp4" | "tcp6" => Ok(Self::Tcp),
            "unix" => Ok(Self::Unix),
            _ => Err(ValidationError::UnknownProtocol(s.to_string())),
        }
    }
}
