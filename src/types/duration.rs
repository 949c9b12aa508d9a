//! Duration serialization helpers for configuration files

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Helper for `Option<Duration>` stored as whole seconds
///
/// The pool list is hand-edited JSON or TOML, so timeouts are plain integers.
pub mod option_duration_secs {
    use super::*;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.filter(|s| *s > 0).map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(default, with = "option_duration_secs")]
        timeout: Option<Duration>,
    }

    #[test]
    fn test_seconds_round_trip() {
        let h: Holder = serde_json::from_str(r#"{"timeout": 5}"#).unwrap();
        assert_eq!(h.timeout, Some(Duration::from_secs(5)));
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"{"timeout":5}"#);
    }

    #[test]
    fn test_missing_and_zero_mean_none() {
        let h: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(h.timeout, None);
        let h: Holder = serde_json::from_str(r#"{"timeout": 0}"#).unwrap();
        assert_eq!(h.timeout, None);
    }
}
