//! PHP-FPM pool status document
//!
//! Decodes the body PHP-FPM returns for `<pm.status_path>?json`:
//!
//! ```text
//! {"pool":"www","process manager":"dynamic","start time":1000,"start since":50,
//!  "accepted conn":120,"listen queue":0,"max listen queue":5,"listen queue len":128,
//!  "idle processes":3,"active processes":2,"total processes":5,
//!  "max active processes":4,"max children reached":0,"slow requests":1}
//! ```
//!
//! Unknown fields (such as the `processes` array of `?json&full`) are ignored
//! and missing fields default to zero. Decoding is all-or-nothing: a document
//! that fails to parse never yields a partially filled record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status body could not be parsed as a pool status document
#[derive(Debug, Error)]
#[error("malformed pool status: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// One snapshot of a pool's status page
///
/// Produced fresh on every scrape and dropped once its numbers are copied
/// into the gauges. `pool` and `process_manager` are informational only and
/// are not published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolStatus {
    pub pool: String,
    #[serde(rename = "process manager")]
    pub process_manager: String,
    #[serde(rename = "start time")]
    pub start_time: i64,
    #[serde(rename = "start since")]
    pub start_since: i64,
    #[serde(rename = "accepted conn")]
    pub accepted_conn: i64,
    #[serde(rename = "listen queue")]
    pub listen_queue: i64,
    #[serde(rename = "max listen queue")]
    pub max_listen_queue: i64,
    #[serde(rename = "listen queue len")]
    pub listen_queue_len: i64,
    #[serde(rename = "idle processes")]
    pub idle_processes: i64,
    #[serde(rename = "active processes")]
    pub active_processes: i64,
    #[serde(rename = "total processes")]
    pub total_processes: i64,
    #[serde(rename = "max active processes")]
    pub max_active_processes: i64,
    #[serde(rename = "max children reached")]
    pub max_children_reached: i64,
    #[serde(rename = "slow requests")]
    pub slow_requests: i64,
}

/// Decode a raw status body
///
/// Empty input is malformed. The caller decides what to publish on error;
/// [`PoolStatus::default`] is the zero-valued record.
pub fn decode(raw: &[u8]) -> Result<PoolStatus, DecodeError> {
    Ok(serde_json::from_slice(raw)?)
}

/// Decode a raw status body, substituting the zero record on failure
#[must_use]
pub fn decode_or_zero(raw: &[u8]) -> (PoolStatus, Option<DecodeError>) {
    match decode(raw) {
        Ok(status) => (status, None),
        Err(e) => (PoolStatus::default(), Some(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = r#"{"pool":"www","process manager":"dynamic","start time":1000,"start since":50,"accepted conn":120,"listen queue":0,"max listen queue":5,"listen queue len":128,"idle processes":3,"active processes":2,"total processes":5,"max active processes":4,"max children reached":0,"slow requests":1}"#;

    #[test]
    fn test_decode_reference_document() {
        let status = decode(REFERENCE.as_bytes()).unwrap();
        assert_eq!(status.pool, "www");
        assert_eq!(status.process_manager, "dynamic");
        assert_eq!(status.start_time, 1000);
        assert_eq!(status.start_since, 50);
        assert_eq!(status.accepted_conn, 120);
        assert_eq!(status.listen_queue, 0);
        assert_eq!(status.max_listen_queue, 5);
        assert_eq!(status.listen_queue_len, 128);
        assert_eq!(status.idle_processes, 3);
        assert_eq!(status.active_processes, 2);
        assert_eq!(status.total_processes, 5);
        assert_eq!(status.max_active_processes, 4);
        assert_eq!(status.max_children_reached, 0);
        assert_eq!(status.slow_requests, 1);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = br#"{"pool":"www","accepted conn":7,"processes":[{"pid":42,"state":"Idle"}]}"#;
        let status = decode(raw).unwrap();
        assert_eq!(status.accepted_conn, 7);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let status = decode(br#"{"idle processes": 9}"#).unwrap();
        assert_eq!(status.idle_processes, 9);
        assert_eq!(status.total_processes, 0);
        assert!(status.pool.is_empty());
    }

    #[test]
    fn test_empty_body_is_error() {
        let (status, err) = decode_or_zero(b"");
        assert_eq!(status, PoolStatus::default());
        assert!(err.is_some());
    }

    #[test]
    fn test_html_status_page_is_error() {
        let (status, err) = decode_or_zero(b"<html><body>pool: www</body></html>");
        assert_eq!(status, PoolStatus::default());
        assert!(err.unwrap().to_string().starts_with("malformed pool status"));
    }

    #[test]
    fn test_plain_text_status_page_is_error() {
        let raw = b"pool:                 www\nprocess manager:      dynamic\n";
        assert!(decode(raw).is_err());
    }

    #[test]
    fn test_type_mismatch_yields_zero_record() {
        // Valid JSON, but one field has the wrong type: nothing is kept.
        let raw = br#"{"accepted conn": 120, "idle processes": "three"}"#;
        let (status, err) = decode_or_zero(raw);
        assert!(err.is_some());
        assert_eq!(status.accepted_conn, 0);
    }

    #[test]
    fn test_truncated_document_yields_zero_record() {
        let (status, err) = decode_or_zero(&REFERENCE.as_bytes()[..60]);
        assert!(err.is_some());
        assert_eq!(status, PoolStatus::default());
    }

    #[test]
    fn test_serialize_uses_fpm_field_names() {
        let status = decode(REFERENCE.as_bytes()).unwrap();
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains(r#""accepted conn":120"#));
        assert!(json.contains(r#""process manager":"dynamic""#));
        assert_eq!(decode(json.as_bytes()).unwrap(), status);
    }
}
