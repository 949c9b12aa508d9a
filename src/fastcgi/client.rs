//! Minimal FastCGI client
//!
//! Sends one Responder request per connection and collects the reply:
//!
//! ```text
//! -> BEGIN_REQUEST (role=Responder, keep_conn=0)
//! -> PARAMS ... PARAMS(empty)
//! -> STDIN(empty)
//! <- STDOUT ... STDERR ... END_REQUEST
//! ```

use std::io::{Read, Write};
use std::time::Duration;

use super::StatusTransport;
use super::error::TransportError;
use super::record::{self, ProtocolStatus, Record, RecordType, Role};
use super::stream::FcgiStream;
use crate::constants::fastcgi::{MAX_RESPONSE, REQUEST_ID, RESPONSE_INITIAL};
use crate::types::Protocol;

/// Reply to a single FastCGI request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FcgiResponse {
    /// Concatenated STDOUT: CGI headers, blank line, body
    pub stdout: Vec<u8>,
    /// Concatenated STDERR
    pub stderr: Vec<u8>,
    /// `appStatus` from `END_REQUEST`
    pub app_status: u32,
}

impl FcgiResponse {
    /// STDOUT with the CGI header block removed
    #[must_use]
    pub fn body(&self) -> &[u8] {
        split_cgi_body(&self.stdout)
    }
}

/// Strip a leading CGI header block (`Name: value` lines up to a blank line)
///
/// Output that does not start with a header line is returned unchanged.
#[must_use]
pub fn split_cgi_body(stdout: &[u8]) -> &[u8] {
    let first_line_end = stdout
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(stdout.len());
    if !is_header_line(&stdout[..first_line_end]) {
        return stdout;
    }

    for sep in [&b"\r\n\r\n"[..], &b"\n\n"[..]] {
        if let Some(pos) = stdout.windows(sep.len()).position(|w| w == sep) {
            return &stdout[pos + sep.len()..];
        }
    }
    // Headers without a body
    &[]
}

/// `Name: value` with a token name; rules out a JSON body such as `{"pool":...}`
fn is_header_line(line: &[u8]) -> bool {
    match line.iter().position(|&b| b == b':') {
        Some(colon) if colon > 0 => line[..colon]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'-'),
        _ => false,
    }
}

/// Blocking FastCGI client with an optional per-operation timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct FastCgiClient {
    timeout: Option<Duration>,
}

impl FastCgiClient {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Perform one request and wait for `END_REQUEST`
    pub fn request<K, V>(
        &self,
        protocol: Protocol,
        address: &str,
        params: &[(K, V)],
    ) -> Result<FcgiResponse, TransportError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut stream = FcgiStream::connect(protocol, address, self.timeout)?;
        write_request(&mut stream, params)?;
        read_response(&mut stream)
    }
}

/// Write `BEGIN_REQUEST`, the `PARAMS` stream and an empty `STDIN`
pub fn write_request<W, K, V>(writer: &mut W, params: &[(K, V)]) -> Result<(), TransportError>
where
    W: Write,
    K: AsRef<str>,
    V: AsRef<str>,
{
    // Build the whole request first so it goes out in as few writes as possible
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    record::write_record(
        &mut buf,
        RecordType::BeginRequest,
        REQUEST_ID,
        &record::begin_request_body(Role::Responder, false),
    )?;
    record::write_stream(
        &mut buf,
        RecordType::Params,
        REQUEST_ID,
        &record::encode_params(params),
    )?;
    record::write_stream(&mut buf, RecordType::Stdin, REQUEST_ID, &[])?;

    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Read records until `END_REQUEST` for our request id
///
/// Records for other request ids and management records are skipped.
pub fn read_response<R: Read>(reader: &mut R) -> Result<FcgiResponse, TransportError> {
    let mut response = FcgiResponse {
        stdout: Vec::with_capacity(RESPONSE_INITIAL),
        ..Default::default()
    };

    loop {
        let rec = Record::read_from(reader)?;
        if rec.header.request_id != REQUEST_ID {
            continue;
        }

        match rec.record_type() {
            Some(RecordType::Stdout) => {
                if response.stdout.len() + rec.content.len() > MAX_RESPONSE {
                    return Err(TransportError::ResponseTooLarge {
                        limit: MAX_RESPONSE,
                    });
                }
                response.stdout.extend_from_slice(&rec.content);
            }
            Some(RecordType::Stderr) => {
                if response.stderr.len() < MAX_RESPONSE {
                    response.stderr.extend_from_slice(&rec.content);
                }
            }
            Some(RecordType::EndRequest) => {
                let (app_status, raw_status) = record::parse_end_request(&rec.content)
                    .ok_or_else(|| {
                        TransportError::Protocol(format!(
                            "END_REQUEST body is {} bytes, expected 8",
                            rec.content.len()
                        ))
                    })?;
                return match ProtocolStatus::from_u8(raw_status) {
                    Some(ProtocolStatus::RequestComplete) => {
                        response.app_status = app_status;
                        Ok(response)
                    }
                    Some(status) => Err(TransportError::Rejected(status)),
                    None => Err(TransportError::Protocol(format!(
                        "unknown protocol status {}",
                        raw_status
                    ))),
                };
            }
            _ => {
                tracing::trace!(
                    "Ignoring FastCGI record type {}",
                    rec.header.record_type
                );
            }
        }
    }
}

impl StatusTransport for FastCgiClient {
    fn fetch(
        &self,
        protocol: Protocol,
        address: &str,
        params: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        let mut params = params.to_vec();
        if !params.iter().any(|(k, _)| k == "CONTENT_LENGTH") {
            params.push(("CONTENT_LENGTH".to_string(), "0".to_string()));
        }

        let response = self.request(protocol, address, &params)?;
        if !response.stderr.is_empty() {
            tracing::debug!(
                "Pool {} wrote to stderr: {}",
                address,
                String::from_utf8_lossy(&response.stderr).trim_end()
            );
        }
        Ok(response.body().to_vec())
    }
}
