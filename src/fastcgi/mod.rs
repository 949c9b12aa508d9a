//! FastCGI transport to PHP-FPM pools
//!
//! Collectors talk to pools through [`StatusTransport`], so tests can swap
//! the socket client for an in-memory one.

pub mod client;
mod error;
pub mod record;
mod stream;

pub use client::{FastCgiClient, FcgiResponse, split_cgi_body};
pub use error::TransportError;
pub use stream::FcgiStream;

use crate::types::Protocol;

/// Fetches a pool's raw status body
///
/// One call is one complete exchange: open, send, read to `END_REQUEST`,
/// close. Implementations are shared across collectors and must be usable
/// from several threads at once.
pub trait StatusTransport: Send + Sync {
    /// Send a Responder request with `params` and return the response body
    /// with any CGI headers stripped
    fn fetch(
        &self,
        protocol: Protocol,
        address: &str,
        params: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError>;
}
