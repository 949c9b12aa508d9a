//! Blocking socket to a PHP-FPM pool
//!
//! One enum over TCP and Unix domain sockets so the client can drive either
//! through the same `Read`/`Write` calls without boxing.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use super::error::TransportError;
use crate::types::Protocol;

/// Connected socket to a pool's FastCGI listener
#[derive(Debug)]
pub enum FcgiStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl FcgiStream {
    /// Open a connection and apply `timeout` to connect, reads and writes
    ///
    /// With `timeout = None` every step may block indefinitely. Unix socket
    /// connects are never bounded: `UnixStream` has no connect timeout, so
    /// `timeout` applies only to reads and writes there. A local socket
    /// normally accepts or refuses at once; a full listen backlog can still
    /// block the connect.
    pub fn connect(
        protocol: Protocol,
        address: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let stream = match protocol {
            Protocol::Tcp => Self::Tcp(
                connect_tcp(address, timeout)
                    .map_err(|e| TransportError::connect(protocol, address, e))?,
            ),
            #[cfg(unix)]
            Protocol::Unix => Self::Unix(
                UnixStream::connect(address)
                    .map_err(|e| TransportError::connect(protocol, address, e))?,
            ),
            #[cfg(not(unix))]
            Protocol::Unix => {
                return Err(TransportError::connect(
                    protocol,
                    address,
                    io::Error::new(
                        io::ErrorKind::Unsupported,
                        "unix sockets are not available on this platform",
                    ),
                ));
            }
        };

        stream.set_timeouts(timeout)?;
        Ok(stream)
    }

    fn set_timeouts(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Self::Tcp(s) => {
                s.set_read_timeout(timeout)?;
                s.set_write_timeout(timeout)
            }
            #[cfg(unix)]
            Self::Unix(s) => {
                s.set_read_timeout(timeout)?;
                s.set_write_timeout(timeout)
            }
        }
    }
}

/// Connect to `host:port`, trying each resolved address in turn
fn connect_tcp(address: &str, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let Some(timeout) = timeout else {
        return TcpStream::connect(address);
    };

    let mut last_err = None;
    for addr in address.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} did not resolve to any address", address),
        )
    }))
}

impl Read for FcgiStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(s) => s.read(buf),
            #[cfg(unix)]
            Self::Unix(s) => s.read(buf),
        }
    }
}

impl Write for FcgiStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(s) => s.write(buf),
            #[cfg(unix)]
            Self::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(s) => s.flush(),
            #[cfg(unix)]
            Self::Unix(s) => s.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_connect_tcp_refused() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = FcgiStream::connect(Protocol::Tcp, &format!("127.0.0.1:{}", port), None)
            .unwrap_err();
        assert!(err.is_connect_failure());
    }

    #[test]
    fn test_connect_tcp_with_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let stream =
            FcgiStream::connect(Protocol::Tcp, &addr, Some(Duration::from_secs(1))).unwrap();
        match stream {
            FcgiStream::Tcp(s) => {
                assert_eq!(s.read_timeout().unwrap(), Some(Duration::from_secs(1)));
            }
            #[cfg(unix)]
            FcgiStream::Unix(_) => panic!("expected tcp stream"),
        }
    }

    #[test]
    fn test_connect_unresolvable_with_timeout() {
        let err = FcgiStream::connect(
            Protocol::Tcp,
            "not-an-address",
            Some(Duration::from_millis(100)),
        )
        .unwrap_err();
        assert!(err.is_connect_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_connect_unix_applies_io_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fpm.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&path).unwrap();
        let stream = FcgiStream::connect(
            Protocol::Unix,
            path.to_str().unwrap(),
            Some(Duration::from_secs(1)),
        )
        .unwrap();
        match stream {
            FcgiStream::Unix(s) => {
                assert_eq!(s.read_timeout().unwrap(), Some(Duration::from_secs(1)));
                assert_eq!(s.write_timeout().unwrap(), Some(Duration::from_secs(1)));
            }
            FcgiStream::Tcp(_) => panic!("expected unix stream"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_connect_missing_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sock");
        let err = FcgiStream::connect(Protocol::Unix, path.to_str().unwrap(), None).unwrap_err();
        assert!(err.is_connect_failure());
    }
}
