//! FastCGI record framing
//!
//! Every FastCGI message is a record: an 8-byte header followed by up to
//! 65535 bytes of content and 0-7 bytes of padding. Streams (`PARAMS`,
//! `STDIN`, `STDOUT`) are sequences of records terminated by an empty one.

use std::fmt;
use std::io::{self, Read, Write};

/// Protocol version carried in every header
pub const VERSION_1: u8 = 1;

/// Size of a record header
pub const HEADER_LEN: usize = 8;

/// Largest content a single record can carry
pub const MAX_CONTENT_LEN: usize = u16::MAX as usize;

/// Record types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    BeginRequest = 1,
    AbortRequest = 2,
    EndRequest = 3,
    Params = 4,
    Stdin = 5,
    Stdout = 6,
    Stderr = 7,
    Data = 8,
    GetValues = 9,
    GetValuesResult = 10,
    UnknownType = 11,
}

impl RecordType {
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            1 => Self::BeginRequest,
            2 => Self::AbortRequest,
            3 => Self::EndRequest,
            4 => Self::Params,
            5 => Self::Stdin,
            6 => Self::Stdout,
            7 => Self::Stderr,
            8 => Self::Data,
            9 => Self::GetValues,
            10 => Self::GetValuesResult,
            11 => Self::UnknownType,
            _ => return None,
        })
    }
}

/// Application role requested in `BEGIN_REQUEST`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Role {
    Responder = 1,
    Authorizer = 2,
    Filter = 3,
}

/// `protocolStatus` of an `END_REQUEST` record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProtocolStatus {
    RequestComplete = 0,
    CantMpxConn = 1,
    Overloaded = 2,
    UnknownRole = 3,
}

impl ProtocolStatus {
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::RequestComplete,
            1 => Self::CantMpxConn,
            2 => Self::Overloaded,
            3 => Self::UnknownRole,
            _ => return None,
        })
    }
}

impl fmt::Display for ProtocolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RequestComplete => "request complete",
            Self::CantMpxConn => "cannot multiplex connection",
            Self::Overloaded => "overloaded",
            Self::UnknownRole => "unknown role",
        })
    }
}

/// Record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub record_type: u8,
    pub request_id: u16,
    pub content_length: u16,
    pub padding_length: u8,
}

impl Header {
    /// Header for `content_length` bytes, padded to an 8-byte boundary
    #[must_use]
    pub fn new(record_type: RecordType, request_id: u16, content_length: u16) -> Self {
        Self {
            version: VERSION_1,
            record_type: record_type as u8,
            request_id,
            content_length,
            padding_length: padding_for(content_length as usize),
        }
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            version: buf[0],
            record_type: buf[1],
            request_id: u16::from_be_bytes([buf[2], buf[3]]),
            content_length: u16::from_be_bytes([buf[4], buf[5]]),
            padding_length: buf[6],
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [id_hi, id_lo] = self.request_id.to_be_bytes();
        let [len_hi, len_lo] = self.content_length.to_be_bytes();
        [
            self.version,
            self.record_type,
            id_hi,
            id_lo,
            len_hi,
            len_lo,
            self.padding_length,
            0,
        ]
    }
}

#[inline]
const fn padding_for(len: usize) -> u8 {
    ((8 - len % 8) % 8) as u8
}

/// A complete record with padding stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: Header,
    pub content: Vec<u8>,
}

impl Record {
    /// Read one record
    ///
    /// A header with a version other than 1 is reported as `InvalidData`.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf)?;
        let header = Header::from_bytes(&buf);

        if header.version != VERSION_1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported FastCGI version {}", header.version),
            ));
        }

        let mut content = vec![0u8; header.content_length as usize];
        reader.read_exact(&mut content)?;

        let mut padding = [0u8; 8];
        reader.read_exact(&mut padding[..header.padding_length as usize])?;

        Ok(Self { header, content })
    }

    #[must_use]
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u8(self.header.record_type)
    }
}

/// Write a single record; `content` must fit in one record
pub fn write_record<W: Write>(
    writer: &mut W,
    record_type: RecordType,
    request_id: u16,
    content: &[u8],
) -> io::Result<()> {
    let len = u16::try_from(content.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("record content of {} bytes exceeds {}", content.len(), MAX_CONTENT_LEN),
        )
    })?;
    let header = Header::new(record_type, request_id, len);

    writer.write_all(&header.to_bytes())?;
    writer.write_all(content)?;
    writer.write_all(&[0u8; 8][..header.padding_length as usize])
}

/// Write `data` as a stream: as many full records as needed, then the
/// empty terminating record
pub fn write_stream<W: Write>(
    writer: &mut W,
    record_type: RecordType,
    request_id: u16,
    data: &[u8],
) -> io::Result<()> {
    for chunk in data.chunks(MAX_CONTENT_LEN) {
        write_record(writer, record_type, request_id, chunk)?;
    }
    write_record(writer, record_type, request_id, &[])
}

/// Content of a `BEGIN_REQUEST` record
#[must_use]
pub fn begin_request_body(role: Role, keep_conn: bool) -> [u8; 8] {
    let [role_hi, role_lo] = (role as u16).to_be_bytes();
    [role_hi, role_lo, u8::from(keep_conn), 0, 0, 0, 0, 0]
}

/// Content of an `END_REQUEST` record
#[must_use]
pub fn end_request_body(app_status: u32, status: ProtocolStatus) -> [u8; 8] {
    let [a, b, c, d] = app_status.to_be_bytes();
    [a, b, c, d, status as u8, 0, 0, 0]
}

/// Parse an `END_REQUEST` body into `(appStatus, protocolStatus)`
///
/// Returns `None` if the body is shorter than the fixed 8 bytes. The raw
/// protocol status byte is kept so unknown values can be reported.
#[must_use]
pub fn parse_end_request(content: &[u8]) -> Option<(u32, u8)> {
    let body: &[u8; 8] = content.get(..8)?.try_into().ok()?;
    let app_status = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    Some((app_status, body[4]))
}

/// Encode name-value pairs for a `PARAMS` stream
///
/// Lengths below 128 take one byte; longer ones take four with the high bit
/// set.
#[must_use]
pub fn encode_params<K, V>(pairs: &[(K, V)]) -> Vec<u8>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut buf = Vec::with_capacity(
        pairs
            .iter()
            .map(|(k, v)| k.as_ref().len() + v.as_ref().len() + 8)
            .sum(),
    );
    for (name, value) in pairs {
        let (name, value) = (name.as_ref().as_bytes(), value.as_ref().as_bytes());
        encode_length(&mut buf, name.len());
        encode_length(&mut buf, value.len());
        buf.extend_from_slice(name);
        buf.extend_from_slice(value);
    }
    buf
}

fn encode_length(buf: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        buf.push(len as u8);
    } else {
        let encoded = (len as u32) | 0x8000_0000;
        buf.extend_from_slice(&encoded.to_be_bytes());
    }
}

/// Decode a `PARAMS` stream back into pairs, in order
///
/// Stops at the first truncated pair.
#[must_use]
pub fn parse_params(data: &[u8]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let Some((name_len, tail)) = decode_length(rest) else {
            break;
        };
        let Some((value_len, tail)) = decode_length(tail) else {
            break;
        };
        if tail.len() < name_len + value_len {
            break;
        }
        let (name, tail) = tail.split_at(name_len);
        let (value, tail) = tail.split_at(value_len);
        pairs.push((
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        ));
        rest = tail;
    }

    pairs
}

fn decode_length(data: &[u8]) -> Option<(usize, &[u8])> {
    let first = *data.first()?;
    if first & 0x80 == 0 {
        return Some((first as usize, &data[1..]));
    }
    let bytes: [u8; 4] = data.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(bytes) & 0x7FFF_FFFF;
    Some((len as usize, &data[4..]))
}
