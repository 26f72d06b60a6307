//! Decoded frame model and header value types.

use bytes::Bytes;

/// Prelude size: total length (4) + headers length (4) + prelude CRC (4).
pub const PRELUDE_LEN: usize = 12;
/// Size of the trailing message CRC.
pub const TRAILER_LEN: usize = 4;
/// Smallest legal frame: prelude + empty headers + empty payload + trailer.
pub const MIN_FRAME_LEN: u32 = (PRELUDE_LEN + TRAILER_LEN) as u32;
/// Default upper bound on the declared frame length (16 MiB). Guards
/// against runaway allocation from a malformed length field.
pub const MAX_FRAME_LEN_DEFAULT: u32 = 16 * 1024 * 1024;

/// Header value wire type codes.
pub(crate) mod wire {
    pub const BOOL_TRUE: u8 = 0;
    pub const BOOL_FALSE: u8 = 1;
    pub const INT32: u8 = 4;
    pub const INT64: u8 = 5;
    pub const BYTES: u8 = 6;
    pub const STRING: u8 = 7;
}

/// A typed header value as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Bytes(Bytes),
    String(String),
}

impl HeaderValue {
    /// Returns the string content if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean content if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer content, widening 32-bit values.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }
}

/// One decoded unit of the upstream binary protocol.
///
/// Immutable once produced; consumed and discarded by the stream pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    headers: Vec<(String, HeaderValue)>,
    payload: Bytes,
}

impl Frame {
    /// Assembles a frame from its parts, preserving header wire order.
    #[must_use]
    pub fn new(headers: Vec<(String, HeaderValue)>, payload: Bytes) -> Self {
        Self { headers, payload }
    }

    /// Looks up a header by name; when a name repeats on the wire the last
    /// occurrence wins.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// All header entries in wire order, duplicates included.
    #[must_use]
    pub fn headers(&self) -> &[(String, HeaderValue)] {
        &self.headers
    }

    /// The frame payload.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consumes the frame, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}
