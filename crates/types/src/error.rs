//! Unified error type for the streamgate workspace.

use crate::IdentityId;
use thiserror::Error;

/// Enumerates all error kinds that can occur across streamgate crates.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Upstream credential or refresh failure.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Every configured identity failed refresh or is cooling down.
    #[error("all credential identities exhausted")]
    AuthExhausted,

    /// Gave up waiting for a token refresh to finish.
    #[error("timed out waiting for token refresh of identity: {0}")]
    RefreshTimeout(IdentityId),

    /// The byte stream contained a frame that failed integrity checks.
    /// Non-retryable: resynchronization to a frame boundary is undefined.
    #[error("corrupt frame: {0}")]
    FrameCorrupt(CorruptReason),

    /// Upstream closed the connection in the middle of a frame.
    #[error("stream truncated: {residual} bytes of an incomplete frame at end of input")]
    StreamTruncated { residual: usize },

    /// The downstream sink did not accept a write within the configured bound.
    #[error("downstream sink unresponsive beyond the backpressure bound")]
    BackpressureTimeout,

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The upstream stream carried a terminal exception frame.
    #[error("upstream exception: {kind}: {message}")]
    UpstreamException { kind: String, message: String },

    /// The upstream returned a non-success HTTP status.
    #[error("upstream error: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    /// A frame could not be encoded (oversized name or value).
    #[error("frame encoding error: {0}")]
    FrameEncode(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The specific integrity violation found while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptReason {
    /// Declared total length below the fixed prelude + trailer minimum.
    #[error("declared length {len} below the {min}-byte frame minimum")]
    LengthTooSmall { len: u32, min: u32 },

    /// Declared total length above the configured maximum.
    #[error("declared length {len} exceeds the {max}-byte frame maximum")]
    LengthTooLarge { len: u32, max: u32 },

    /// Headers block does not fit between prelude and trailer.
    #[error("headers length {headers_len} does not fit in a frame of length {len}")]
    HeadersOverrun { headers_len: u32, len: u32 },

    /// CRC-32 over the first eight prelude bytes did not match.
    #[error("prelude checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    PreludeChecksum { stored: u32, computed: u32 },

    /// Trailing CRC-32 over the whole message did not match.
    #[error("message checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    MessageChecksum { stored: u32, computed: u32 },

    /// A header entry runs past the end of the headers block.
    #[error("header entry runs past the end of the headers block")]
    HeaderEntryOverrun,

    /// A header name was not valid UTF-8.
    #[error("header name is not valid UTF-8")]
    HeaderNameUtf8,

    /// A string header value was not valid UTF-8.
    #[error("string header value is not valid UTF-8")]
    HeaderValueUtf8,

    /// A header value carried an unrecognized wire type code.
    #[error("unknown header value type {0}")]
    UnknownValueType(u8),
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl GatewayError {
    /// Returns `true` if the error is likely transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            Self::Http(_) => true, // transport errors are retryable
            _ => false,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GatewayError>;
