//! Incremental frame decoder.
//!
//! The decoder is stateless: it is invoked repeatedly against a growing
//! buffer and reports how many bytes a complete frame consumed so the caller
//! can advance its own cursor. It never reads past the current buffer length
//! and never consumes bytes on [`DecodeOutcome::NeedMoreBytes`] or
//! [`DecodeOutcome::Corrupt`].

use crate::frame::{
    Frame, HeaderValue, MAX_FRAME_LEN_DEFAULT, MIN_FRAME_LEN, PRELUDE_LEN, TRAILER_LEN, wire,
};
use bytes::Bytes;
use streamgate_types::CorruptReason;

/// Result of one [`FrameDecoder::try_decode`] attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Not enough bytes for a complete frame; accumulate more and retry.
    NeedMoreBytes,
    /// A complete, integrity-checked frame; the first `consumed` buffer
    /// bytes belong to it.
    Frame { frame: Frame, consumed: usize },
    /// Hard parse failure at this position. The framing has no
    /// resynchronization point, so the stream must be aborted.
    Corrupt(CorruptReason),
}

/// Decodes frames of the length-prefixed binary event framing.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_frame_len: u32,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(MAX_FRAME_LEN_DEFAULT)
    }
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

impl FrameDecoder {
    /// Creates a decoder that rejects frames longer than `max_frame_len`.
    #[must_use]
    pub fn new(max_frame_len: u32) -> Self {
        Self { max_frame_len }
    }

    /// Attempts to decode one frame from the start of `buf`.
    #[must_use]
    pub fn try_decode(&self, buf: &[u8]) -> DecodeOutcome {
        if buf.len() < 4 {
            return DecodeOutcome::NeedMoreBytes;
        }
        let total_len = read_u32(buf, 0);
        if total_len < MIN_FRAME_LEN {
            return DecodeOutcome::Corrupt(CorruptReason::LengthTooSmall {
                len: total_len,
                min: MIN_FRAME_LEN,
            });
        }
        if total_len > self.max_frame_len {
            return DecodeOutcome::Corrupt(CorruptReason::LengthTooLarge {
                len: total_len,
                max: self.max_frame_len,
            });
        }
        if buf.len() < PRELUDE_LEN {
            return DecodeOutcome::NeedMoreBytes;
        }

        // The prelude CRC covers the two length words; check it as soon as
        // the prelude is complete so garbage fails before the whole frame
        // has to arrive.
        let headers_len = read_u32(buf, 4);
        let stored_prelude_crc = read_u32(buf, 8);
        let computed_prelude_crc = crc32fast::hash(&buf[..8]);
        if stored_prelude_crc != computed_prelude_crc {
            return DecodeOutcome::Corrupt(CorruptReason::PreludeChecksum {
                stored: stored_prelude_crc,
                computed: computed_prelude_crc,
            });
        }
        if u64::from(headers_len) + (PRELUDE_LEN + TRAILER_LEN) as u64 > u64::from(total_len) {
            return DecodeOutcome::Corrupt(CorruptReason::HeadersOverrun {
                headers_len,
                len: total_len,
            });
        }

        let total = total_len as usize;
        if buf.len() < total {
            return DecodeOutcome::NeedMoreBytes;
        }

        let stored_message_crc = read_u32(buf, total - TRAILER_LEN);
        let computed_message_crc = crc32fast::hash(&buf[..total - TRAILER_LEN]);
        if stored_message_crc != computed_message_crc {
            return DecodeOutcome::Corrupt(CorruptReason::MessageChecksum {
                stored: stored_message_crc,
                computed: computed_message_crc,
            });
        }

        let headers_end = PRELUDE_LEN + headers_len as usize;
        let headers = match decode_headers(&buf[PRELUDE_LEN..headers_end]) {
            Ok(headers) => headers,
            Err(reason) => return DecodeOutcome::Corrupt(reason),
        };
        let payload = Bytes::copy_from_slice(&buf[headers_end..total - TRAILER_LEN]);

        DecodeOutcome::Frame {
            frame: Frame::new(headers, payload),
            consumed: total,
        }
    }
}

/// Decodes the headers block into `(name, value)` entries in wire order.
fn decode_headers(block: &[u8]) -> Result<Vec<(String, HeaderValue)>, CorruptReason> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    while pos < block.len() {
        let name_len = block[pos] as usize;
        pos += 1;
        if pos + name_len > block.len() {
            return Err(CorruptReason::HeaderEntryOverrun);
        }
        let name = std::str::from_utf8(&block[pos..pos + name_len])
            .map_err(|_| CorruptReason::HeaderNameUtf8)?
            .to_string();
        pos += name_len;

        if pos >= block.len() {
            return Err(CorruptReason::HeaderEntryOverrun);
        }
        let value_type = block[pos];
        pos += 1;

        let value = match value_type {
            wire::BOOL_TRUE => HeaderValue::Bool(true),
            wire::BOOL_FALSE => HeaderValue::Bool(false),
            wire::INT32 => {
                if pos + 4 > block.len() {
                    return Err(CorruptReason::HeaderEntryOverrun);
                }
                let v = i32::from_be_bytes([
                    block[pos],
                    block[pos + 1],
                    block[pos + 2],
                    block[pos + 3],
                ]);
                pos += 4;
                HeaderValue::Int32(v)
            }
            wire::INT64 => {
                if pos + 8 > block.len() {
                    return Err(CorruptReason::HeaderEntryOverrun);
                }
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&block[pos..pos + 8]);
                pos += 8;
                HeaderValue::Int64(i64::from_be_bytes(raw))
            }
            wire::BYTES | wire::STRING => {
                if pos + 2 > block.len() {
                    return Err(CorruptReason::HeaderEntryOverrun);
                }
                let value_len = u16::from_be_bytes([block[pos], block[pos + 1]]) as usize;
                pos += 2;
                if pos + value_len > block.len() {
                    return Err(CorruptReason::HeaderEntryOverrun);
                }
                let raw = &block[pos..pos + value_len];
                pos += value_len;
                if value_type == wire::STRING {
                    let s = std::str::from_utf8(raw)
                        .map_err(|_| CorruptReason::HeaderValueUtf8)?
                        .to_string();
                    HeaderValue::String(s)
                } else {
                    HeaderValue::Bytes(Bytes::copy_from_slice(raw))
                }
            }
            other => return Err(CorruptReason::UnknownValueType(other)),
        };
        entries.push((name, value));
    }
    Ok(entries)
}
