//! Frame encoder — the inverse of [`crate::decode`].
//!
//! Used to build test fixtures and simulated upstream streams; the gateway
//! itself only decodes.

use crate::frame::{HeaderValue, PRELUDE_LEN, TRAILER_LEN, wire};
use bytes::{BufMut, Bytes, BytesMut};
use streamgate_types::{GatewayError, Result};

/// Serializes a header list and payload into one checksummed frame.
///
/// # Errors
///
/// Returns [`GatewayError::FrameEncode`] if a header name exceeds 255 bytes,
/// a string or byte value exceeds `u16::MAX` bytes, or the assembled frame
/// would not fit in the u32 length prelude.
pub fn encode_frame(headers: &[(String, HeaderValue)], payload: &[u8]) -> Result<Bytes> {
    let mut block = BytesMut::new();
    for (name, value) in headers {
        if name.len() > usize::from(u8::MAX) {
            return Err(GatewayError::FrameEncode(format!(
                "header name too long: {} bytes",
                name.len()
            )));
        }
        block.put_u8(name.len() as u8);
        block.put_slice(name.as_bytes());
        match value {
            HeaderValue::Bool(true) => block.put_u8(wire::BOOL_TRUE),
            HeaderValue::Bool(false) => block.put_u8(wire::BOOL_FALSE),
            HeaderValue::Int32(v) => {
                block.put_u8(wire::INT32);
                block.put_i32(*v);
            }
            HeaderValue::Int64(v) => {
                block.put_u8(wire::INT64);
                block.put_i64(*v);
            }
            HeaderValue::Bytes(b) => {
                put_sized(&mut block, wire::BYTES, name, b)?;
            }
            HeaderValue::String(s) => {
                put_sized(&mut block, wire::STRING, name, s.as_bytes())?;
            }
        }
    }

    let total = PRELUDE_LEN + block.len() + payload.len() + TRAILER_LEN;
    let Ok(total_u32) = u32::try_from(total) else {
        return Err(GatewayError::FrameEncode(format!(
            "frame of {total} bytes exceeds the u32 length prelude"
        )));
    };

    let mut out = BytesMut::with_capacity(total);
    out.put_u32(total_u32);
    out.put_u32(block.len() as u32);
    let prelude_crc = crc32fast::hash(&out);
    out.put_u32(prelude_crc);
    out.put_slice(&block);
    out.put_slice(payload);
    let message_crc = crc32fast::hash(&out);
    out.put_u32(message_crc);
    Ok(out.freeze())
}

fn put_sized(block: &mut BytesMut, type_code: u8, name: &str, raw: &[u8]) -> Result<()> {
    let Ok(len) = u16::try_from(raw.len()) else {
        return Err(GatewayError::FrameEncode(format!(
            "value of header {name:?} too long: {} bytes",
            raw.len()
        )));
    };
    block.put_u8(type_code);
    block.put_u16(len);
    block.put_slice(raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeOutcome, FrameDecoder};
    use crate::frame::Frame;

    fn roundtrip(headers: Vec<(String, HeaderValue)>, payload: &[u8]) -> Frame {
        let wire = encode_frame(&headers, payload).unwrap();
        match FrameDecoder::default().try_decode(&wire) {
            DecodeOutcome::Frame { frame, consumed } => {
                assert_eq!(consumed, wire.len());
                frame
            }
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_payload_sizes() {
        for size in [0usize, 1, 65536] {
            let payload = vec![0xa5u8; size];
            let frame = roundtrip(
                vec![(":event-type".into(), HeaderValue::String("delta".into()))],
                &payload,
            );
            assert_eq!(frame.payload().len(), size);
            assert_eq!(frame.payload().as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn test_roundtrip_header_counts() {
        for count in [0usize, 1, 16] {
            let headers: Vec<(String, HeaderValue)> = (0..count)
                .map(|i| (format!("h{i}"), HeaderValue::Int32(i as i32)))
                .collect();
            let frame = roundtrip(headers.clone(), b"x");
            assert_eq!(frame.headers(), headers.as_slice());
        }
    }

    #[test]
    fn test_roundtrip_all_value_types() {
        let headers = vec![
            ("yes".into(), HeaderValue::Bool(true)),
            ("no".into(), HeaderValue::Bool(false)),
            ("small".into(), HeaderValue::Int32(-42)),
            ("large".into(), HeaderValue::Int64(i64::MIN)),
            ("raw".into(), HeaderValue::Bytes(Bytes::from_static(b"\x00\xff"))),
            ("text".into(), HeaderValue::String("héllo".into())),
        ];
        let frame = roundtrip(headers.clone(), b"payload");
        assert_eq!(frame.headers(), headers.as_slice());
    }

    #[test]
    fn test_name_too_long_rejected() {
        let headers = vec![("n".repeat(256), HeaderValue::Bool(true))];
        let err = encode_frame(&headers, b"").unwrap_err();
        assert!(matches!(err, GatewayError::FrameEncode(_)));
    }

    #[test]
    fn test_value_too_long_rejected() {
        let headers = vec![(
            "big".to_string(),
            HeaderValue::String("v".repeat(usize::from(u16::MAX) + 1)),
        )];
        let err = encode_frame(&headers, b"").unwrap_err();
        assert!(matches!(err, GatewayError::FrameEncode(_)));
    }
}
