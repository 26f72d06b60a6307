//! Frame → outbound event translation.
//!
//! Only a kind-mapping table lives here. The back protocol names its event
//! kind in the `:event-type` header; mapped kinds get the configured
//! front-protocol tag, unmapped ones pass through as opaque events so
//! nothing is dropped silently. Frames flagged as exceptions become
//! terminal upstream failures instead of events.

use std::collections::HashMap;
use streamgate_codec::{Frame, HeaderValue};
use streamgate_types::{EventKind, GatewayError, OutboundEvent, Result};

/// Header carrying the back-protocol event kind.
pub const EVENT_TYPE_HEADER: &str = ":event-type";
/// Header distinguishing ordinary events from terminal exceptions.
/// Absent means `"event"`.
pub const MESSAGE_TYPE_HEADER: &str = ":message-type";
/// Header naming the exception kind on exception frames.
pub const EXCEPTION_TYPE_HEADER: &str = ":exception-type";

/// Maps back-protocol event kinds to front-protocol kind tags.
pub struct EventTranslator {
    table: HashMap<String, String>,
}

impl EventTranslator {
    /// Creates a translator from a kind-mapping table.
    #[must_use]
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Translates one decoded frame into an outbound event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UpstreamException`] when the frame's
    /// `:message-type` marks it as an exception; the stream must end there.
    pub fn translate(&self, frame: &Frame) -> Result<OutboundEvent> {
        let message_type = frame
            .header(MESSAGE_TYPE_HEADER)
            .and_then(HeaderValue::as_str)
            .unwrap_or("event");
        if message_type == "exception" || message_type == "error" {
            let kind = frame
                .header(EXCEPTION_TYPE_HEADER)
                .and_then(HeaderValue::as_str)
                .unwrap_or("unknown")
                .to_string();
            let message = String::from_utf8_lossy(frame.payload()).into_owned();
            return Err(GatewayError::UpstreamException { kind, message });
        }

        let kind = match frame
            .header(EVENT_TYPE_HEADER)
            .and_then(HeaderValue::as_str)
        {
            Some(source_kind) => match self.table.get(source_kind) {
                Some(tag) => EventKind::Known(tag.clone()),
                None => EventKind::Opaque(source_kind.to_string()),
            },
            // No kind header at all: still surfaced, as an unnamed opaque
            // event, so the frame stays observable downstream.
            None => EventKind::Opaque(String::new()),
        };
        Ok(OutboundEvent::new(kind, frame.payload().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn translator() -> EventTranslator {
        let mut table = HashMap::new();
        table.insert("delta".to_string(), "message_delta".to_string());
        table.insert("end".to_string(), "message_stop".to_string());
        EventTranslator::new(table)
    }

    fn event_frame(kind: &str, payload: &[u8]) -> Frame {
        Frame::new(
            vec![(
                EVENT_TYPE_HEADER.into(),
                HeaderValue::String(kind.into()),
            )],
            Bytes::copy_from_slice(payload),
        )
    }

    #[test]
    fn test_mapped_kind() {
        let event = translator().translate(&event_frame("delta", b"ab")).unwrap();
        assert_eq!(event.kind, EventKind::Known("message_delta".into()));
        assert_eq!(event.payload.as_ref(), b"ab");
    }

    #[test]
    fn test_unmapped_kind_passes_through_opaque() {
        let event = translator()
            .translate(&event_frame("mystery", b"payload"))
            .unwrap();
        assert_eq!(event.kind, EventKind::Opaque("mystery".into()));
        assert_eq!(event.payload.as_ref(), b"payload");
    }

    #[test]
    fn test_missing_event_type_is_opaque() {
        let frame = Frame::new(Vec::new(), Bytes::from_static(b"x"));
        let event = translator().translate(&frame).unwrap();
        assert!(event.kind.is_opaque());
    }

    #[test]
    fn test_exception_frame_is_terminal() {
        let frame = Frame::new(
            vec![
                (
                    MESSAGE_TYPE_HEADER.into(),
                    HeaderValue::String("exception".into()),
                ),
                (
                    EXCEPTION_TYPE_HEADER.into(),
                    HeaderValue::String("throttled".into()),
                ),
            ],
            Bytes::from_static(b"slow down"),
        );
        let err = translator().translate(&frame).unwrap_err();
        match err {
            GatewayError::UpstreamException { kind, message } => {
                assert_eq!(kind, "throttled");
                assert_eq!(message, "slow down");
            }
            other => panic!("expected exception, got {other}"),
        }
    }

    #[test]
    fn test_explicit_event_message_type_is_not_terminal() {
        let frame = Frame::new(
            vec![
                (
                    MESSAGE_TYPE_HEADER.into(),
                    HeaderValue::String("event".into()),
                ),
                (
                    EVENT_TYPE_HEADER.into(),
                    HeaderValue::String("delta".into()),
                ),
            ],
            Bytes::from_static(b"ok"),
        );
        assert!(translator().translate(&frame).is_ok());
    }
}
