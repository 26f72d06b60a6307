//! Front-protocol event representation produced by the stream pipeline.

use bytes::Bytes;

/// Front-protocol kind tag of an outbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A back-protocol kind that mapped to a configured front-protocol tag.
    Known(String),
    /// An unmapped back-protocol kind, passed through for diagnostics
    /// instead of being dropped.
    Opaque(String),
}

impl EventKind {
    /// Returns the kind tag regardless of mapping status.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Known(tag) | Self::Opaque(tag) => tag,
        }
    }

    /// Returns `true` if the source kind had no mapping table entry.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }
}

/// The translated front-protocol representation of one decoded frame.
///
/// Transient: written once to the downstream sink and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    /// Front-protocol kind tag.
    pub kind: EventKind,
    /// Payload bytes carried through from the source frame.
    pub payload: Bytes,
}

impl OutboundEvent {
    /// Creates an event from a kind tag and payload.
    pub fn new(kind: EventKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }
}
