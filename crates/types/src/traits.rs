//! Async traits shared across all streamgate crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `streamgate-types`, not on each other.

use crate::{CachedToken, CredentialIdentity, OutboundEvent};
use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use std::pin::Pin;

pub use crate::error::Result;

/// A pinned, sendable stream of upstream byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Performs the upstream auth call that exchanges refresh material for a
/// short-lived access token.
///
/// Implementations own the transport and wire shape; the token manager only
/// sees the resulting [`CachedToken`].
#[async_trait]
pub trait RefreshClient: Send + Sync {
    /// Exchange the identity's refresh material for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::Upstream`] for non-success upstream
    /// responses and [`crate::GatewayError::Http`] for transport failures.
    async fn refresh(&self, identity: &CredentialIdentity) -> Result<CachedToken>;
}

/// Ordered, backpressure-aware consumer of outbound events.
///
/// `send` suspends while the consumer is not ready; a producer awaiting it
/// holds at most one undelivered event.
#[async_trait]
pub trait EventSink: Send {
    /// Deliver one event downstream, suspending until the sink accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GatewayError::Cancelled`] if the consumer has gone
    /// away and will never accept the event.
    async fn send(&mut self, event: OutboundEvent) -> Result<()>;
}
