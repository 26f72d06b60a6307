//! Downstream sink implementations.

use async_trait::async_trait;
use streamgate_types::{EventSink, GatewayError, OutboundEvent, Result};
use tokio::sync::mpsc;

/// Sink backed by a bounded channel. The channel capacity is the
/// backpressure window the consumer grants: once it is full, `send`
/// suspends until the consumer drains an event.
pub struct ChannelSink {
    tx: mpsc::Sender<OutboundEvent>,
}

impl ChannelSink {
    /// Wraps an existing channel sender.
    #[must_use]
    pub fn new(tx: mpsc::Sender<OutboundEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sink and its receiving half with the given capacity.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&mut self, event: OutboundEvent) -> Result<()> {
        // A dropped receiver means the client went away.
        self.tx
            .send(event)
            .await
            .map_err(|_| GatewayError::Cancelled)
    }
}

/// Sink that collects events in memory, for tests and ephemeral use.
#[derive(Debug, Default)]
pub struct CollectSink {
    events: Vec<OutboundEvent>,
}

impl CollectSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in delivery order.
    #[must_use]
    pub fn events(&self) -> &[OutboundEvent] {
        &self.events
    }

    /// Consumes the sink, returning the collected events.
    #[must_use]
    pub fn into_events(self) -> Vec<OutboundEvent> {
        self.events
    }
}

#[async_trait]
impl EventSink for CollectSink {
    async fn send(&mut self, event: OutboundEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}
