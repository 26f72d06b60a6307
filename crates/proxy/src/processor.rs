//! The per-request streaming pipeline.
//!
//! One processor instance serves one request: it pulls upstream bytes,
//! accumulates them in a private residual buffer, decodes complete frames,
//! translates them, and writes the results downstream in decode order. The
//! only state held between reads is the residual buffer and at most one
//! event awaiting a slow sink.

use crate::translate::EventTranslator;
use bytes::{Buf as _, Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt as _;
use std::time::Duration;
use streamgate_codec::{DecodeOutcome, FrameDecoder};
use streamgate_types::{EventSink, GatewayError, OutboundEvent, Result};
use tokio_util::sync::CancellationToken;

/// Pipeline phase, reported through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Reading,
    Decoding,
    Translating,
    Writing,
    Completed,
    Failed,
    Cancelled,
}

/// Counters for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub frames_decoded: u64,
    pub events_written: u64,
}

/// Drives one upstream byte source through decode → translate → write.
pub struct StreamProcessor {
    decoder: FrameDecoder,
    translator: EventTranslator,
    write_timeout: Option<Duration>,
}

impl StreamProcessor {
    /// Creates a processor from a frame decoder and an event translator.
    #[must_use]
    pub fn new(decoder: FrameDecoder, translator: EventTranslator) -> Self {
        Self {
            decoder,
            translator,
            write_timeout: None,
        }
    }

    /// Bounds how long one write may wait on an unready sink before the
    /// run fails with `BackpressureTimeout`.
    #[must_use]
    pub fn with_write_timeout(mut self, bound: Duration) -> Self {
        self.write_timeout = Some(bound);
        self
    }

    /// Runs the pipeline until the upstream ends, an error occurs, or
    /// `cancel` fires at a suspension point.
    ///
    /// Events are written in the exact order their frames were decoded.
    /// Partially written output is not rolled back on failure.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::FrameCorrupt`] — integrity violation; the stream
    ///   is aborted without resynchronization.
    /// - [`GatewayError::StreamTruncated`] — upstream ended mid-frame.
    /// - [`GatewayError::UpstreamException`] — the upstream sent a terminal
    ///   exception frame.
    /// - [`GatewayError::BackpressureTimeout`] — the sink stayed unready
    ///   past the configured bound.
    /// - [`GatewayError::Cancelled`] — `cancel` fired.
    pub async fn run<S, K>(
        &self,
        mut source: S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<StreamStats>
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
        K: EventSink + ?Sized,
    {
        let mut residual = BytesMut::new();
        let mut stats = StreamStats::default();
        let mut state = ProcessorState::Idle;

        loop {
            set_state(&mut state, ProcessorState::Reading);
            let next = tokio::select! {
                () = cancel.cancelled() => {
                    set_state(&mut state, ProcessorState::Cancelled);
                    return Err(GatewayError::Cancelled);
                }
                next = source.next() => next,
            };
            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(error)) => {
                    set_state(&mut state, ProcessorState::Failed);
                    return Err(error);
                }
                None if residual.is_empty() => {
                    set_state(&mut state, ProcessorState::Completed);
                    tracing::debug!(
                        frames = stats.frames_decoded,
                        events = stats.events_written,
                        "stream completed"
                    );
                    return Ok(stats);
                }
                None => {
                    set_state(&mut state, ProcessorState::Failed);
                    return Err(GatewayError::StreamTruncated {
                        residual: residual.len(),
                    });
                }
            };
            residual.extend_from_slice(&chunk);

            // Drain every complete frame the new bytes produced before
            // reading again.
            loop {
                set_state(&mut state, ProcessorState::Decoding);
                match self.decoder.try_decode(&residual) {
                    DecodeOutcome::NeedMoreBytes => break,
                    DecodeOutcome::Corrupt(reason) => {
                        set_state(&mut state, ProcessorState::Failed);
                        tracing::warn!(%reason, "aborting corrupt stream");
                        return Err(GatewayError::FrameCorrupt(reason));
                    }
                    DecodeOutcome::Frame { frame, consumed } => {
                        residual.advance(consumed);
                        stats.frames_decoded += 1;

                        set_state(&mut state, ProcessorState::Translating);
                        let event = match self.translator.translate(&frame) {
                            Ok(event) => event,
                            Err(error) => {
                                set_state(&mut state, ProcessorState::Failed);
                                return Err(error);
                            }
                        };

                        set_state(&mut state, ProcessorState::Writing);
                        match self.write(sink, event, cancel).await {
                            Ok(()) => stats.events_written += 1,
                            Err(GatewayError::Cancelled) => {
                                set_state(&mut state, ProcessorState::Cancelled);
                                return Err(GatewayError::Cancelled);
                            }
                            Err(error) => {
                                set_state(&mut state, ProcessorState::Failed);
                                return Err(error);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Writes one event, observing cancellation and the backpressure bound.
    async fn write<K>(
        &self,
        sink: &mut K,
        event: OutboundEvent,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        K: EventSink + ?Sized,
    {
        let send = sink.send(event);
        let deliver = async {
            match self.write_timeout {
                Some(bound) => match tokio::time::timeout(bound, send).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::BackpressureTimeout),
                },
                None => send.await,
            }
        };
        tokio::select! {
            () = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = deliver => result,
        }
    }
}

fn set_state(state: &mut ProcessorState, next: ProcessorState) {
    if *state != next {
        tracing::trace!(from = ?*state, to = ?next, "pipeline state");
        *state = next;
    }
}
