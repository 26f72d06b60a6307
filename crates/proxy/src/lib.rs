//! Streaming pipeline: decodes the upstream binary event stream and
//! re-emits front-protocol events downstream, in order and under
//! backpressure.

pub mod processor;
pub mod sink;
pub mod translate;

pub use processor::{ProcessorState, StreamProcessor, StreamStats};
pub use sink::{ChannelSink, CollectSink};
pub use translate::EventTranslator;
