//! Binary event-stream framing: decoding and encoding.
//!
//! Wire format of one frame, all integers big-endian:
//!
//! ```text
//! offset 0            total length     (u32, includes the whole frame)
//! offset 4            headers length   (u32)
//! offset 8            prelude CRC-32   (over bytes 0..8)
//! offset 12           headers block    (headers-length bytes)
//! offset 12+H         payload
//! offset total-4      message CRC-32   (over everything before it)
//! ```
//!
//! The headers block is a sequence of `{name-length: u8, name: UTF-8,
//! value-type: u8, value}` entries. Names may repeat on the wire; lookups
//! expose the last occurrence.

pub mod decode;
pub mod encode;
pub mod frame;

pub use decode::{DecodeOutcome, FrameDecoder};
pub use encode::encode_frame;
pub use frame::{
    Frame, HeaderValue, MAX_FRAME_LEN_DEFAULT, MIN_FRAME_LEN, PRELUDE_LEN, TRAILER_LEN,
};
