//! SSE frame decoding and event classification.
//!
//! Both stages are synchronous; the stream session calls them between reads.
mod classifier;
mod decoder;

pub use classifier::classify;
pub use decoder::{Frame, FrameDecoder};
