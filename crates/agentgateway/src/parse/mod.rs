//! Restartable, chunk-boundary-tolerant parsers for every streaming wire
//! format this crate speaks (spec §4.3–§4.5, §9): AWS's binary eventstream
//! framing and line/block-oriented SSE. None of these block on I/O or retain
//! data beyond what's needed to resume on the next call.

pub mod aws_eventstream;
pub mod sse;
