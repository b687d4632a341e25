//! Restartable decoder for AWS's `application/vnd.amazon.eventstream` binary
//! framing, used by the Bedrock Converse streaming translator (spec §4.3,
//! §9). Wraps `aws-smithy-eventstream`'s single-frame decoder in a
//! `tokio_util::codec::Decoder` (the same pattern used elsewhere in this
//! crate for restartable parsers) and adds a loop that drains every frame
//! currently buffered, leaving any trailing partial frame in place for the
//! next call.

use aws_smithy_eventstream::frame::{DecodedFrame, MessageFrameDecoder};
pub use aws_smithy_types::event_stream::{Header, HeaderValue, Message};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

#[derive(Debug, thiserror::Error)]
pub enum EventStreamError {
	#[error("AWS eventstream protocol error: {0}")]
	Protocol(#[from] aws_smithy_eventstream::error::Error),
	#[error("I/O error decoding eventstream frame: {0}")]
	Io(#[from] std::io::Error),
}

/// A `tokio_util::codec::Decoder` around AWS Smithy's single-frame decoder.
#[derive(Default)]
pub struct FrameDecoder {
	inner: MessageFrameDecoder,
}

impl FrameDecoder {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Decoder for FrameDecoder {
	type Item = Message;
	type Error = EventStreamError;

	fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		match self.inner.decode_frame(src)? {
			DecodedFrame::Complete(message) => Ok(Some(message)),
			DecodedFrame::Incomplete => Ok(None),
		}
	}
}

/// Drain every complete frame currently present in `buf`. Any trailing
/// partial frame remains in `buf`, untouched, for the next call — callers
/// append new bytes to the same buffer across calls (spec §5 memory model:
/// consumed prefixes are discarded as soon as a frame decodes).
pub fn drain_frames(decoder: &mut FrameDecoder, buf: &mut BytesMut) -> Result<Vec<Message>, EventStreamError> {
	let mut frames = Vec::new();
	while let Some(msg) = decoder.decode(buf)? {
		frames.push(msg);
	}
	Ok(frames)
}

/// Look up a header by name and return it as a UTF-8 string, if present and
/// string-typed.
pub fn header_str<'a>(msg: &'a Message, name: &str) -> Option<&'a str> {
	msg
		.headers()
		.iter()
		.find(|h| h.name().as_str() == name)
		.and_then(|h| match h.value() {
			HeaderValue::String(s) => Some(s.as_str()),
			_ => None,
		})
}

#[cfg(test)]
mod tests {
	use aws_smithy_eventstream::frame::Message as SmithyMessage;
	use bytes::BytesMut;

	use super::*;

	fn encode(event_type: &str, payload: &[u8]) -> BytesMut {
		let msg = SmithyMessage::new(payload.to_vec()).add_header(aws_smithy_types::event_stream::Header::new(
			":event-type",
			HeaderValue::String(event_type.into()),
		));
		let mut out = Vec::new();
		msg.write_to(&mut out).unwrap();
		BytesMut::from(&out[..])
	}

	#[test]
	fn decodes_one_frame_at_a_time_across_byte_splits() {
		let encoded = encode("messageStart", br#"{"role":"assistant"}"#);
		let mut decoder = FrameDecoder::new();
		let mut buf = BytesMut::new();
		let mut frames = Vec::new();
		for &b in encoded.as_ref() {
			buf.extend_from_slice(&[b]);
			frames.extend(drain_frames(&mut decoder, &mut buf).unwrap());
		}
		assert_eq!(frames.len(), 1);
		assert_eq!(header_str(&frames[0], ":event-type"), Some("messageStart"));
		assert!(buf.is_empty());
	}

	#[test]
	fn leaves_trailing_partial_frame_buffered() {
		let encoded = encode("contentBlockDelta", br#"{"delta":{}}"#);
		let mut decoder = FrameDecoder::new();
		let mut buf = BytesMut::from(&encoded[..encoded.len() - 2]);
		let frames = drain_frames(&mut decoder, &mut buf).unwrap();
		assert!(frames.is_empty());
		assert!(!buf.is_empty());
	}
}
