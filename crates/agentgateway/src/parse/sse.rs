//! Restartable line- and block-oriented SSE scanners (spec §4.2, §4.4, §4.5,
//! §9). These operate on a caller-owned `BytesMut` buffer: bytes observed
//! across arbitrarily fragmented reads are appended, complete frames are
//! split off and returned, and any trailing partial frame stays buffered for
//! the next call. None of this blocks on I/O.

use bytes::{Buf, Bytes, BytesMut};

/// Split off every complete `\n`-terminated line currently in `buf`, in
/// order. The trailing, not-yet-terminated remainder (if any) stays in
/// `buf` for the next call. Used by the OpenAI/Azure passthrough streaming
/// translator (spec §4.2), which scans line-by-line rather than in blocks.
pub fn drain_lines(buf: &mut BytesMut) -> Vec<Bytes> {
	let mut lines = Vec::new();
	loop {
		let Some(pos) = buf.iter().position(|&b| b == b'\n') else {
			break;
		};
		let mut line = buf.split_to(pos + 1);
		line.truncate(line.len() - 1);
		if line.last() == Some(&b'\r') {
			line.truncate(line.len() - 1);
		}
		lines.push(line.freeze());
	}
	lines
}

/// Split off every complete blank-line-delimited block (`\n\n` or `\r\n\r\n`)
/// currently in `buf`. Used by the Gemini (`data: <json>\n\n`) and Anthropic
/// (`event: ...\ndata: ...\n\n`) streaming translators (spec §4.4, §4.5),
/// which frame on blank lines rather than single newlines.
pub fn drain_blocks(buf: &mut BytesMut) -> Vec<Bytes> {
	let mut blocks = Vec::new();
	loop {
		let Some(pos) = find_blank_line(buf) else {
			break;
		};
		let (end, delim_len) = pos;
		let block = buf.split_to(end);
		buf.advance(delim_len);
		blocks.push(block.freeze());
	}
	blocks
}

/// Returns `(block_end, delimiter_len)` for the first blank-line delimiter in
/// `buf`, where `block_end` is the index the block content ends at (exclusive
/// of the delimiter).
fn find_blank_line(buf: &BytesMut) -> Option<(usize, usize)> {
	let bytes = buf.as_ref();
	let mut i = 0;
	while i + 1 < bytes.len() {
		if bytes[i] == b'\n' && bytes[i + 1] == b'\n' {
			return Some((i, 2));
		}
		if i + 3 < bytes.len() && &bytes[i..i + 4] == b"\r\n\r\n" {
			return Some((i, 4));
		}
		i += 1;
	}
	None
}

/// Strip a single leading `data: ` (or `data:`) prefix from a line, as used
/// by the OpenAI/Gemini `data:` frame convention.
pub fn strip_data_prefix(line: &[u8]) -> Option<&[u8]> {
	line
		.strip_prefix(b"data: ")
		.or_else(|| line.strip_prefix(b"data:"))
}

/// One parsed SSE event block: an optional `event:` name and the
/// concatenation of every `data:` line's payload (joined with `\n`, per the
/// SSE spec), as Anthropic's `streamRawPredict` framing requires (spec §4.5).
#[derive(Debug, Default, Clone)]
pub struct SseEvent {
	pub name: Option<String>,
	pub data: String,
}

/// Parse one blank-line-delimited block (as produced by [`drain_blocks`])
/// into its `event:`/`data:` fields.
pub fn parse_event_block(block: &[u8]) -> SseEvent {
	let mut event = SseEvent::default();
	let mut data_lines = Vec::new();
	for raw_line in block.split(|&b| b == b'\n') {
		let line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
		if line.is_empty() {
			continue;
		}
		if let Some(name) = line.strip_prefix(b"event: ").or_else(|| line.strip_prefix(b"event:")) {
			event.name = Some(String::from_utf8_lossy(name).trim().to_string());
		} else if let Some(data) = strip_data_prefix(line) {
			data_lines.push(String::from_utf8_lossy(data).to_string());
		}
		// any other field (id:, retry:, comments starting with ':') is ignored.
	}
	event.data = data_lines.join("\n");
	event
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drain_lines_leaves_partial_in_buffer() {
		let mut buf = BytesMut::from(&b"data: a\ndata: b"[..]);
		let lines = drain_lines(&mut buf);
		assert_eq!(lines, vec![Bytes::from_static(b"data: a")]);
		assert_eq!(&buf[..], b"data: b");
	}

	#[test]
	fn drain_lines_handles_single_byte_pushes() {
		let mut buf = BytesMut::new();
		let mut collected = Vec::new();
		for &b in b"data: x\ndata: y\n" {
			buf.extend_from_slice(&[b]);
			collected.extend(drain_lines(&mut buf));
		}
		assert_eq!(collected, vec![Bytes::from_static(b"data: x"), Bytes::from_static(b"data: y")]);
		assert!(buf.is_empty());
	}

	#[test]
	fn drain_blocks_splits_on_blank_line() {
		let mut buf = BytesMut::from(&b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\npartial"[..]);
		let blocks = drain_blocks(&mut buf);
		assert_eq!(blocks.len(), 2);
		assert_eq!(&blocks[0][..], b"data: {\"a\":1}");
		assert_eq!(&buf[..], b"partial");
	}

	#[test]
	fn parse_event_block_concatenates_multiple_data_lines() {
		let block = b"event: message_start\ndata: {\"a\":\ndata: 1}";
		let ev = parse_event_block(block);
		assert_eq!(ev.name.as_deref(), Some("message_start"));
		assert_eq!(ev.data, "{\"a\":\n1}");
	}
}
