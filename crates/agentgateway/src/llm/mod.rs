//! The translation core (spec §1–§2): per-request translator instances that
//! convert between the canonical OpenAI-compatible chat/completions schema
//! and each backend's wire schema, plus the Factory that selects one.
//!
//! A translator is bound to exactly one client request/response pair; it is
//! created, driven through `request_body` → `response_headers` →
//! `response_body`* (or `response_error`), then dropped (spec §5). Nothing
//! here performs I/O or retains state across requests.

pub mod conversion;
pub mod error;
pub mod providers;
pub mod types;

use agent_core::strng;
use agent_core::strng::Strng;
use bytes::Bytes;

pub use error::AIError;

/// An ordered set of header overrides the host applies before forwarding
/// (spec §4.7). Order matters only in that later `set` calls for the same
/// name are expected to win; the host decides how that's applied.
#[derive(Debug, Clone, Default)]
pub struct HeaderMutation {
	pub set: Vec<(Strng, Strng)>,
}

impl HeaderMutation {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, name: impl Into<Strng>, value: impl Into<Strng>) -> &mut Self {
		self.set.push((name.into(), value.into()));
		self
	}

	pub fn with(mut self, name: impl Into<Strng>, value: impl Into<Strng>) -> Self {
		self.push(name, value);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.set.is_empty()
	}

	/// Set `content-length` to `body`'s exact byte length (spec invariant:
	/// content-length is re-set whenever body is mutated; P5).
	pub fn with_content_length(self, body: &BodyMutation) -> Self {
		self.with("content-length", body.len().to_string())
	}
}

/// A full-body replacement; spec §4.7 requires byte replacement, never a
/// partial patch.
#[derive(Debug, Clone)]
pub struct BodyMutation {
	pub body: Bytes,
}

impl BodyMutation {
	pub fn new(body: impl Into<Bytes>) -> Self {
		Self { body: body.into() }
	}

	pub fn len(&self) -> usize {
		self.body.len()
	}

	pub fn is_empty(&self) -> bool {
		self.body.is_empty()
	}
}

/// Token accounting for one response (spec §3). All fields are unsigned
/// 32-bit, matching the wire ranges every backend reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
	pub input_tokens: u32,
	pub output_tokens: u32,
	pub total_tokens: u32,
	pub cached_input_tokens: u32,
}

/// The span sink collaborator (spec §6): an external observability backend
/// that `response_body` reports token usage and raw chunks to. Out of scope
/// beyond this interface — the core never constructs one itself.
pub trait ResponseSpan {
	fn record_response(&self, usage: &TokenUsage, response_model: &str);
	fn record_response_chunk(&self, chunk: &[u8]);
}

/// A `ResponseSpan` that discards everything, for callers with no span sink.
pub struct NoopSpan;

impl ResponseSpan for NoopSpan {
	fn record_response(&self, _usage: &TokenUsage, _response_model: &str) {}
	fn record_response_chunk(&self, _chunk: &[u8]) {}
}

pub type RequestBodyResult = Result<(Option<HeaderMutation>, Option<BodyMutation>), AIError>;
pub type ResponseBodyResult =
	Result<(Option<HeaderMutation>, Option<BodyMutation>, Option<TokenUsage>, Option<Strng>), AIError>;
pub type ResponseErrorResult = Result<(Option<HeaderMutation>, Option<BodyMutation>), AIError>;

/// The four operations every translator exposes (spec §2). Implemented as an
/// enum over the concrete per-backend translators rather than a `dyn Trait`:
/// each variant's state shape is fixed at construction by the Factory and
/// never changes type over the translator's lifetime, so a tagged union
/// (matching this crate's convention for closed polymorphic sets — spec §9)
/// is a better fit than dynamic dispatch.
pub enum Translator {
	OpenAi(conversion::completions::Translator),
	Bedrock(conversion::bedrock::Translator),
	Gemini(conversion::gemini::Translator),
	VertexAnthropic(conversion::vertex_anthropic::Translator),
}

impl Translator {
	#[tracing::instrument(skip_all)]
	pub fn request_body(&mut self, raw: &[u8], parsed: &types::completions::Request, force_mutate: bool) -> RequestBodyResult {
		match self {
			Translator::OpenAi(t) => t.request_body(raw, parsed, force_mutate),
			Translator::Bedrock(t) => t.request_body(raw, parsed, force_mutate),
			Translator::Gemini(t) => t.request_body(raw, parsed, force_mutate),
			Translator::VertexAnthropic(t) => t.request_body(raw, parsed, force_mutate),
		}
	}

	#[tracing::instrument(skip_all)]
	pub fn response_headers(&mut self, headers: &http::HeaderMap) -> Option<HeaderMutation> {
		match self {
			Translator::OpenAi(t) => t.response_headers(headers),
			Translator::Bedrock(t) => t.response_headers(headers),
			Translator::Gemini(t) => t.response_headers(headers),
			Translator::VertexAnthropic(t) => t.response_headers(headers),
		}
	}

	#[tracing::instrument(skip(self, headers, chunk, span))]
	pub fn response_body(
		&mut self,
		headers: &http::HeaderMap,
		chunk: &[u8],
		end_of_stream: bool,
		span: Option<&dyn ResponseSpan>,
	) -> ResponseBodyResult {
		match self {
			Translator::OpenAi(t) => t.response_body(headers, chunk, end_of_stream, span),
			Translator::Bedrock(t) => t.response_body(headers, chunk, end_of_stream, span),
			Translator::Gemini(t) => t.response_body(headers, chunk, end_of_stream, span),
			Translator::VertexAnthropic(t) => t.response_body(headers, chunk, end_of_stream, span),
		}
	}

	#[tracing::instrument(skip_all)]
	pub fn response_error(&mut self, headers: &http::HeaderMap, body: &[u8]) -> ResponseErrorResult {
		match self {
			Translator::OpenAi(t) => t.response_error(headers, body),
			Translator::Bedrock(t) => t.response_error(headers, body),
			Translator::Gemini(t) => t.response_error(headers, body),
			Translator::VertexAnthropic(t) => t.response_error(headers, body),
		}
	}
}

/// The backend a translator targets, named exactly as the Factory's dispatch
/// key (spec §4.1): `(client request schema, backend schema, apiVersion?,
/// modelNameOverride?)`. The client request schema is fixed to the canonical
/// OpenAI-compatible shape in this crate's scope (spec §3), so only the
/// backend schema varies.
#[derive(Debug, Clone)]
pub enum BackendConfig {
	OpenAi(providers::openai::Provider),
	Azure(providers::azure::Provider),
	Bedrock(providers::bedrock::Provider),
	Vertex(providers::vertex::Provider),
}

/// Selects a translator by backend schema, optional apiVersion, and optional
/// model-name override (spec §4.1). Each translator records the
/// post-override request model at construction time; that's the value
/// response-model attribution falls back to (spec §4.8).
pub struct Factory;

impl Factory {
	pub fn create(
		backend: BackendConfig,
		api_version: Option<Strng>,
		model_override: Option<Strng>,
		request_model: Strng,
	) -> Translator {
		let effective_model = model_override.clone().unwrap_or(request_model);
		match backend {
			BackendConfig::OpenAi(provider) => Translator::OpenAi(conversion::completions::Translator::openai(
				provider,
				api_version,
				model_override,
				effective_model,
			)),
			BackendConfig::Azure(provider) => Translator::OpenAi(conversion::completions::Translator::azure(
				provider,
				model_override,
				effective_model,
			)),
			BackendConfig::Bedrock(provider) => {
				Translator::Bedrock(conversion::bedrock::Translator::new(provider, effective_model))
			},
			BackendConfig::Vertex(provider) => {
				if provider.is_anthropic_model(Some(effective_model.as_str())) {
					Translator::VertexAnthropic(conversion::vertex_anthropic::Translator::new(provider, effective_model))
				} else {
					Translator::Gemini(conversion::gemini::Translator::new(provider, effective_model))
				}
			},
		}
	}
}

/// SSE stream terminator (spec §3, §4.7, P4).
pub const DONE: &str = "data: [DONE]\n";

/// Frame one JSON value as an SSE `data:` event (spec §4.7).
pub fn sse_frame(json: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(json.len() + 8);
	out.extend_from_slice(b"data: ");
	out.extend_from_slice(json);
	out.extend_from_slice(b"\n\n");
	out
}

pub(crate) fn new_strng(s: impl AsRef<str>) -> Strng {
	strng::new(s)
}

/// Reads the upstream HTTP status out of response headers for error
/// wrapping (spec §7). How the host surfaces a status alongside ordinary
/// headers is its concern; this reads whichever convention is present and
/// falls back to a generic 502 for an unknown upstream failure.
pub(crate) fn response_status(headers: &http::HeaderMap) -> u16 {
	headers
		.get("status")
		.or_else(|| headers.get(":status"))
		.and_then(|v| v.to_str().ok())
		.and_then(|s| s.parse().ok())
		.unwrap_or(502)
}

/// A response id for backends that don't echo one of their own (Bedrock,
/// Gemini, Vertex Anthropic all omit a client-facing completion id).
pub(crate) fn synthetic_id(prefix: &str) -> String {
	format!("{prefix}-{}", chrono::Utc::now().timestamp_millis())
}

pub(crate) fn unix_timestamp() -> u32 {
	chrono::Utc::now().timestamp() as u32
}

/// Parse a `data:<mime>;base64,<payload>` URI, returning the mime type and
/// the base64 payload (kept encoded — callers that just need to validate or
/// forward it avoid a decode/re-encode round trip).
pub(crate) fn parse_data_uri(uri: &str) -> Result<(&str, &str), AIError> {
	let rest = uri.strip_prefix("data:").ok_or(AIError::MalformedDataUri)?;
	let (mime_and_params, payload) = rest.split_once(',').ok_or(AIError::MalformedDataUri)?;
	let mime = mime_and_params.strip_suffix(";base64").ok_or(AIError::MalformedDataUri)?;
	Ok((mime, payload))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_mutation_sets_content_length() {
		let body = BodyMutation::new(Bytes::from_static(b"12345"));
		let mutation = HeaderMutation::new().with_content_length(&body);
		assert_eq!(mutation.set, vec![(strng::literal!("content-length"), strng::new("5"))]);
	}

	#[test]
	fn sse_frame_shape() {
		let frame = sse_frame(br#"{"a":1}"#);
		assert_eq!(frame, b"data: {\"a\":1}\n\n");
	}
}
