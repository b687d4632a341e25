//! OpenAI and Azure OpenAI passthrough translator (spec §4.2). The body
//! schema is already canonical, so there's no structural translation: the
//! only request-side work is an optional `model` field rewrite and path
//! selection, and the only response-side work is usage/model extraction.

use agent_core::strng;
use agent_core::strng::Strng;
use bytes::BytesMut;

use crate::json;
use crate::llm::types::completions;
use crate::llm::{
	self, AIError, BodyMutation, HeaderMutation, RequestBodyResult, ResponseBodyResult, ResponseErrorResult, ResponseSpan,
	TokenUsage, error, providers,
};
use crate::parse::sse;

#[derive(Debug, Clone)]
enum Backend {
	OpenAi {
		provider: providers::openai::Provider,
		api_version: Option<Strng>,
	},
	Azure {
		provider: providers::azure::Provider,
	},
}

impl Backend {
	fn path(&self, model: &str) -> Strng {
		match self {
			Backend::OpenAi { api_version: Some(v), .. } => strng::format!("/{v}/chat/completions"),
			Backend::OpenAi { provider, api_version: None } => strng::new(provider.get_path()),
			Backend::Azure { provider } => provider.get_path_for_model(model),
		}
	}

	fn backend_error_tag(&self) -> &'static str {
		match self {
			Backend::OpenAi { .. } => "OpenAI",
			Backend::Azure { .. } => "AzureOpenAI",
		}
	}
}

pub struct Translator {
	backend: Backend,
	model_override: Option<Strng>,
	request_model: Strng,
	streaming: bool,
	buf: BytesMut,
	streaming_response_model: Option<String>,
	latest_usage: Option<TokenUsage>,
}

impl Translator {
	pub fn openai(
		provider: providers::openai::Provider,
		api_version: Option<Strng>,
		model_override: Option<Strng>,
		request_model: Strng,
	) -> Self {
		Self::new(Backend::OpenAi { provider, api_version }, model_override, request_model)
	}

	pub fn azure(provider: providers::azure::Provider, model_override: Option<Strng>, request_model: Strng) -> Self {
		Self::new(Backend::Azure { provider }, model_override, request_model)
	}

	fn new(backend: Backend, model_override: Option<Strng>, request_model: Strng) -> Self {
		Self {
			backend,
			model_override,
			request_model,
			streaming: false,
			buf: BytesMut::new(),
			streaming_response_model: None,
			latest_usage: None,
		}
	}

	pub fn request_body(&mut self, raw: &[u8], parsed: &completions::Request, force_mutate: bool) -> RequestBodyResult {
		self.streaming = parsed.stream.unwrap_or(false);

		let path = self.backend.path(&self.request_model);
		let mut header_mut = HeaderMutation::new();
		header_mut.push(":path", path);

		let body_mut = if let Some(model) = &self.model_override {
			Some(self.rewrite_model(raw, model)?)
		} else if force_mutate {
			// Retry path: re-emit the original bytes verbatim so the proxy
			// re-sends them, overwriting whatever a prior attempt mutated.
			Some(BodyMutation::new(raw.to_vec()))
		} else {
			None
		};

		let header_mut = match &body_mut {
			Some(b) => header_mut.with_content_length(b),
			None => header_mut,
		};
		Ok((Some(header_mut), body_mut))
	}

	/// Rewrite only the top-level `model` field, preferring a byte-preserving
	/// rewrite and falling back to full re-serialization only if the raw
	/// bytes don't match the expected `"model":"..."` shape (spec §4.2, §9).
	fn rewrite_model(&self, raw: &[u8], model: &str) -> Result<BodyMutation, AIError> {
		if let Some(bytes) = json::set_top_level_string_field(raw, "model", model) {
			return Ok(BodyMutation::new(bytes));
		}
		let mut value: serde_json::Value = serde_json::from_slice(raw).map_err(AIError::RequestUnmarshal)?;
		if let Some(obj) = value.as_object_mut() {
			obj.insert("model".to_string(), serde_json::Value::String(model.to_string()));
		}
		let bytes = serde_json::to_vec(&value).map_err(AIError::RequestMarshal)?;
		Ok(BodyMutation::new(bytes))
	}

	pub fn response_headers(&mut self, _headers: &http::HeaderMap) -> Option<HeaderMutation> {
		// Unchanged schema and content-type; nothing to rewrite.
		None
	}

	pub fn response_body(
		&mut self,
		_headers: &http::HeaderMap,
		chunk: &[u8],
		_end_of_stream: bool,
		span: Option<&dyn ResponseSpan>,
	) -> ResponseBodyResult {
		if self.streaming {
			return self.response_body_streaming(chunk, span);
		}

		let resp: completions::Response = serde_json::from_slice(chunk).map_err(AIError::ResponseUnmarshal)?;
		let usage = usage_from_completions(&resp.usage);
		let model = if resp.model.is_empty() {
			self.request_model.clone()
		} else {
			strng::new(&resp.model)
		};
		if let Some(span) = span {
			span.record_response(&usage, &model);
			span.record_response_chunk(chunk);
		}
		Ok((None, None, Some(usage), Some(model)))
	}

	/// Buffers across calls and re-scans line-by-line (spec §4.2): unlike the
	/// other backends this does not frame on blank lines, matching the
	/// source OpenAI-passthrough parser's "latest usage/model wins, keep
	/// scanning forever" behavior (spec §9 open question).
	fn response_body_streaming(&mut self, chunk: &[u8], span: Option<&dyn ResponseSpan>) -> ResponseBodyResult {
		self.buf.extend_from_slice(chunk);
		for line in sse::drain_lines(&mut self.buf) {
			let Some(data) = sse::strip_data_prefix(&line) else { continue };
			if data == b"[DONE]" {
				continue;
			}
			let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
				continue;
			};
			if let Some(model) = value.get("model").and_then(|m| m.as_str()) {
				if !model.is_empty() {
					self.streaming_response_model = Some(model.to_string());
				}
			}
			if let Some(usage) = value.get("usage") {
				if let Ok(usage) = serde_json::from_value::<completions::Usage>(usage.clone()) {
					self.latest_usage = Some(usage_from_completions(&usage));
				}
			}
		}
		if let Some(span) = span {
			span.record_response_chunk(chunk);
		}
		let model = self
			.streaming_response_model
			.as_deref()
			.map(strng::new)
			.unwrap_or_else(|| self.request_model.clone());
		Ok((None, None, self.latest_usage, Some(model)))
	}

	pub fn response_error(&mut self, headers: &http::HeaderMap, body: &[u8]) -> ResponseErrorResult {
		let is_json = headers
			.get(http::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.is_some_and(|ct| ct.contains("json"));
		if is_json {
			return Ok((None, None));
		}
		let message = String::from_utf8_lossy(body).to_string();
		let envelope =
			error::ErrorEnvelope::wrap_backend_error(self.backend.backend_error_tag(), message, llm::response_status(headers));
		let bytes = envelope.to_vec().map_err(AIError::ResponseMarshal)?;
		let body_mut = BodyMutation::new(bytes);
		let header_mut = HeaderMutation::new().with_content_length(&body_mut);
		Ok((Some(header_mut), Some(body_mut)))
	}
}

fn usage_from_completions(usage: &completions::Usage) -> TokenUsage {
	TokenUsage {
		input_tokens: usage.prompt_tokens,
		output_tokens: usage.completion_tokens,
		total_tokens: usage.total_tokens,
		cached_input_tokens: usage.prompt_tokens_details.as_ref().and_then(|d| d.cached_tokens).unwrap_or(0),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_request(model: &str, stream: Option<bool>) -> completions::Request {
		completions::Request {
			model: model.to_string(),
			stream,
			messages: vec![],
			tools: None,
			tool_choice: None,
			parallel_tool_calls: None,
			temperature: None,
			top_p: None,
			top_k: None,
			max_tokens: None,
			max_completion_tokens: None,
			stop: None,
			thinking: None,
			guided_choice: None,
			guided_regex: None,
		}
	}

	fn openai_translator() -> Translator {
		Translator::openai(
			providers::openai::Provider { model: None, host: None },
			None,
			None,
			strng::literal!("gpt-4o"),
		)
	}

	#[test]
	fn p1_idempotent_passthrough_no_override_no_force() {
		let mut t = openai_translator();
		let req = sample_request("gpt-4o", Some(false));
		let raw = br#"{"model":"gpt-4o","messages":[]}"#;
		let (headers, body) = t.request_body(raw, &req, false).unwrap();
		assert!(body.is_none());
		let headers = headers.unwrap();
		assert_eq!(headers.set, vec![(strng::literal!(":path"), strng::new("/v1/chat/completions"))]);
	}

	#[test]
	fn force_mutate_without_override_reemits_original_bytes() {
		let mut t = openai_translator();
		let req = sample_request("gpt-4o", Some(false));
		let raw = br#"{"model":"gpt-4o","messages":[]}"#;
		let (headers, body) = t.request_body(raw, &req, true).unwrap();
		let body = body.unwrap();
		assert_eq!(&body.body[..], raw);
		assert!(
			headers
				.unwrap()
				.set
				.iter()
				.any(|(k, v)| k == "content-length" && v == &body.len().to_string())
		);
	}

	#[test]
	fn model_override_preserves_byte_layout() {
		let mut t = Translator::openai(
			providers::openai::Provider { model: None, host: None },
			None,
			Some(strng::literal!("gpt-4o-mini")),
			strng::literal!("gpt-4o-mini"),
		);
		let req = sample_request("gpt-4o", Some(false));
		let raw = br#"{"model":"gpt-4o","messages":[{"role":"user","content":"hi"}]}"#;
		let (_, body) = t.request_body(raw, &req, false).unwrap();
		assert_eq!(
			&body.unwrap().body[..],
			br#"{"model":"gpt-4o-mini","messages":[{"role":"user","content":"hi"}]}"#
		);
	}

	#[test]
	fn azure_path_uses_deployment_for_dated_api_version() {
		let mut t = Translator::azure(
			providers::azure::Provider {
				model: None,
				host: strng::literal!("my-resource.openai.azure.com"),
				api_version: Some(strng::literal!("2024-06-01")),
			},
			None,
			strng::literal!("gpt-4o"),
		);
		let req = sample_request("gpt-4o", Some(false));
		let (headers, _) = t.request_body(b"{}", &req, false).unwrap();
		let path = headers.unwrap().set.into_iter().find(|(k, _)| k == ":path").unwrap().1;
		assert_eq!(path, "/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01");
	}

	#[test]
	fn streaming_response_tracks_latest_model_and_usage() {
		let mut t = openai_translator();
		t.streaming = true;
		let chunk1 = b"data: {\"model\":\"gpt-4o-2024\",\"choices\":[]}\n\n";
		let (_, _, usage, model) = t.response_body(&http::HeaderMap::new(), chunk1, false, None).unwrap();
		assert!(usage.is_none());
		assert_eq!(model.unwrap(), "gpt-4o-2024");

		let chunk2 = b"data: {\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":2,\"total_tokens\":7}}\n\ndata: [DONE]\n\n";
		let (_, _, usage, _) = t.response_body(&http::HeaderMap::new(), chunk2, true, None).unwrap();
		assert_eq!(usage.unwrap().total_tokens, 7);
	}

	#[test]
	fn response_error_wraps_non_json_body() {
		let mut t = openai_translator();
		let mut headers = http::HeaderMap::new();
		headers.insert(http::header::CONTENT_TYPE, "text/plain".parse().unwrap());
		let (header_mut, body_mut) = t.response_error(&headers, b"upstream exploded").unwrap();
		let body_mut = body_mut.unwrap();
		let v: serde_json::Value = serde_json::from_slice(&body_mut.body).unwrap();
		assert_eq!(v["type"], "error");
		assert_eq!(v["error"]["type"], "OpenAIBackendError");
		assert!(header_mut.unwrap().set.iter().any(|(k, _)| k == "content-length"));
	}

	#[test]
	fn response_error_passes_through_json_body() {
		let mut t = openai_translator();
		let mut headers = http::HeaderMap::new();
		headers.insert(http::header::CONTENT_TYPE, "application/json".parse().unwrap());
		let (header_mut, body_mut) = t.response_error(&headers, br#"{"error":{"message":"bad"}}"#).unwrap();
		assert!(header_mut.is_none());
		assert!(body_mut.is_none());
	}
}
