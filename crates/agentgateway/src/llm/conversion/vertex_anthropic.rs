//! Vertex AI Anthropic (Claude) translator (spec §4.5): canonical chat/
//! completions to/from the Anthropic Messages-API shape at `rawPredict` /
//! `streamRawPredict`, with Anthropic's `event: <name>\ndata: <json>\n\n`
//! SSE framing on the way in and canonical `data: <json>\n\n` framing on the
//! way out.

use std::collections::HashMap;

use agent_core::strng::Strng;
use base64::Engine;
use itertools::Itertools;

use crate::json;
use crate::llm::types::{anthropic, completions};
use crate::llm::{
	self, AIError, BodyMutation, HeaderMutation, RequestBodyResult, ResponseBodyResult, ResponseErrorResult, ResponseSpan,
	TokenUsage, error, providers,
};
use crate::parse::sse;

/// A tool call whose `contentBlockStart`/`contentBlockDelta` pair hasn't been
/// closed by `contentBlockStop` yet, keyed by the block index Anthropic
/// reports (spec §4.5, §9: active-tool-calls indexed by block index).
struct ActiveTool {
	id: String,
	name: String,
}

pub struct Translator {
	provider: providers::vertex::Provider,
	request_model: Strng,
	streaming: bool,
	buf: bytes::BytesMut,
	active_tools: HashMap<usize, ActiveTool>,
	role_emitted: bool,
	finalized: bool,
	message_id: Option<String>,
	input_tokens: u32,
	output_tokens: u32,
	cached_tokens: u32,
	stop_reason: Option<anthropic::StopReason>,
	latest_usage: Option<TokenUsage>,
	stream_id: String,
	created: u32,
}

impl Translator {
	pub fn new(provider: providers::vertex::Provider, request_model: Strng) -> Self {
		Self {
			provider,
			request_model,
			streaming: false,
			buf: bytes::BytesMut::new(),
			active_tools: HashMap::new(),
			role_emitted: false,
			finalized: false,
			message_id: None,
			input_tokens: 0,
			output_tokens: 0,
			cached_tokens: 0,
			stop_reason: None,
			latest_usage: None,
			stream_id: llm::synthetic_id("vertex-anthropic"),
			created: llm::unix_timestamp(),
		}
	}

	pub fn request_body(&mut self, raw: &[u8], parsed: &completions::Request, _force_mutate: bool) -> RequestBodyResult {
		let _ = raw;
		self.streaming = parsed.stream.unwrap_or(false);

		let path = self.provider.get_path_for_model(Some(&self.request_model), self.streaming);
		let mut header_mut = HeaderMutation::new();
		header_mut.push(":path", path);

		let anthropic_req = map_request(parsed, &self.request_model)?;
		let body = serde_json::to_vec(&anthropic_req).map_err(AIError::RequestMarshal)?;
		let body = self.provider.prepare_anthropic_request_body(&body)?;
		let body_mut = BodyMutation::new(body);
		let header_mut = header_mut.with_content_length(&body_mut);
		Ok((Some(header_mut), Some(body_mut)))
	}

	pub fn response_headers(&mut self, _headers: &http::HeaderMap) -> Option<HeaderMutation> {
		None
	}

	pub fn response_body(
		&mut self,
		_headers: &http::HeaderMap,
		chunk: &[u8],
		end_of_stream: bool,
		span: Option<&dyn ResponseSpan>,
	) -> ResponseBodyResult {
		if !self.streaming {
			return self.response_body_unary(chunk, span);
		}

		self.buf.extend_from_slice(chunk);
		let mut out = Vec::new();
		for block in sse::drain_blocks(&mut self.buf) {
			let event = sse::parse_event_block(&block);
			if event.data.is_empty() {
				continue;
			}
			let parsed: anthropic::MessagesStreamEvent =
				serde_json::from_str(&event.data).map_err(AIError::ResponseUnmarshal)?;
			for response_chunk in self.translate_event(parsed)? {
				let json = serde_json::to_vec(&response_chunk).map_err(AIError::ResponseMarshal)?;
				out.extend_from_slice(&llm::sse_frame(&json));
			}
		}
		if end_of_stream {
			if !self.finalized {
				for response_chunk in self.finalize() {
					let json = serde_json::to_vec(&response_chunk).map_err(AIError::ResponseMarshal)?;
					out.extend_from_slice(&llm::sse_frame(&json));
				}
			}
			out.extend_from_slice(llm::DONE.as_bytes());
		}
		if let Some(span) = span {
			span.record_response_chunk(chunk);
		}
		let body_mut = if out.is_empty() { None } else { Some(BodyMutation::new(out)) };
		Ok((None, body_mut, self.latest_usage, Some(self.request_model.clone())))
	}

	fn response_body_unary(&mut self, chunk: &[u8], span: Option<&dyn ResponseSpan>) -> ResponseBodyResult {
		let resp: anthropic::MessagesResponse = serde_json::from_slice(chunk).map_err(AIError::ResponseUnmarshal)?;
		let stop_reason = resp
			.stop_reason
			.ok_or_else(|| AIError::Other("Anthropic response carried no stop_reason".to_string()))?;
		let finish_reason = map_stop_reason(stop_reason)?;

		let mut content: Option<String> = None;
		let mut tool_calls = Vec::new();
		let mut reasoning_content = None;
		for block in resp.content {
			match block {
				anthropic::ContentBlock::Text(text_block) => {
					if content.is_none() {
						content = Some(text_block.text);
					}
				},
				anthropic::ContentBlock::ToolUse { id, name, input, .. } => {
					tool_calls.push(completions::ToolCall {
						id,
						r#type: completions::FunctionType::Function,
						function: completions::FunctionCall { name, arguments: serde_json::to_string(&input).map_err(AIError::ResponseMarshal)? },
					});
				},
				anthropic::ContentBlock::Thinking { thinking, signature } => {
					reasoning_content = Some(completions::ReasoningContent {
						provider: completions::ReasoningProvider::VertexAnthropic,
						text: Some(thinking),
						signature: Some(signature),
						redacted_content: None,
					});
				},
				anthropic::ContentBlock::RedactedThinking { data } => {
					reasoning_content = Some(completions::ReasoningContent {
						provider: completions::ReasoningProvider::VertexAnthropic,
						text: None,
						signature: None,
						redacted_content: Some(data),
					});
				},
				anthropic::ContentBlock::Image(_) | anthropic::ContentBlock::Document(_) | anthropic::ContentBlock::ToolResult { .. } | anthropic::ContentBlock::Unknown => {},
			}
		}

		let usage = TokenUsage {
			input_tokens: resp.usage.input_tokens as u32,
			output_tokens: resp.usage.output_tokens as u32,
			total_tokens: (resp.usage.input_tokens + resp.usage.output_tokens) as u32,
			cached_input_tokens: resp.usage.cache_read_input_tokens.unwrap_or(0) as u32,
		};

		let message = completions::ResponseMessage {
			role: completions::Role::Assistant,
			content,
			tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
			reasoning_content,
			safety_ratings: None,
		};
		let response = completions::Response {
			id: resp.id,
			object: "chat.completion".to_string(),
			created: llm::unix_timestamp(),
			model: self.request_model.to_string(),
			choices: vec![completions::ChatChoice { index: 0, message, logprobs: None, finish_reason }],
			usage: completions::Usage {
				prompt_tokens: usage.input_tokens,
				completion_tokens: usage.output_tokens,
				total_tokens: usage.total_tokens,
				prompt_tokens_details: Some(completions::PromptTokensDetails { cached_tokens: Some(usage.cached_input_tokens) }),
				completion_tokens_details: None,
			},
			system_fingerprint: None,
			service_tier: None,
		};
		let body = serde_json::to_vec(&response).map_err(AIError::ResponseMarshal)?;
		if let Some(span) = span {
			span.record_response(&usage, &self.request_model);
			span.record_response_chunk(chunk);
		}
		Ok((None, Some(BodyMutation::new(body)), Some(usage), Some(self.request_model.clone())))
	}

	fn translate_event(&mut self, event: anthropic::MessagesStreamEvent) -> Result<Vec<completions::StreamResponse>, AIError> {
		use anthropic::MessagesStreamEvent::*;
		match event {
			MessageStart { message } => {
				self.message_id = Some(message.id);
				self.input_tokens = message.usage.input_tokens as u32;
				self.cached_tokens = message.usage.cache_read_input_tokens.unwrap_or(0) as u32;
				self.refresh_usage();
				Ok(vec![])
			},
			ContentBlockStart { index, content_block } => match content_block {
				anthropic::ContentBlock::ToolUse { id, name, input, .. } => {
					self.active_tools.insert(index, ActiveTool { id: id.clone(), name: name.clone() });
					let seed_args = match &input {
						serde_json::Value::Object(m) if m.is_empty() => None,
						serde_json::Value::Null => None,
						other => Some(serde_json::to_string(other).map_err(AIError::ResponseMarshal)?),
					};
					Ok(vec![self.chunk(
						completions::StreamResponseDelta {
							role: None,
							content: None,
							tool_calls: Some(vec![completions::ChatCompletionMessageToolCallChunk {
								index: index as u32,
								id: Some(id),
								r#type: Some(completions::FunctionType::Function),
								function: Some(completions::FunctionCallStream { name: Some(name), arguments: seed_args }),
							}]),
							reasoning_content: None,
							safety_ratings: None,
						},
						None,
					)])
				},
				anthropic::ContentBlock::Thinking { .. } => {
					Ok(vec![self.chunk(completions::StreamResponseDelta { role: None, content: None, tool_calls: None, reasoning_content: None, safety_ratings: None }, None)])
				},
				_ => Ok(vec![]),
			},
			ContentBlockDelta { index, delta } => match delta {
				anthropic::ContentBlockDelta::TextDelta { text } | anthropic::ContentBlockDelta::ThinkingDelta { thinking: text } => {
					Ok(vec![self.chunk(completions::StreamResponseDelta { role: None, content: Some(text), tool_calls: None, reasoning_content: None, safety_ratings: None }, None)])
				},
				anthropic::ContentBlockDelta::InputJsonDelta { partial_json } => {
					if !self.active_tools.contains_key(&index) {
						return Ok(vec![]);
					}
					Ok(vec![self.chunk(
						completions::StreamResponseDelta {
							role: None,
							content: None,
							tool_calls: Some(vec![completions::ChatCompletionMessageToolCallChunk {
								index: index as u32,
								id: None,
								r#type: None,
								function: Some(completions::FunctionCallStream { name: None, arguments: Some(partial_json) }),
							}]),
							reasoning_content: None,
							safety_ratings: None,
						},
						None,
					)])
				},
				anthropic::ContentBlockDelta::SignatureDelta { .. } => Ok(vec![]),
			},
			ContentBlockStop { index } => {
				self.active_tools.remove(&index);
				Ok(vec![])
			},
			MessageDelta { delta, usage } => {
				self.output_tokens = usage.output_tokens as u32;
				if let Some(cached) = usage.cache_read_input_tokens {
					self.cached_tokens = cached as u32;
				}
				self.stop_reason = delta.stop_reason;
				self.refresh_usage();
				Ok(vec![])
			},
			MessageStop => Ok(self.finalize()),
			Ping => Ok(vec![]),
			Error { error: err } => Err(AIError::UpstreamError(format!("{}: {}", err.r#type, err.message))),
		}
	}

	/// Emit the terminal `finish_reason` chunk followed by a usage-only chunk
	/// (spec §4.5: "the parser emits a final chunk carrying any unreported
	/// tool-call completions and chunk-level usage ... then `data: [DONE]`").
	/// Called both from `message_stop` and, defensively, if `endOfStream`
	/// arrives without one (spec §5: must tolerate any chunk boundary).
	fn finalize(&mut self) -> Vec<completions::StreamResponse> {
		self.finalized = true;
		self.active_tools.clear();
		let finish_reason = self
			.stop_reason
			.map(map_stop_reason)
			.unwrap_or(Ok(completions::FinishReason::Stop))
			.unwrap_or(completions::FinishReason::Stop);
		let terminal = self.chunk(
			completions::StreamResponseDelta { role: None, content: Some(String::new()), tool_calls: None, reasoning_content: None, safety_ratings: None },
			Some(finish_reason),
		);
		vec![terminal, self.usage_chunk()]
	}

	fn chunk(&mut self, mut delta: completions::StreamResponseDelta, finish_reason: Option<completions::FinishReason>) -> completions::StreamResponse {
		if !self.role_emitted {
			self.role_emitted = true;
			delta.role = Some(completions::Role::Assistant);
		}
		completions::StreamResponse {
			id: self.message_id.clone().unwrap_or_else(|| self.stream_id.clone()),
			object: "chat.completion.chunk".to_string(),
			created: self.created,
			model: self.request_model.to_string(),
			system_fingerprint: None,
			service_tier: None,
			choices: vec![completions::ChatChoiceStream { index: 0, delta, logprobs: None, finish_reason }],
			usage: None,
		}
	}

	fn usage_chunk(&self) -> completions::StreamResponse {
		completions::StreamResponse {
			id: self.message_id.clone().unwrap_or_else(|| self.stream_id.clone()),
			object: "chat.completion.chunk".to_string(),
			created: self.created,
			model: self.request_model.to_string(),
			system_fingerprint: None,
			service_tier: None,
			choices: vec![],
			usage: Some(completions::Usage {
				prompt_tokens: self.input_tokens,
				completion_tokens: self.output_tokens,
				total_tokens: self.input_tokens + self.output_tokens,
				prompt_tokens_details: Some(completions::PromptTokensDetails { cached_tokens: Some(self.cached_tokens) }),
				completion_tokens_details: None,
			}),
		}
	}

	fn refresh_usage(&mut self) {
		self.latest_usage = Some(TokenUsage {
			input_tokens: self.input_tokens,
			output_tokens: self.output_tokens,
			total_tokens: self.input_tokens + self.output_tokens,
			cached_input_tokens: self.cached_tokens,
		});
	}

	pub fn response_error(&mut self, headers: &http::HeaderMap, body: &[u8]) -> ResponseErrorResult {
		let code = llm::response_status(headers);
		let message = serde_json::from_slice::<anthropic::MessagesErrorResponse>(body)
			.map(|e| e.error.message)
			.unwrap_or_else(|_| String::from_utf8_lossy(body).to_string());
		let envelope = error::ErrorEnvelope::wrap_backend_error("VertexAnthropic", message, code);
		let bytes = envelope.to_vec().map_err(AIError::ResponseMarshal)?;
		let body_mut = BodyMutation::new(bytes);
		let header_mut = HeaderMutation::new().with_content_length(&body_mut);
		Ok((Some(header_mut), Some(body_mut)))
	}
}

fn map_stop_reason(reason: anthropic::StopReason) -> Result<completions::FinishReason, AIError> {
	use anthropic::StopReason::*;
	match reason {
		EndTurn | StopSequence | PauseTurn => Ok(completions::FinishReason::Stop),
		MaxTokens => Ok(completions::FinishReason::Length),
		ToolUse => Ok(completions::FinishReason::ToolCalls),
		Refusal => Ok(completions::FinishReason::ContentFilter),
		ModelContextWindowExceeded => Err(AIError::Other(format!("unsupported Anthropic stop_reason: {reason:?}"))),
	}
}

fn map_request(parsed: &completions::Request, model_id: &str) -> Result<anthropic::Request, AIError> {
	let max_tokens = parsed.effective_max_tokens().ok_or(AIError::MissingParameter("max_tokens"))? as usize;
	if let Some(t) = parsed.temperature {
		if !(0.0..=1.0).contains(&t) {
			return Err(AIError::TemperatureOutOfRange(t));
		}
	}

	let mut system_blocks = Vec::new();
	let mut messages = Vec::new();
	let msgs = &parsed.messages;
	let mut i = 0;
	while i < msgs.len() {
		match &msgs[i] {
			completions::Message::System { content } | completions::Message::Developer { content } => {
				for text in system_texts(content) {
					system_blocks.push(anthropic::SystemContentBlock::Text { text, cache_control: None });
				}
				i += 1;
			},
			completions::Message::User { content } => {
				messages.push(anthropic::Message { role: anthropic::Role::User, content: map_user_content(content)? });
				i += 1;
			},
			completions::Message::Assistant { content, tool_calls } => {
				let mut blocks = map_assistant_content(content.as_ref())?;
				if let Some(calls) = tool_calls {
					for call in calls {
						let input: serde_json::Value = serde_json::from_str(&call.function.arguments).map_err(AIError::RequestUnmarshal)?;
						blocks.push(anthropic::ContentBlock::ToolUse {
							id: call.id.clone(),
							name: call.function.name.clone(),
							input,
							cache_control: None,
						});
					}
				}
				messages.push(anthropic::Message { role: anthropic::Role::Assistant, content: blocks });
				i += 1;
			},
			completions::Message::Tool { .. } => {
				let mut results = Vec::new();
				while let Some(completions::Message::Tool { tool_call_id, content }) = msgs.get(i) {
					results.push(anthropic::ContentBlock::ToolResult {
						tool_use_id: tool_call_id.clone(),
						content: anthropic::ToolResultContent::Text(tool_result_text(content)),
						cache_control: None,
						is_error: None,
					});
					i += 1;
				}
				messages.push(anthropic::Message { role: anthropic::Role::User, content: results });
			},
		}
	}

	let tools = map_tools(parsed)?;
	let tool_choice = map_tool_choice(parsed.tool_choice.as_ref(), parsed.parallel_tool_calls);

	Ok(anthropic::Request {
		messages,
		system: if system_blocks.is_empty() { None } else { Some(anthropic::SystemPrompt::Blocks(system_blocks)) },
		model: model_id.to_string(),
		max_tokens,
		stop_sequences: parsed.stop_sequences(),
		stream: parsed.stream.unwrap_or(false),
		temperature: parsed.temperature,
		top_p: parsed.top_p,
		top_k: parsed.top_k.map(|v| v as usize),
		tools,
		tool_choice,
		thinking: parsed.thinking.as_ref().map(map_thinking),
	})
}

fn map_thinking(t: &completions::ThinkingConfig) -> anthropic::ThinkingInput {
	if t.enabled() {
		anthropic::ThinkingInput::Enabled { budget_tokens: t.budget_tokens.unwrap_or(0) as u64 }
	} else {
		anthropic::ThinkingInput::Disabled {}
	}
}

fn system_texts(content: &completions::StringOrParts<completions::TextPart>) -> Vec<String> {
	match content {
		completions::StringOrParts::Text(s) => vec![s.clone()],
		completions::StringOrParts::Parts(parts) => parts.iter().map(|p| p.text.clone()).collect(),
	}
}

fn tool_result_text(content: &completions::StringOrParts<completions::TextPart>) -> String {
	match content {
		completions::StringOrParts::Text(s) => s.clone(),
		completions::StringOrParts::Parts(parts) => parts.iter().map(|p| p.text.as_str()).join("\n"),
	}
}

fn map_user_content(content: &completions::StringOrParts<completions::UserPart>) -> Result<Vec<anthropic::ContentBlock>, AIError> {
	match content {
		completions::StringOrParts::Text(s) => Ok(vec![anthropic::ContentBlock::Text(anthropic::ContentTextBlock { text: s.clone(), cache_control: None })]),
		completions::StringOrParts::Parts(parts) => parts
			.iter()
			.map(|part| match part {
				completions::UserPart::Text { text } => {
					Ok(anthropic::ContentBlock::Text(anthropic::ContentTextBlock { text: text.clone(), cache_control: None }))
				},
				completions::UserPart::ImageUrl { image_url } => map_attachment(&image_url.url),
				completions::UserPart::InputAudio { .. } => Err(AIError::UnsupportedContentPart("input_audio".to_string())),
				completions::UserPart::File { .. } => Err(AIError::UnsupportedContentPart("file".to_string())),
			})
			.collect(),
	}
}

/// `data:` URIs become base64-source blocks; remote URLs become URL-source
/// blocks. A `.pdf` path (either form) becomes a document block instead of an
/// image block (spec §4.5).
fn map_attachment(url: &str) -> Result<anthropic::ContentBlock, AIError> {
	if url.starts_with("data:") {
		let (mime, payload) = llm::parse_data_uri(url)?;
		base64::engine::general_purpose::STANDARD.decode(payload).map_err(|_| AIError::MalformedDataUri)?;
		if mime == "application/pdf" {
			return Ok(anthropic::ContentBlock::Document(anthropic::ContentDocumentBlock {
				source: serde_json::json!({"type": "base64", "media_type": mime, "data": payload}),
				cache_control: None,
			}));
		}
		let media_type = anthropic_image_media_type(mime)?;
		Ok(anthropic::ContentBlock::Image(anthropic::ContentImageBlock {
			source: serde_json::json!({"type": "base64", "media_type": media_type, "data": payload}),
			cache_control: None,
		}))
	} else if url.to_ascii_lowercase().ends_with(".pdf") {
		Ok(anthropic::ContentBlock::Document(anthropic::ContentDocumentBlock {
			source: serde_json::json!({"type": "url", "url": url}),
			cache_control: None,
		}))
	} else {
		Ok(anthropic::ContentBlock::Image(anthropic::ContentImageBlock {
			source: serde_json::json!({"type": "url", "url": url}),
			cache_control: None,
		}))
	}
}

fn anthropic_image_media_type(mime: &str) -> Result<&'static str, AIError> {
	match mime {
		"image/jpeg" | "image/jpg" => Ok("image/jpeg"),
		"image/png" => Ok("image/png"),
		"image/gif" => Ok("image/gif"),
		"image/webp" => Ok("image/webp"),
		other => Err(AIError::UnsupportedMediaType(other.to_string())),
	}
}

fn map_assistant_content(content: Option<&completions::AssistantContent>) -> Result<Vec<anthropic::ContentBlock>, AIError> {
	match content {
		None => Ok(vec![]),
		Some(completions::AssistantContent::Text(s)) => {
			Ok(vec![anthropic::ContentBlock::Text(anthropic::ContentTextBlock { text: s.clone(), cache_control: None })])
		},
		Some(completions::AssistantContent::Block(part)) => Ok(vec![map_assistant_part(part)]),
		Some(completions::AssistantContent::Parts(parts)) => Ok(parts.iter().map(map_assistant_part).collect()),
	}
}

fn map_assistant_part(part: &completions::AssistantPart) -> anthropic::ContentBlock {
	match part {
		completions::AssistantPart::Text { text } => anthropic::ContentBlock::Text(anthropic::ContentTextBlock { text: text.clone(), cache_control: None }),
		completions::AssistantPart::Thinking { thinking, signature } => {
			anthropic::ContentBlock::Thinking { thinking: thinking.clone(), signature: signature.clone().unwrap_or_default() }
		},
		completions::AssistantPart::RedactedThinking { data } => anthropic::ContentBlock::RedactedThinking { data: data.clone() },
		completions::AssistantPart::Refusal { refusal } => anthropic::ContentBlock::Text(anthropic::ContentTextBlock { text: refusal.clone(), cache_control: None }),
	}
}

fn map_tools(parsed: &completions::Request) -> Result<Option<Vec<anthropic::Tool>>, AIError> {
	let Some(tools) = &parsed.tools else { return Ok(None) };
	let mapped = tools
		.iter()
		.map(|t| {
			let schema = t.function.parameters.clone().unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}));
			let dereferenced = json::dereference(&schema)?;
			Ok(anthropic::Tool { name: t.function.name.clone(), description: t.function.description.clone(), input_schema: dereferenced, cache_control: None })
		})
		.collect::<Result<Vec<_>, AIError>>()?;
	Ok(Some(mapped))
}

fn map_tool_choice(choice: Option<&completions::ToolChoiceOption>, parallel_tool_calls: Option<bool>) -> Option<anthropic::ToolChoice> {
	let disable_parallel_tool_use = matches!(parallel_tool_calls, Some(false)).then_some(true);
	Some(match choice? {
		completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Auto) => anthropic::ToolChoice::Auto { disable_parallel_tool_use },
		completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Required) => anthropic::ToolChoice::Any { disable_parallel_tool_use },
		completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::None) => anthropic::ToolChoice::None,
		completions::ToolChoiceOption::Function(named) => anthropic::ToolChoice::Tool { name: named.function.name.clone(), disable_parallel_tool_use },
	})
}

#[cfg(test)]
mod tests {
	use agent_core::strng;

	use super::*;

	fn sample_request(messages: Vec<completions::Message>) -> completions::Request {
		completions::Request {
			model: "claude-3-5-sonnet".to_string(),
			stream: Some(false),
			messages,
			tools: None,
			tool_choice: None,
			parallel_tool_calls: None,
			temperature: None,
			top_p: None,
			top_k: None,
			max_tokens: Some(256),
			max_completion_tokens: None,
			stop: None,
			thinking: None,
			guided_choice: None,
			guided_regex: None,
		}
	}

	fn provider() -> providers::vertex::Provider {
		providers::vertex::Provider {
			model: Some(strng::literal!("publishers/anthropic/models/claude-3-5-sonnet")),
			region: None,
			project_id: strng::literal!("my-project"),
		}
	}

	#[test]
	fn missing_max_tokens_is_rejected() {
		let mut req = sample_request(vec![]);
		req.max_tokens = None;
		req.max_completion_tokens = None;
		let err = map_request(&req, "claude-3-5-sonnet").unwrap_err();
		assert!(matches!(err, AIError::MissingParameter("max_tokens")));
	}

	#[test]
	fn out_of_range_temperature_is_rejected() {
		let mut req = sample_request(vec![]);
		req.temperature = Some(1.5);
		let err = map_request(&req, "claude-3-5-sonnet").unwrap_err();
		assert!(matches!(err, AIError::TemperatureOutOfRange(_)));
	}

	#[test]
	fn tool_messages_coalesce_into_one_user_message() {
		let req = sample_request(vec![
			completions::Message::Assistant { content: None, tool_calls: None },
			completions::Message::Tool { tool_call_id: "a".into(), content: completions::StringOrParts::Text("1".into()) },
			completions::Message::Tool { tool_call_id: "b".into(), content: completions::StringOrParts::Text("2".into()) },
		]);
		let mapped = map_request(&req, "claude-3-5-sonnet").unwrap();
		assert_eq!(mapped.messages.len(), 2);
		let anthropic::Message { role, content } = &mapped.messages[1];
		assert!(matches!(role, anthropic::Role::User));
		assert_eq!(content.len(), 2);
	}

	#[test]
	fn pdf_data_uri_becomes_document_block() {
		let block = map_attachment("data:application/pdf;base64,JVBERi0xLjQK").unwrap();
		let anthropic::ContentBlock::Document(doc) = block else { panic!("expected document block") };
		assert_eq!(doc.source["type"], "base64");
		assert_eq!(doc.source["media_type"], "application/pdf");
	}

	#[test]
	fn remote_pdf_url_becomes_document_block() {
		let block = map_attachment("https://example.com/report.PDF").unwrap();
		let anthropic::ContentBlock::Document(doc) = block else { panic!("expected document block") };
		assert_eq!(doc.source["type"], "url");
	}

	#[test]
	fn remote_image_url_becomes_image_block() {
		let block = map_attachment("https://example.com/cat.png").unwrap();
		let anthropic::ContentBlock::Image(img) = block else { panic!("expected image block") };
		assert_eq!(img.source["type"], "url");
	}

	#[test]
	fn unsupported_image_media_type_is_rejected() {
		let err = map_attachment("data:image/bmp;base64,AA==").unwrap_err();
		assert!(matches!(err, AIError::UnsupportedMediaType(_)));
	}

	#[test]
	fn s6_schema_dereference_cycle_fails_tool_mapping() {
		let req = completions::Request {
			tools: Some(vec![completions::Tool {
				r#type: completions::FunctionType::Function,
				function: completions::FunctionDefinition {
					name: "lookup".to_string(),
					description: None,
					parameters: Some(serde_json::json!({
						"$ref": "#/$defs/A",
						"$defs": {
							"A": { "properties": { "b": { "$ref": "#/$defs/B" } } },
							"B": { "properties": { "a": { "$ref": "#/$defs/A" } } }
						}
					})),
					strict: None,
				},
			}]),
			..sample_request(vec![])
		};
		let err = map_tools(&req).unwrap_err();
		assert!(matches!(err, AIError::SchemaDereference(_)));
	}

	#[test]
	fn parallel_tool_calls_false_disables_parallel_use() {
		let choice = map_tool_choice(Some(&completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Auto)), Some(false)).unwrap();
		assert!(matches!(choice, anthropic::ToolChoice::Auto { disable_parallel_tool_use: Some(true) }));
	}

	#[test]
	fn prepare_anthropic_body_injects_version_and_strips_model() {
		let req = sample_request(vec![completions::Message::User { content: completions::StringOrParts::Text("hi".into()) }]);
		let mapped = map_request(&req, "claude-3-5-sonnet").unwrap();
		let body = serde_json::to_vec(&mapped).unwrap();
		let body = provider().prepare_anthropic_request_body(&body).unwrap();
		let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(v["anthropic_version"], providers::vertex::ANTHROPIC_VERSION);
		assert!(v.get("model").is_none());
	}

	/// Scenario S3 (spec §8): message_start → text deltas → ping →
	/// content_block_stop → message_delta → message_stop must yield exactly
	/// one role-bearing chunk, in-order text deltas, a `finish_reason:"stop"`
	/// chunk, a `{input:9, output:16, total:25, cached:1}` usage chunk, then
	/// `data: [DONE]`.
	#[test]
	fn s3_anthropic_streaming_sse() {
		let mut t = Translator::new(provider(), strng::literal!("claude-3-5-sonnet"));
		t.streaming = true;

		let events = [
			serde_json::json!({
				"type": "message_start",
				"message": {
					"id": "msg_1", "type": "message", "role": "assistant", "content": [],
					"model": "claude-3-5-sonnet", "stop_reason": null, "stop_sequence": null,
					"usage": {"input_tokens": 9, "output_tokens": 0}
				}
			}),
			serde_json::json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
			serde_json::json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hi"}}),
			serde_json::json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "! 👋 How can I help you today?"}}),
			serde_json::json!({"type": "ping"}),
			serde_json::json!({"type": "content_block_stop", "index": 0}),
			serde_json::json!({
				"type": "message_delta",
				"delta": {"stop_reason": "end_turn", "stop_sequence": null},
				"usage": {"output_tokens": 16, "cache_read_input_tokens": 1}
			}),
			serde_json::json!({"type": "message_stop"}),
		];

		let mut raw = Vec::new();
		for event in &events {
			raw.extend_from_slice(format!("data: {}\n\n", event).as_bytes());
		}

		let (_, body_mut, usage, model) = t.response_body(&http::HeaderMap::new(), &raw, true, None).unwrap();
		let body = body_mut.unwrap().body;
		let text = String::from_utf8(body.to_vec()).unwrap();

		assert_eq!(model.unwrap(), "claude-3-5-sonnet");
		let usage = usage.unwrap();
		assert_eq!((usage.input_tokens, usage.output_tokens, usage.total_tokens, usage.cached_input_tokens), (9, 16, 25, 1));

		let frames: Vec<&str> = text.split("\n\n").filter(|s| !s.is_empty() && *s != "data: [DONE]\n").collect();
		let parsed: Vec<completions::StreamResponse> = frames
			.iter()
			.map(|f| serde_json::from_str(f.strip_prefix("data: ").unwrap()).unwrap())
			.collect();

		let role_bearing: Vec<_> = parsed.iter().filter(|c| c.choices.first().and_then(|ch| ch.delta.role).is_some()).collect();
		assert_eq!(role_bearing.len(), 1);

		let text_deltas: Vec<&str> = parsed.iter().filter_map(|c| c.choices.first().and_then(|ch| ch.delta.content.as_deref())).filter(|s| !s.is_empty()).collect();
		assert_eq!(text_deltas, vec!["Hi", "! 👋 How can I help you today?"]);

		let finish = parsed.iter().find_map(|c| c.choices.first().and_then(|ch| ch.finish_reason));
		assert_eq!(finish, Some(completions::FinishReason::Stop));

		let usage_frame = parsed.iter().find(|c| c.usage.is_some()).unwrap();
		let u = usage_frame.usage.as_ref().unwrap();
		assert_eq!((u.prompt_tokens, u.completion_tokens, u.total_tokens), (9, 16, 25));
		assert_eq!(u.prompt_tokens_details.as_ref().unwrap().cached_tokens, Some(1));

		assert!(text.ends_with("data: [DONE]\n"));
	}

	#[test]
	fn byte_at_a_time_split_matches_single_call() {
		let events = [
			serde_json::json!({
				"type": "message_start",
				"message": {
					"id": "msg_1", "type": "message", "role": "assistant", "content": [],
					"model": "claude-3-5-sonnet", "stop_reason": null, "stop_sequence": null,
					"usage": {"input_tokens": 1, "output_tokens": 0}
				}
			}),
			serde_json::json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
			serde_json::json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "hi"}}),
			serde_json::json!({"type": "content_block_stop", "index": 0}),
			serde_json::json!({"type": "message_delta", "delta": {"stop_reason": "end_turn", "stop_sequence": null}, "usage": {"output_tokens": 1}}),
			serde_json::json!({"type": "message_stop"}),
		];
		let mut raw = Vec::new();
		for event in &events {
			raw.extend_from_slice(format!("data: {}\n\n", event).as_bytes());
		}

		let mut whole = Translator::new(provider(), strng::literal!("claude-3-5-sonnet"));
		whole.streaming = true;
		let (_, whole_body, _, _) = whole.response_body(&http::HeaderMap::new(), &raw, true, None).unwrap();

		let mut split = Translator::new(provider(), strng::literal!("claude-3-5-sonnet"));
		split.streaming = true;
		let mut collected = Vec::new();
		for (i, &byte) in raw.iter().enumerate() {
			let eos = i == raw.len() - 1;
			let (_, body_mut, _, _) = split.response_body(&http::HeaderMap::new(), &[byte], eos, None).unwrap();
			if let Some(body_mut) = body_mut {
				collected.extend_from_slice(&body_mut.body);
			}
		}

		assert_eq!(whole_body.unwrap().body.as_ref(), collected.as_slice());
	}
}
