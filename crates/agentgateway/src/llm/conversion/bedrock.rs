//! AWS Bedrock Converse translator (spec §4.3): canonical chat/completions
//! to/from `ConverseRequest`/`ConverseResponse`, and binary-eventstream
//! streaming translation into canonical SSE chunks.

use agent_core::strng::Strng;
use base64::Engine;
use bytes::{Bytes, BytesMut};

use crate::llm::types::{bedrock, completions};
use crate::llm::{
	self, AIError, BodyMutation, HeaderMutation, RequestBodyResult, ResponseBodyResult, ResponseErrorResult, ResponseSpan,
	TokenUsage, error, providers,
};
use crate::parse::aws_eventstream::{self, FrameDecoder};

pub struct Translator {
	provider: providers::bedrock::Provider,
	request_model: Strng,
	streaming: bool,
	decoder: FrameDecoder,
	buf: BytesMut,
	role: Option<completions::Role>,
	latest_usage: Option<TokenUsage>,
	stream_id: String,
	created: u32,
}

impl Translator {
	pub fn new(provider: providers::bedrock::Provider, request_model: Strng) -> Self {
		Self {
			provider,
			request_model,
			streaming: false,
			decoder: FrameDecoder::new(),
			buf: BytesMut::new(),
			role: None,
			latest_usage: None,
			stream_id: llm::synthetic_id("bedrock"),
			created: llm::unix_timestamp(),
		}
	}

	pub fn request_body(&mut self, raw: &[u8], parsed: &completions::Request, _force_mutate: bool) -> RequestBodyResult {
		let _ = raw;
		self.streaming = parsed.stream.unwrap_or(false);

		let path = self.provider.get_path(self.streaming, &self.request_model);
		let mut header_mut = HeaderMutation::new();
		header_mut.push(":path", path);

		let converse = map_request(parsed, &self.request_model)?;
		let body = serde_json::to_vec(&converse).map_err(AIError::RequestMarshal)?;
		let body_mut = BodyMutation::new(body);
		let header_mut = header_mut.with_content_length(&body_mut);
		Ok((Some(header_mut), Some(body_mut)))
	}

	pub fn response_headers(&mut self, _headers: &http::HeaderMap) -> Option<HeaderMutation> {
		if self.streaming {
			Some(HeaderMutation::new().with("content-type", "text/event-stream"))
		} else {
			None
		}
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
		let frames =
			aws_eventstream::drain_frames(&mut self.decoder, &mut self.buf).map_err(|e| AIError::EventStreamFraming(e.to_string()))?;

		let mut out = Vec::new();
		for frame in &frames {
			let event =
				bedrock::ConverseStreamOutput::deserialize(frame).map_err(|e| AIError::StreamPayloadMismatch(e.to_string()))?;
			if let Some(response_chunk) = self.translate_event(event)? {
				let json = serde_json::to_vec(&response_chunk).map_err(AIError::ResponseMarshal)?;
				out.extend_from_slice(&llm::sse_frame(&json));
			}
		}
		if end_of_stream {
			out.extend_from_slice(llm::DONE.as_bytes());
		}
		if let Some(span) = span {
			span.record_response_chunk(chunk);
		}
		let body_mut = if out.is_empty() { None } else { Some(BodyMutation::new(out)) };
		Ok((None, body_mut, self.latest_usage, Some(self.request_model.clone())))
	}

	fn response_body_unary(&mut self, chunk: &[u8], span: Option<&dyn ResponseSpan>) -> ResponseBodyResult {
		let resp: bedrock::ConverseResponse = serde_json::from_slice(chunk).map_err(AIError::ResponseUnmarshal)?;
		let usage = resp
			.usage
			.map(|u| TokenUsage {
				input_tokens: u.input_tokens as u32,
				output_tokens: u.output_tokens as u32,
				total_tokens: u.total_tokens as u32,
				cached_input_tokens: u.cache_read_input_tokens.unwrap_or(0) as u32,
			})
			.unwrap_or_default();

		let mut content: Option<String> = None;
		let mut tool_calls = Vec::new();
		let mut reasoning_content = None;
		if let Some(bedrock::ConverseOutput::Message(message)) = resp.output {
			for block in message.content {
				match block {
					bedrock::ContentBlock::Text(text) => {
						if content.is_none() {
							content = Some(text);
						}
					},
					bedrock::ContentBlock::ToolUse(tool_use) => {
						tool_calls.push(completions::ToolCall {
							id: tool_use.tool_use_id,
							r#type: completions::FunctionType::Function,
							function: completions::FunctionCall {
								name: tool_use.name,
								arguments: serde_json::to_string(&tool_use.input).map_err(AIError::ResponseMarshal)?,
							},
						});
					},
					bedrock::ContentBlock::ReasoningContent(r) => {
						reasoning_content = Some(reasoning_from_block(r)?);
					},
					bedrock::ContentBlock::Image(_) | bedrock::ContentBlock::ToolResult(_) => {},
				}
			}
		}

		let message = completions::ResponseMessage {
			role: completions::Role::Assistant,
			content,
			tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
			reasoning_content,
			safety_ratings: None,
		};
		let response = completions::Response {
			id: llm::synthetic_id("bedrock"),
			object: "chat.completion".to_string(),
			created: llm::unix_timestamp(),
			model: self.request_model.to_string(),
			choices: vec![completions::ChatChoice {
				index: 0,
				message,
				logprobs: None,
				finish_reason: map_stop_reason(resp.stop_reason),
			}],
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

	fn translate_event(&mut self, event: bedrock::ConverseStreamOutput) -> Result<Option<completions::StreamResponse>, AIError> {
		use bedrock::ConverseStreamOutput::*;
		match event {
			MessageStart(e) => {
				self.role = Some(map_role(e.role));
				Ok(Some(self.chunk(
					completions::StreamResponseDelta { role: self.role, content: Some(String::new()), tool_calls: None, reasoning_content: None, safety_ratings: None },
					None,
				)))
			},
			ContentBlockStart(e) => match e.start {
				Some(bedrock::ContentBlockStart::ToolUse(t)) => Ok(Some(self.chunk(
					completions::StreamResponseDelta {
						role: None,
						content: None,
						tool_calls: Some(vec![completions::ChatCompletionMessageToolCallChunk {
							index: e.content_block_index as u32,
							id: Some(t.tool_use_id),
							r#type: Some(completions::FunctionType::Function),
							function: Some(completions::FunctionCallStream { name: Some(t.name), arguments: None }),
						}]),
						reasoning_content: None,
						safety_ratings: None,
					},
					None,
				))),
				_ => Ok(None),
			},
			ContentBlockDelta(e) => match e.delta {
				Some(bedrock::ContentBlockDelta::Text(text)) => Ok(Some(self.chunk(
					completions::StreamResponseDelta { role: self.role, content: Some(text), tool_calls: None, reasoning_content: None, safety_ratings: None },
					None,
				))),
				Some(bedrock::ContentBlockDelta::ToolUse(t)) => Ok(Some(self.chunk(
					completions::StreamResponseDelta {
						role: None,
						content: None,
						tool_calls: Some(vec![completions::ChatCompletionMessageToolCallChunk {
							index: e.content_block_index as u32,
							id: None,
							r#type: None,
							function: Some(completions::FunctionCallStream { name: None, arguments: Some(t.input) }),
						}]),
						reasoning_content: None,
						safety_ratings: None,
					},
					None,
				))),
				Some(bedrock::ContentBlockDelta::ReasoningContent(r)) => {
					let reasoning = match r {
						bedrock::ReasoningContentBlockDelta::Text(text) => completions::ReasoningContent {
							provider: completions::ReasoningProvider::AwsBedrock,
							text: Some(text),
							signature: None,
							redacted_content: None,
						},
						bedrock::ReasoningContentBlockDelta::Signature(sig) => completions::ReasoningContent {
							provider: completions::ReasoningProvider::AwsBedrock,
							text: None,
							signature: Some(sig),
							redacted_content: None,
						},
						bedrock::ReasoningContentBlockDelta::RedactedContent(bytes) => completions::ReasoningContent {
							provider: completions::ReasoningProvider::AwsBedrock,
							text: None,
							signature: None,
							redacted_content: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
						},
						bedrock::ReasoningContentBlockDelta::Unknown => return Ok(None),
					};
					Ok(Some(self.chunk(
						completions::StreamResponseDelta { role: None, content: None, tool_calls: None, reasoning_content: Some(reasoning), safety_ratings: None },
						None,
					)))
				},
				None => Ok(None),
			},
			ContentBlockStop(_) => Ok(None),
			MessageStop(e) => Ok(Some(self.chunk(
				completions::StreamResponseDelta { role: self.role, content: Some(String::new()), tool_calls: None, reasoning_content: None, safety_ratings: None },
				Some(map_stop_reason(e.stop_reason)),
			))),
			Metadata(e) => {
				if let Some(u) = e.usage {
					self.latest_usage = Some(TokenUsage {
						input_tokens: u.input_tokens as u32,
						output_tokens: u.output_tokens as u32,
						total_tokens: u.total_tokens as u32,
						cached_input_tokens: u.cache_read_input_tokens.unwrap_or(0) as u32,
					});
				}
				Ok(None)
			},
		}
	}

	fn chunk(&self, delta: completions::StreamResponseDelta, finish_reason: Option<completions::FinishReason>) -> completions::StreamResponse {
		completions::StreamResponse {
			id: self.stream_id.clone(),
			object: "chat.completion.chunk".to_string(),
			created: self.created,
			model: self.request_model.to_string(),
			system_fingerprint: None,
			service_tier: None,
			choices: vec![completions::ChatChoiceStream { index: 0, delta, logprobs: None, finish_reason }],
			usage: None,
		}
	}

	pub fn response_error(&mut self, headers: &http::HeaderMap, body: &[u8]) -> ResponseErrorResult {
		let code = llm::response_status(headers);
		let message = serde_json::from_slice::<bedrock::ConverseErrorResponse>(body)
			.map(|e| e.message)
			.unwrap_or_else(|_| String::from_utf8_lossy(body).to_string());
		let envelope = error::ErrorEnvelope::wrap_backend_error("AWSBedrock", message, code);
		let bytes = envelope.to_vec().map_err(AIError::ResponseMarshal)?;
		let body_mut = BodyMutation::new(bytes);
		let header_mut = HeaderMutation::new().with_content_length(&body_mut);
		Ok((Some(header_mut), Some(body_mut)))
	}
}

fn map_role(role: bedrock::Role) -> completions::Role {
	match role {
		bedrock::Role::User => completions::Role::User,
		bedrock::Role::Assistant => completions::Role::Assistant,
	}
}

fn map_stop_reason(reason: bedrock::StopReason) -> completions::FinishReason {
	match reason {
		bedrock::StopReason::EndTurn | bedrock::StopReason::StopSequence => completions::FinishReason::Stop,
		bedrock::StopReason::MaxTokens => completions::FinishReason::Length,
		bedrock::StopReason::ContentFiltered => completions::FinishReason::ContentFilter,
		bedrock::StopReason::ToolUse => completions::FinishReason::ToolCalls,
		bedrock::StopReason::GuardrailIntervened | bedrock::StopReason::ModelContextWindowExceeded => completions::FinishReason::Stop,
	}
}

fn reasoning_from_block(block: bedrock::ReasoningContentBlock) -> Result<completions::ReasoningContent, AIError> {
	Ok(match block {
		bedrock::ReasoningContentBlock::Structured { reasoning_text } => completions::ReasoningContent {
			provider: completions::ReasoningProvider::AwsBedrock,
			text: Some(reasoning_text.text),
			signature: reasoning_text.signature,
			redacted_content: None,
		},
		bedrock::ReasoningContentBlock::Redacted { redacted_content } => completions::ReasoningContent {
			provider: completions::ReasoningProvider::AwsBedrock,
			text: None,
			signature: None,
			redacted_content: Some(base64::engine::general_purpose::STANDARD.encode(redacted_content)),
		},
	})
}

fn map_request(parsed: &completions::Request, model_id: &str) -> Result<bedrock::ConverseRequest, AIError> {
	let mut system = Vec::new();
	let mut messages = Vec::new();
	let msgs = &parsed.messages;
	let mut i = 0;
	while i < msgs.len() {
		match &msgs[i] {
			completions::Message::System { content } | completions::Message::Developer { content } => {
				system.extend(system_texts(content).into_iter().map(|text| bedrock::SystemContentBlock { text }));
				i += 1;
			},
			completions::Message::User { content } => {
				messages.push(bedrock::Message { role: bedrock::Role::User, content: map_user_content(content)? });
				i += 1;
			},
			completions::Message::Assistant { content, tool_calls } => {
				let mut blocks = map_assistant_content(content.as_ref())?;
				if let Some(calls) = tool_calls {
					for call in calls {
						let input: serde_json::Value =
							serde_json::from_str(&call.function.arguments).map_err(AIError::RequestUnmarshal)?;
						blocks.push(bedrock::ContentBlock::ToolUse(bedrock::ToolUseBlock {
							tool_use_id: call.id.clone(),
							name: call.function.name.clone(),
							input,
						}));
					}
				}
				messages.push(bedrock::Message { role: bedrock::Role::Assistant, content: blocks });
				i += 1;
			},
			completions::Message::Tool { .. } => {
				let mut results = Vec::new();
				while let Some(completions::Message::Tool { tool_call_id, content }) = msgs.get(i) {
					results.push(bedrock::ToolResultBlock {
						tool_use_id: tool_call_id.clone(),
						content: map_tool_result_content(content),
						status: None,
					});
					i += 1;
				}
				let blocks = results.into_iter().map(bedrock::ContentBlock::ToolResult).collect();
				messages.push(bedrock::Message { role: bedrock::Role::User, content: blocks });
			},
		}
	}

	let inference_config = bedrock::InferenceConfiguration {
		max_tokens: parsed.effective_max_tokens().map(|v| v as usize),
		temperature: parsed.temperature,
		top_p: parsed.top_p,
		top_k: parsed.top_k.map(|v| v as usize),
		stop_sequences: parsed.stop_sequences(),
	};

	let tool_config = map_tools(parsed, model_id)?;

	let additional_model_request_fields = parsed.thinking.as_ref().map(|t| {
		serde_json::json!({
			"thinking": {
				"type": if t.enabled() { "enabled" } else { "disabled" },
				"budget_tokens": t.budget_tokens,
			}
		})
	});

	Ok(bedrock::ConverseRequest {
		model_id: model_id.to_string(),
		messages,
		system: if system.is_empty() { None } else { Some(system) },
		inference_config: Some(inference_config),
		tool_config,
		additional_model_request_fields,
	})
}

fn system_texts(content: &completions::StringOrParts<completions::TextPart>) -> Vec<String> {
	match content {
		completions::StringOrParts::Text(s) => vec![s.clone()],
		completions::StringOrParts::Parts(parts) => parts.iter().map(|p| p.text.clone()).collect(),
	}
}

fn map_user_content(content: &completions::StringOrParts<completions::UserPart>) -> Result<Vec<bedrock::ContentBlock>, AIError> {
	match content {
		completions::StringOrParts::Text(s) => Ok(vec![bedrock::ContentBlock::Text(s.clone())]),
		completions::StringOrParts::Parts(parts) => parts
			.iter()
			.map(|part| match part {
				completions::UserPart::Text { text } => Ok(bedrock::ContentBlock::Text(text.clone())),
				completions::UserPart::ImageUrl { image_url } => map_image(&image_url.url),
				completions::UserPart::InputAudio { .. } => Err(AIError::UnsupportedContentPart("input_audio".to_string())),
				completions::UserPart::File { .. } => Err(AIError::UnsupportedContentPart("file".to_string())),
			})
			.collect(),
	}
}

fn map_image(url: &str) -> Result<bedrock::ContentBlock, AIError> {
	let (mime, payload) = llm::parse_data_uri(url)?;
	let format = image_format(mime)?;
	// Validate the payload actually decodes; the wire format keeps it base64-encoded.
	base64::engine::general_purpose::STANDARD.decode(payload).map_err(|_| AIError::MalformedDataUri)?;
	Ok(bedrock::ContentBlock::Image(bedrock::ImageBlock {
		format: format.to_string(),
		source: bedrock::ImageSource { bytes: payload.to_string() },
	}))
}

fn image_format(mime: &str) -> Result<&'static str, AIError> {
	match mime {
		"image/png" => Ok("png"),
		"image/jpeg" | "image/jpg" => Ok("jpeg"),
		"image/gif" => Ok("gif"),
		"image/webp" => Ok("webp"),
		other => Err(AIError::UnsupportedMediaType(other.to_string())),
	}
}

fn map_assistant_content(content: Option<&completions::AssistantContent>) -> Result<Vec<bedrock::ContentBlock>, AIError> {
	match content {
		None => Ok(vec![]),
		Some(completions::AssistantContent::Text(s)) => Ok(vec![bedrock::ContentBlock::Text(s.clone())]),
		Some(completions::AssistantContent::Block(part)) => Ok(vec![map_assistant_part(part)?]),
		Some(completions::AssistantContent::Parts(parts)) => parts.iter().map(map_assistant_part).collect(),
	}
}

fn map_assistant_part(part: &completions::AssistantPart) -> Result<bedrock::ContentBlock, AIError> {
	Ok(match part {
		completions::AssistantPart::Text { text } => bedrock::ContentBlock::Text(text.clone()),
		completions::AssistantPart::Thinking { thinking, signature } => {
			bedrock::ContentBlock::ReasoningContent(bedrock::ReasoningContentBlock::Structured {
				reasoning_text: bedrock::ReasoningText { text: thinking.clone(), signature: signature.clone() },
			})
		},
		completions::AssistantPart::RedactedThinking { data } => {
			let decoded = base64::engine::general_purpose::STANDARD.decode(data).map_err(|_| AIError::MalformedDataUri)?;
			bedrock::ContentBlock::ReasoningContent(bedrock::ReasoningContentBlock::Redacted { redacted_content: Bytes::from(decoded) })
		},
		completions::AssistantPart::Refusal { refusal } => bedrock::ContentBlock::Text(refusal.clone()),
	})
}

fn map_tool_result_content(content: &completions::StringOrParts<completions::TextPart>) -> Vec<bedrock::ToolResultContentBlock> {
	match content {
		completions::StringOrParts::Text(s) => vec![bedrock::ToolResultContentBlock::Text(s.clone())],
		completions::StringOrParts::Parts(parts) => parts.iter().map(|p| bedrock::ToolResultContentBlock::Text(p.text.clone())).collect(),
	}
}

fn map_tools(parsed: &completions::Request, model_id: &str) -> Result<Option<bedrock::ToolConfiguration>, AIError> {
	let Some(tools) = &parsed.tools else { return Ok(None) };
	let tools = tools
		.iter()
		.map(|t| bedrock::Tool {
			tool_spec: bedrock::ToolSpecification {
				name: t.function.name.clone(),
				description: t.function.description.clone(),
				input_schema: t.function.parameters.clone().map(bedrock::ToolInputSchema::Json),
			},
		})
		.collect();
	let tool_choice = map_tool_choice(parsed.tool_choice.as_ref(), model_id)?;
	Ok(Some(bedrock::ToolConfiguration { tools, tool_choice }))
}

fn map_tool_choice(choice: Option<&completions::ToolChoiceOption>, model_id: &str) -> Result<Option<bedrock::ToolChoice>, AIError> {
	let is_claude = model_id.contains("anthropic") && model_id.contains("claude");
	match choice {
		None => Ok(None),
		Some(completions::ToolChoiceOption::Mode(mode)) => {
			if !is_claude {
				return Err(AIError::UnsupportedToolChoice(format!(
					"{mode:?} tool_choice is only supported for Anthropic Claude models on Bedrock"
				)));
			}
			match mode {
				completions::ToolChoiceMode::Auto => Ok(Some(bedrock::ToolChoice::Auto)),
				completions::ToolChoiceMode::Required => Ok(Some(bedrock::ToolChoice::Any)),
				completions::ToolChoiceMode::None => Ok(None),
			}
		},
		Some(completions::ToolChoiceOption::Function(named)) => Ok(Some(bedrock::ToolChoice::Tool { name: named.function.name.clone() })),
	}
}

#[cfg(test)]
mod tests {
	use agent_core::strng;

	use super::*;

	fn sample_request(messages: Vec<completions::Message>) -> completions::Request {
		completions::Request {
			model: "anthropic.claude-3-5-sonnet".to_string(),
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

	#[test]
	fn s1_arn_path_escapes_slash() {
		let provider = providers::bedrock::Provider { model: None, region: strng::literal!("us-east-1") };
		let mut t = Translator::new(
			provider,
			strng::literal!("arn:aws:bedrock:us-east-1:123456789012:inference-profile/us.anthropic.claude-3-5-sonnet-20241022-v2:0"),
		);
		let req = sample_request(vec![]);
		let (headers, _) = t.request_body(b"{}", &req, false).unwrap();
		let path = headers.unwrap().set.into_iter().find(|(k, _)| k == ":path").unwrap().1;
		assert_eq!(
			path,
			"/model/arn:aws:bedrock:us-east-1:123456789012:inference-profile%2Fus.anthropic.claude-3-5-sonnet-20241022-v2:0/converse"
		);
	}

	#[test]
	fn tool_messages_coalesce_into_one_user_message() {
		let req = sample_request(vec![
			completions::Message::Assistant { content: None, tool_calls: None },
			completions::Message::Tool { tool_call_id: "a".into(), content: completions::StringOrParts::Text("1".into()) },
			completions::Message::Tool { tool_call_id: "b".into(), content: completions::StringOrParts::Text("2".into()) },
		]);
		let converse = map_request(&req, "anthropic.claude-3-5-sonnet").unwrap();
		assert_eq!(converse.messages.len(), 2);
		let bedrock::Message { role, content } = &converse.messages[1];
		assert!(matches!(role, bedrock::Role::User));
		assert_eq!(content.len(), 2);
	}

	#[test]
	fn s4_reasoning_round_trip() {
		let resp = bedrock::ConverseResponse {
			output: Some(bedrock::ConverseOutput::Message(bedrock::Message {
				role: bedrock::Role::Assistant,
				content: vec![
					bedrock::ContentBlock::ReasoningContent(bedrock::ReasoningContentBlock::Structured {
						reasoning_text: bedrock::ReasoningText { text: "Let me think".to_string(), signature: None },
					}),
					bedrock::ContentBlock::Text("Answer".to_string()),
				],
			})),
			stop_reason: bedrock::StopReason::EndTurn,
			usage: None,
		};
		let body = serde_json::to_vec(&resp).unwrap();
		let mut t = Translator::new(
			providers::bedrock::Provider { model: None, region: strng::literal!("us-east-1") },
			strng::literal!("anthropic.claude-3-5-sonnet"),
		);
		let (_, body_mut, _, _) = t.response_body_unary(&body, None).unwrap();
		let out: completions::Response = serde_json::from_slice(&body_mut.unwrap().body).unwrap();
		assert_eq!(out.choices[0].message.content.as_deref(), Some("Answer"));
		assert_eq!(out.choices[0].message.reasoning_content.as_ref().unwrap().text.as_deref(), Some("Let me think"));
	}

	#[test]
	fn bare_tool_choice_rejected_for_non_claude_models() {
		let err =
			map_tool_choice(Some(&completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Auto)), "amazon.titan-text").unwrap_err();
		assert!(matches!(err, AIError::UnsupportedToolChoice(_)));
	}

	#[test]
	fn bare_tool_choice_accepted_for_claude_models() {
		let choice = map_tool_choice(
			Some(&completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Required)),
			"anthropic.claude-3-5-sonnet",
		)
		.unwrap();
		assert!(matches!(choice, Some(bedrock::ToolChoice::Any)));
	}

	#[rstest::rstest]
	#[case(bedrock::StopReason::EndTurn, completions::FinishReason::Stop)]
	#[case(bedrock::StopReason::StopSequence, completions::FinishReason::Stop)]
	#[case(bedrock::StopReason::MaxTokens, completions::FinishReason::Length)]
	#[case(bedrock::StopReason::ContentFiltered, completions::FinishReason::ContentFilter)]
	#[case(bedrock::StopReason::ToolUse, completions::FinishReason::ToolCalls)]
	fn stop_reason_mapping(#[case] reason: bedrock::StopReason, #[case] expected: completions::FinishReason) {
		assert_eq!(map_stop_reason(reason), expected);
	}
}
