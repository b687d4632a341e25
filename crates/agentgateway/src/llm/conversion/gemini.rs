//! Vertex AI Gemini `generateContent` / `streamGenerateContent` translator
//! (spec §4.4): canonical chat/completions to/from `GenerateContentRequest`/
//! `GenerateContentResponse`, and blank-line-delimited SSE streaming.

use std::collections::HashMap;

use agent_core::strng::Strng;
use itertools::Itertools;

use crate::json;
use crate::llm::types::{completions, gemini};
use crate::llm::{
	self, AIError, BodyMutation, HeaderMutation, RequestBodyResult, ResponseBodyResult, ResponseErrorResult, ResponseSpan,
	TokenUsage, error, providers,
};
use crate::parse::sse;

pub struct Translator {
	provider: providers::vertex::Provider,
	request_model: Strng,
	streaming: bool,
	buf: bytes::BytesMut,
	role_emitted: bool,
	response_model: Option<String>,
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
			role_emitted: false,
			response_model: None,
			latest_usage: None,
			stream_id: llm::synthetic_id("gemini"),
			created: llm::unix_timestamp(),
		}
	}

	pub fn request_body(&mut self, raw: &[u8], parsed: &completions::Request, _force_mutate: bool) -> RequestBodyResult {
		let _ = raw;
		self.streaming = parsed.stream.unwrap_or(false);

		let path = self.provider.get_path_for_model(Some(&self.request_model), self.streaming);
		let mut header_mut = HeaderMutation::new();
		header_mut.push(":path", path);

		let request = map_request(parsed)?;
		let body = serde_json::to_vec(&request).map_err(AIError::RequestMarshal)?;
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
		let mut out = Vec::new();
		for block in sse::drain_blocks(&mut self.buf) {
			let event = sse::parse_event_block(&block);
			if event.data.is_empty() {
				continue;
			}
			let partial: gemini::GenerateContentResponse =
				serde_json::from_str(&event.data).map_err(AIError::ResponseUnmarshal)?;
			if let Some(response_chunk) = self.translate_partial(partial)? {
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
		let model = self.response_model.clone().unwrap_or_else(|| self.request_model.to_string());
		let body_mut = if out.is_empty() { None } else { Some(BodyMutation::new(out)) };
		Ok((None, body_mut, self.latest_usage, Some(llm::new_strng(model))))
	}

	fn response_body_unary(&mut self, chunk: &[u8], span: Option<&dyn ResponseSpan>) -> ResponseBodyResult {
		let resp: gemini::GenerateContentResponse = serde_json::from_slice(chunk).map_err(AIError::ResponseUnmarshal)?;
		let candidate = resp.candidates.first();

		let mut content: Option<String> = None;
		let mut tool_calls = Vec::new();
		let mut safety_ratings = None;
		if let Some(c) = candidate {
			safety_ratings = c.safety_ratings.clone();
			if let Some(parts) = c.content.as_ref().map(|content| &content.parts) {
				for part in parts {
					match part {
						gemini::Part::Text { text } => {
							content.get_or_insert_with(String::new).push_str(text);
						},
						gemini::Part::FunctionCall { function_call } => {
							tool_calls.push(completions::ToolCall {
								id: llm::synthetic_id("call"),
								r#type: completions::FunctionType::Function,
								function: completions::FunctionCall {
									name: function_call.name.clone(),
									arguments: serde_json::to_string(&function_call.args).map_err(AIError::ResponseMarshal)?,
								},
							});
						},
						gemini::Part::FunctionResponse { .. } | gemini::Part::InlineData { .. } => {},
					}
				}
			}
		}

		let finish_reason = if !tool_calls.is_empty() {
			completions::FinishReason::ToolCalls
		} else {
			candidate
				.and_then(|c| c.finish_reason)
				.map(map_finish_reason)
				.unwrap_or(completions::FinishReason::Stop)
		};

		let usage = resp
			.usage_metadata
			.as_ref()
			.map(|u| TokenUsage {
				input_tokens: u.prompt_token_count,
				output_tokens: u.candidates_token_count,
				total_tokens: u.total_token_count,
				cached_input_tokens: u.cached_content_token_count.unwrap_or(0),
			})
			.unwrap_or_default();

		let model = resp.model_version.clone().unwrap_or_else(|| self.request_model.to_string());
		let message = completions::ResponseMessage {
			role: completions::Role::Assistant,
			content,
			tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
			reasoning_content: None,
			safety_ratings,
		};
		let response = completions::Response {
			id: llm::synthetic_id("gemini"),
			object: "chat.completion".to_string(),
			created: llm::unix_timestamp(),
			model: model.clone(),
			choices: vec![completions::ChatChoice { index: 0, message, logprobs: None, finish_reason }],
			usage: completions::Usage {
				prompt_tokens: usage.input_tokens,
				completion_tokens: usage.output_tokens,
				total_tokens: usage.total_tokens,
				prompt_tokens_details: resp
					.usage_metadata
					.as_ref()
					.and_then(|u| u.cached_content_token_count)
					.map(|cached_tokens| completions::PromptTokensDetails { cached_tokens: Some(cached_tokens) }),
				completion_tokens_details: resp
					.usage_metadata
					.as_ref()
					.and_then(|u| u.thoughts_token_count)
					.map(|reasoning_tokens| completions::CompletionTokensDetails { reasoning_tokens: Some(reasoning_tokens) }),
			},
			system_fingerprint: None,
			service_tier: None,
		};
		let body = serde_json::to_vec(&response).map_err(AIError::ResponseMarshal)?;
		if let Some(span) = span {
			span.record_response(&usage, &model);
			span.record_response_chunk(chunk);
		}
		Ok((None, Some(BodyMutation::new(body)), Some(usage), Some(llm::new_strng(model))))
	}

	fn translate_partial(&mut self, partial: gemini::GenerateContentResponse) -> Result<Option<completions::StreamResponse>, AIError> {
		let candidate = partial.candidates.into_iter().next();

		let mut delta_content: Option<String> = None;
		let mut tool_calls = Vec::new();
		let safety_ratings = candidate.as_ref().and_then(|c| c.safety_ratings.clone());
		if let Some(content) = candidate.as_ref().and_then(|c| c.content.as_ref()) {
			for part in &content.parts {
				match part {
					gemini::Part::Text { text } => {
						delta_content.get_or_insert_with(String::new).push_str(text);
					},
					gemini::Part::FunctionCall { function_call } => {
						tool_calls.push(completions::ChatCompletionMessageToolCallChunk {
							index: tool_calls.len() as u32,
							id: Some(llm::synthetic_id("call")),
							r#type: Some(completions::FunctionType::Function),
							function: Some(completions::FunctionCallStream {
								name: Some(function_call.name.clone()),
								arguments: Some(serde_json::to_string(&function_call.args).map_err(AIError::ResponseMarshal)?),
							}),
						});
					},
					gemini::Part::FunctionResponse { .. } | gemini::Part::InlineData { .. } => {},
				}
			}
		}

		if let Some(u) = &partial.usage_metadata {
			self.latest_usage = Some(TokenUsage {
				input_tokens: u.prompt_token_count,
				output_tokens: u.candidates_token_count,
				total_tokens: u.total_token_count,
				cached_input_tokens: u.cached_content_token_count.unwrap_or(0),
			});
		}
		if let Some(model_version) = &partial.model_version {
			self.response_model = Some(model_version.clone());
		}

		let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason).map(|fr| {
			if !tool_calls.is_empty() {
				completions::FinishReason::ToolCalls
			} else {
				map_finish_reason(fr)
			}
		});

		if delta_content.is_none() && tool_calls.is_empty() && finish_reason.is_none() && safety_ratings.is_none() {
			return Ok(None);
		}

		let role = if !self.role_emitted {
			self.role_emitted = true;
			Some(completions::Role::Assistant)
		} else {
			None
		};
		let delta = completions::StreamResponseDelta {
			role,
			content: delta_content,
			tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
			reasoning_content: None,
			safety_ratings,
		};
		Ok(Some(completions::StreamResponse {
			id: self.stream_id.clone(),
			object: "chat.completion.chunk".to_string(),
			created: self.created,
			model: self.response_model.clone().unwrap_or_else(|| self.request_model.to_string()),
			system_fingerprint: None,
			service_tier: None,
			choices: vec![completions::ChatChoiceStream { index: 0, delta, logprobs: None, finish_reason }],
			usage: None,
		}))
	}

	pub fn response_error(&mut self, headers: &http::HeaderMap, body: &[u8]) -> ResponseErrorResult {
		let code = llm::response_status(headers);
		let message = match serde_json::from_slice::<gemini::GeminiErrorEnvelope>(body) {
			Ok(env) => match env.error.details {
				Some(details) => format!("{} {details}", env.error.message),
				None => env.error.message,
			},
			Err(_) => String::from_utf8_lossy(body).to_string(),
		};
		let envelope = error::ErrorEnvelope::wrap_backend_error("VertexGemini", message, code);
		let bytes = envelope.to_vec().map_err(AIError::ResponseMarshal)?;
		let body_mut = BodyMutation::new(bytes);
		let header_mut = HeaderMutation::new().with_content_length(&body_mut);
		Ok((Some(header_mut), Some(body_mut)))
	}
}

fn map_finish_reason(reason: gemini::FinishReason) -> completions::FinishReason {
	match reason {
		gemini::FinishReason::Stop => completions::FinishReason::Stop,
		gemini::FinishReason::MaxTokens => completions::FinishReason::Length,
		gemini::FinishReason::Safety | gemini::FinishReason::Recitation => completions::FinishReason::ContentFilter,
		gemini::FinishReason::MalformedFunctionCall | gemini::FinishReason::Other => completions::FinishReason::Stop,
	}
}

fn map_request(parsed: &completions::Request) -> Result<gemini::GenerateContentRequest, AIError> {
	let (contents, system_instruction) = map_contents(parsed)?;

	let generation_config = build_generation_config(parsed);
	let tools = map_tools(parsed)?;
	let tool_config = map_tool_config(parsed.tool_choice.as_ref());

	Ok(gemini::GenerateContentRequest {
		contents,
		system_instruction,
		tools,
		tool_config,
		generation_config: Some(generation_config),
		safety_settings: None,
	})
}

fn map_contents(parsed: &completions::Request) -> Result<(Vec<gemini::Content>, Option<gemini::Content>), AIError> {
	let mut system_parts = Vec::new();
	let mut contents = Vec::new();
	let mut tool_names: HashMap<String, String> = HashMap::new();

	for message in &parsed.messages {
		match message {
			completions::Message::System { content } | completions::Message::Developer { content } => {
				for text in system_texts(content) {
					system_parts.push(gemini::Part::Text { text });
				}
			},
			completions::Message::User { content } => {
				contents.push(gemini::Content { role: Some(gemini::Role::User), parts: map_user_parts(content)? });
			},
			completions::Message::Assistant { content, tool_calls } => {
				let mut parts = map_assistant_parts(content.as_ref())?;
				if let Some(calls) = tool_calls {
					for call in calls {
						tool_names.insert(call.id.clone(), call.function.name.clone());
						let args: serde_json::Value =
							serde_json::from_str(&call.function.arguments).map_err(AIError::RequestUnmarshal)?;
						parts.push(gemini::Part::FunctionCall { function_call: gemini::FunctionCall { name: call.function.name.clone(), args } });
					}
				}
				contents.push(gemini::Content { role: Some(gemini::Role::Model), parts });
			},
			completions::Message::Tool { tool_call_id, content } => {
				let name = tool_names.get(tool_call_id).cloned().unwrap_or_default();
				let response = serde_json::json!({ "result": tool_result_text(content) });
				contents.push(gemini::Content {
					role: Some(gemini::Role::User),
					parts: vec![gemini::Part::FunctionResponse { function_response: gemini::FunctionResponse { name, response } }],
				});
			},
		}
	}

	let system_instruction = if system_parts.is_empty() {
		None
	} else {
		Some(gemini::Content { role: None, parts: system_parts })
	};
	Ok((contents, system_instruction))
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

fn map_user_parts(content: &completions::StringOrParts<completions::UserPart>) -> Result<Vec<gemini::Part>, AIError> {
	match content {
		completions::StringOrParts::Text(s) => Ok(vec![gemini::Part::Text { text: s.clone() }]),
		completions::StringOrParts::Parts(parts) => parts
			.iter()
			.map(|part| match part {
				completions::UserPart::Text { text } => Ok(gemini::Part::Text { text: text.clone() }),
				completions::UserPart::ImageUrl { image_url } => map_inline_data(&image_url.url),
				completions::UserPart::InputAudio { .. } => Err(AIError::UnsupportedContentPart("input_audio".to_string())),
				completions::UserPart::File { .. } => Err(AIError::UnsupportedContentPart("file".to_string())),
			})
			.collect(),
	}
}

fn map_inline_data(url: &str) -> Result<gemini::Part, AIError> {
	let (mime, payload) = llm::parse_data_uri(url)?;
	if !mime.starts_with("image/") {
		return Err(AIError::UnsupportedMediaType(mime.to_string()));
	}
	Ok(gemini::Part::InlineData { inline_data: gemini::Blob { mime_type: mime.to_string(), data: payload.to_string() } })
}

fn map_assistant_parts(content: Option<&completions::AssistantContent>) -> Result<Vec<gemini::Part>, AIError> {
	match content {
		None => Ok(vec![]),
		Some(completions::AssistantContent::Text(s)) => Ok(vec![gemini::Part::Text { text: s.clone() }]),
		Some(completions::AssistantContent::Block(part)) => Ok(vec![map_assistant_part(part)]),
		Some(completions::AssistantContent::Parts(parts)) => Ok(parts.iter().map(map_assistant_part).collect()),
	}
}

fn map_assistant_part(part: &completions::AssistantPart) -> gemini::Part {
	match part {
		completions::AssistantPart::Text { text } => gemini::Part::Text { text: text.clone() },
		completions::AssistantPart::Thinking { thinking, .. } => gemini::Part::Text { text: thinking.clone() },
		completions::AssistantPart::RedactedThinking { data } => gemini::Part::Text { text: data.clone() },
		completions::AssistantPart::Refusal { refusal } => gemini::Part::Text { text: refusal.clone() },
	}
}

fn build_generation_config(parsed: &completions::Request) -> gemini::GenerationConfig {
	let mut config = gemini::GenerationConfig {
		temperature: parsed.temperature,
		top_p: parsed.top_p,
		max_output_tokens: parsed.effective_max_tokens(),
		stop_sequences: parsed.stop_sequences(),
		thinking_config: parsed.thinking.as_ref().map(|t| {
			serde_json::json!({
				"includeThoughts": t.enabled(),
				"thinkingBudget": t.budget_tokens,
			})
		}),
		response_mime_type: None,
		response_schema: None,
	};

	if let Some(choices) = &parsed.guided_choice {
		config.response_mime_type = Some("text/x.enum".to_string());
		config.response_schema = Some(serde_json::json!({ "type": "STRING", "enum": choices }));
	} else if let Some(pattern) = &parsed.guided_regex {
		config.response_mime_type = Some("application/json".to_string());
		config.response_schema = Some(serde_json::json!({ "type": "STRING", "pattern": pattern }));
	}

	config
}

fn map_tools(parsed: &completions::Request) -> Result<Option<Vec<gemini::ToolDeclaration>>, AIError> {
	let Some(tools) = &parsed.tools else { return Ok(None) };
	let declarations = tools
		.iter()
		.map(|t| {
			let schema = t
				.function
				.parameters
				.clone()
				.unwrap_or_else(|| serde_json::json!({ "type": "object", "properties": {} }));
			let dereferenced = json::dereference(&schema)?;
			let projected = json::project_to_gemini(&dereferenced)?;
			Ok(gemini::FunctionDeclaration {
				name: t.function.name.clone(),
				description: t.function.description.clone(),
				parameters_json_schema: Some(projected),
			})
		})
		.collect::<Result<Vec<_>, AIError>>()?;
	Ok(Some(vec![gemini::ToolDeclaration { function_declarations: declarations }]))
}

fn map_tool_config(tool_choice: Option<&completions::ToolChoiceOption>) -> Option<gemini::ToolConfig> {
	let config = match tool_choice? {
		completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Auto) => {
			gemini::FunctionCallingConfig { mode: gemini::FunctionCallingMode::Auto, allowed_function_names: vec![] }
		},
		completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::Required) => {
			gemini::FunctionCallingConfig { mode: gemini::FunctionCallingMode::Any, allowed_function_names: vec![] }
		},
		completions::ToolChoiceOption::Mode(completions::ToolChoiceMode::None) => {
			gemini::FunctionCallingConfig { mode: gemini::FunctionCallingMode::None, allowed_function_names: vec![] }
		},
		completions::ToolChoiceOption::Function(named) => gemini::FunctionCallingConfig {
			mode: gemini::FunctionCallingMode::Any,
			allowed_function_names: vec![named.function.name.clone()],
		},
	};
	Some(gemini::ToolConfig { function_calling_config: config })
}

#[cfg(test)]
mod tests {
	use agent_core::strng;

	use super::*;

	fn sample_request(messages: Vec<completions::Message>) -> completions::Request {
		completions::Request {
			model: "gemini-1.5-pro".to_string(),
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
	fn s2_guided_choice_sets_enum_response_schema() {
		let mut req = sample_request(vec![]);
		req.guided_choice = Some(vec!["Positive".to_string(), "Negative".to_string()]);
		let config = build_generation_config(&req);
		assert_eq!(config.response_mime_type.as_deref(), Some("text/x.enum"));
		assert_eq!(
			config.response_schema.unwrap(),
			serde_json::json!({ "type": "STRING", "enum": ["Positive", "Negative"] })
		);
	}

	#[test]
	fn guided_regex_sets_pattern_response_schema() {
		let mut req = sample_request(vec![]);
		req.guided_regex = Some(r"\d+".to_string());
		let config = build_generation_config(&req);
		assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
		assert_eq!(config.response_schema.unwrap(), serde_json::json!({ "type": "STRING", "pattern": r"\d+" }));
	}

	#[test]
	fn s5_usage_metadata_maps_to_canonical_usage() {
		let body = serde_json::json!({
			"candidates": [{ "content": { "role": "model", "parts": [{ "text": "hi" }] }, "finishReason": "STOP" }],
			"usageMetadata": {
				"promptTokenCount": 10,
				"candidatesTokenCount": 15,
				"totalTokenCount": 25,
				"cachedContentTokenCount": 10,
				"thoughtsTokenCount": 10
			}
		});
		let mut t = Translator::new(
			providers::vertex::Provider { model: None, region: None, project_id: strng::literal!("proj") },
			strng::literal!("gemini-1.5-pro"),
		);
		let (_, body_mut, usage, _) = t.response_body_unary(&serde_json::to_vec(&body).unwrap(), None).unwrap();
		let usage = usage.unwrap();
		assert_eq!(usage.input_tokens, 10);
		assert_eq!(usage.output_tokens, 15);
		assert_eq!(usage.total_tokens, 25);
		assert_eq!(usage.cached_input_tokens, 10);

		let out: completions::Response = serde_json::from_slice(&body_mut.unwrap().body).unwrap();
		assert_eq!(out.usage.prompt_tokens_details.unwrap().cached_tokens, Some(10));
		assert_eq!(out.usage.completion_tokens_details.unwrap().reasoning_tokens, Some(10));
	}

	#[test]
	fn model_version_overrides_request_model() {
		let body = serde_json::json!({
			"candidates": [{ "content": { "role": "model", "parts": [{ "text": "hi" }] }, "finishReason": "STOP" }],
			"modelVersion": "gemini-1.5-pro-002"
		});
		let mut t = Translator::new(
			providers::vertex::Provider { model: None, region: None, project_id: strng::literal!("proj") },
			strng::literal!("gemini-1.5-pro"),
		);
		let (_, body_mut, _, model) = t.response_body_unary(&serde_json::to_vec(&body).unwrap(), None).unwrap();
		assert_eq!(model.unwrap(), "gemini-1.5-pro-002");
		let out: completions::Response = serde_json::from_slice(&body_mut.unwrap().body).unwrap();
		assert_eq!(out.model, "gemini-1.5-pro-002");
	}

	#[test]
	fn safety_ratings_surface_on_the_response_message() {
		let body = serde_json::json!({
			"candidates": [{
				"content": { "role": "model", "parts": [{ "text": "hi" }] },
				"finishReason": "STOP",
				"safetyRatings": [{ "category": "HARM_CATEGORY_HARASSMENT", "probability": "NEGLIGIBLE" }]
			}]
		});
		let mut t = Translator::new(
			providers::vertex::Provider { model: None, region: None, project_id: strng::literal!("proj") },
			strng::literal!("gemini-1.5-pro"),
		);
		let (_, body_mut, _, _) = t.response_body_unary(&serde_json::to_vec(&body).unwrap(), None).unwrap();
		let out: completions::Response = serde_json::from_slice(&body_mut.unwrap().body).unwrap();
		assert_eq!(
			out.choices[0].message.safety_ratings,
			Some(serde_json::json!([{ "category": "HARM_CATEGORY_HARASSMENT", "probability": "NEGLIGIBLE" }]))
		);
	}

	#[test]
	fn function_call_part_forces_tool_calls_finish_reason() {
		let body = serde_json::json!({
			"candidates": [{
				"content": { "role": "model", "parts": [{ "functionCall": { "name": "get_weather", "args": { "city": "NYC" } } }] },
				"finishReason": "STOP"
			}]
		});
		let mut t = Translator::new(
			providers::vertex::Provider { model: None, region: None, project_id: strng::literal!("proj") },
			strng::literal!("gemini-1.5-pro"),
		);
		let (_, body_mut, _, _) = t.response_body_unary(&serde_json::to_vec(&body).unwrap(), None).unwrap();
		let out: completions::Response = serde_json::from_slice(&body_mut.unwrap().body).unwrap();
		assert!(matches!(out.choices[0].finish_reason, completions::FinishReason::ToolCalls));
		assert_eq!(out.choices[0].message.tool_calls.as_ref().unwrap()[0].function.name, "get_weather");
	}

	#[test]
	fn tool_messages_resolve_function_name_from_prior_call() {
		let req = sample_request(vec![
			completions::Message::Assistant {
				content: None,
				tool_calls: Some(vec![completions::ToolCall {
					id: "call_1".to_string(),
					r#type: completions::FunctionType::Function,
					function: completions::FunctionCall { name: "get_weather".to_string(), arguments: "{}".to_string() },
				}]),
			},
			completions::Message::Tool { tool_call_id: "call_1".to_string(), content: completions::StringOrParts::Text("sunny".to_string()) },
		]);
		let (contents, _) = map_contents(&req).unwrap();
		let gemini::Part::FunctionResponse { function_response } = &contents[1].parts[0] else {
			panic!("expected function response part");
		};
		assert_eq!(function_response.name, "get_weather");
		assert_eq!(function_response.response, serde_json::json!({ "result": "sunny" }));
	}

	#[test]
	fn tools_are_dereferenced_and_projected() {
		let req = completions::Request {
			tools: Some(vec![completions::Tool {
				r#type: completions::FunctionType::Function,
				function: completions::FunctionDefinition {
					name: "lookup".to_string(),
					description: None,
					parameters: Some(serde_json::json!({
						"type": "object",
						"properties": { "id": { "$ref": "#/$defs/Id" } },
						"$defs": { "Id": { "type": "string" } }
					})),
					strict: None,
				},
			}]),
			..sample_request(vec![])
		};
		let tools = map_tools(&req).unwrap().unwrap();
		let schema = tools[0].function_declarations[0].parameters_json_schema.as_ref().unwrap();
		assert_eq!(schema["properties"]["id"]["type"], "string");
		assert!(schema.get("$defs").is_none());
	}
}
