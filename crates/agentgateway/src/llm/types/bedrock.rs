//! Wire types for the AWS Bedrock Converse API (unary `/converse` and
//! streaming `/converse-stream`), per spec §4.3.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Deserialize, Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Role {
	#[default]
	User,
	Assistant,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
	Text(String),
	Image(ImageBlock),
	ToolResult(ToolResultBlock),
	ToolUse(ToolUseBlock),
	ReasoningContent(ReasoningContentBlock),
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
	pub format: String,
	pub source: ImageSource,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
	pub bytes: String,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(untagged)]
pub enum ReasoningContentBlock {
	/// `{ "reasoningText": { "text": "...", "signature": "..." } }`
	Structured {
		#[serde(rename = "reasoningText")]
		reasoning_text: ReasoningText,
	},
	/// `{ "redactedContent": "<base64>" }`
	Redacted {
		#[serde(rename = "redactedContent")]
		redacted_content: Bytes,
	},
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningText {
	pub text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultBlock {
	/// The ID of the tool request that this is the result for.
	pub tool_use_id: String,
	pub content: Vec<ToolResultContentBlock>,
	/// Only supported on Anthropic Claude 3 models.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<ToolResultStatus>,
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ToolResultStatus {
	Error,
	Success,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseBlock {
	pub tool_use_id: String,
	pub name: String,
	pub input: serde_json::Value,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ToolResultContentBlock {
	Text(String),
	Image(ImageBlock),
	Json(serde_json::Value),
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SystemContentBlock {
	pub text: String,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Message {
	pub role: Role,
	pub content: Vec<ContentBlock>,
}

#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct InferenceConfiguration {
	#[serde(rename = "maxTokens", skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	#[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f32>,
	#[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
	pub top_k: Option<usize>,
	#[serde(rename = "stopSequences", skip_serializing_if = "Vec::is_empty")]
	pub stop_sequences: Vec<String>,
}

#[derive(Clone, Serialize, Debug, Default)]
pub struct ConverseRequest {
	#[serde(rename = "modelId")]
	pub model_id: String,
	pub messages: Vec<Message>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub system: Option<Vec<SystemContentBlock>>,
	#[serde(rename = "inferenceConfig", skip_serializing_if = "Option::is_none")]
	pub inference_config: Option<InferenceConfiguration>,
	#[serde(rename = "toolConfig", skip_serializing_if = "Option::is_none")]
	pub tool_config: Option<ToolConfiguration>,
	#[serde(
		rename = "additionalModelRequestFields",
		skip_serializing_if = "Option::is_none"
	)]
	pub additional_model_request_fields: Option<serde_json::Value>,
}

#[derive(Clone, Serialize, Debug)]
pub struct ToolConfiguration {
	pub tools: Vec<Tool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<ToolChoice>,
}

#[derive(Clone, std::fmt::Debug, ::serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
	#[serde(rename = "toolSpec")]
	pub tool_spec: ToolSpecification,
}

/// The actual response from the Bedrock Converse API (matches AWS SDK `ConverseOutput`).
#[derive(Debug, Deserialize, Clone)]
pub struct ConverseResponse {
	#[serde(default)]
	pub output: Option<ConverseOutput>,
	#[serde(rename = "stopReason")]
	pub stop_reason: StopReason,
	#[serde(default)]
	pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConverseErrorResponse {
	// Sometimes it's capitalized, sometimes it is not.
	#[serde(alias = "Message")]
	pub message: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub enum ConverseOutput {
	Message(Message),
	#[serde(other)]
	Unknown,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
	#[serde(rename = "inputTokens")]
	pub input_tokens: usize,
	#[serde(rename = "outputTokens")]
	pub output_tokens: usize,
	#[serde(rename = "totalTokens")]
	pub total_tokens: usize,
	#[serde(
		rename = "cacheReadInputTokens",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub cache_read_input_tokens: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	ContentFiltered,
	EndTurn,
	GuardrailIntervened,
	MaxTokens,
	ModelContextWindowExceeded,
	StopSequence,
	ToolUse,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolChoice {
	/// The model must request at least one tool (no text is generated).
	Any,
	/// The model automatically decides if a tool should be called.
	Auto,
	/// The model must request the specified tool. Anthropic Claude models only.
	Tool { name: String },
}

#[derive(Clone, std::fmt::Debug, ::serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpecification {
	pub name: String,
	pub description: Option<String>,
	pub input_schema: Option<ToolInputSchema>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolInputSchema {
	Json(serde_json::Value),
}

/// Not deserialized directly from JSON — see `ConverseStreamOutput::deserialize`,
/// which dispatches on the eventstream message's `:event-type` header.
#[derive(Clone, Debug)]
pub enum ConverseStreamOutput {
	ContentBlockDelta(ContentBlockDeltaEvent),
	ContentBlockStart(ContentBlockStartEvent),
	ContentBlockStop(ContentBlockStopEvent),
	MessageStart(MessageStartEvent),
	MessageStop(MessageStopEvent),
	Metadata(ConverseStreamMetadataEvent),
}

impl ConverseStreamOutput {
	pub fn deserialize(m: &crate::parse::aws_eventstream::Message) -> anyhow::Result<Self> {
		let get_header = |name: &str| -> Option<String> {
			m.headers()
				.iter()
				.find(|h| h.name().as_str() == name)
				.and_then(|h| h.value().as_string().ok())
				.map(|s| s.as_str().to_owned())
		};

		let message_type = get_header(":message-type");
		if message_type.as_deref() == Some("exception") {
			let exception_type = get_header(":exception-type").unwrap_or_else(|| "unknown".to_owned());
			let error_message = String::from_utf8_lossy(m.payload()).to_string();
			anyhow::bail!("{exception_type}: {error_message}");
		}

		let Some(event_type) = get_header(":event-type") else {
			anyhow::bail!("no event type header")
		};

		let payload = m.payload();
		Ok(match event_type.as_str() {
			"contentBlockDelta" => ConverseStreamOutput::ContentBlockDelta(serde_json::from_slice::<
				ContentBlockDeltaEvent,
			>(payload)?),
			"contentBlockStart" => ConverseStreamOutput::ContentBlockStart(serde_json::from_slice::<
				ContentBlockStartEvent,
			>(payload)?),
			"contentBlockStop" => ConverseStreamOutput::ContentBlockStop(serde_json::from_slice::<
				ContentBlockStopEvent,
			>(payload)?),
			"messageStart" => {
				ConverseStreamOutput::MessageStart(serde_json::from_slice::<MessageStartEvent>(payload)?)
			},
			"messageStop" => {
				ConverseStreamOutput::MessageStop(serde_json::from_slice::<MessageStopEvent>(payload)?)
			},
			"metadata" => ConverseStreamOutput::Metadata(serde_json::from_slice::<
				ConverseStreamMetadataEvent,
			>(payload)?),
			other => anyhow::bail!("unexpected event type: {other}"),
		})
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlockDeltaEvent {
	#[serde(default)]
	pub delta: Option<ContentBlockDelta>,
	pub content_block_index: i32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlockStartEvent {
	#[serde(default)]
	pub start: Option<ContentBlockStart>,
	pub content_block_index: i32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlockStopEvent {
	pub content_block_index: i32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStartEvent {
	pub role: Role,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStopEvent {
	pub stop_reason: StopReason,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseStreamMetadataEvent {
	#[serde(default)]
	pub usage: Option<TokenUsage>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlockDelta {
	ReasoningContent(ReasoningContentBlockDelta),
	Text(String),
	ToolUse(ToolUseBlockDelta),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseBlockDelta {
	pub input: String,
}

#[derive(Clone, Debug, Deserialize)]
pub enum ReasoningContentBlockDelta {
	#[serde(rename = "redactedContent")]
	RedactedContent(Bytes),
	#[serde(rename = "signature")]
	Signature(String),
	#[serde(rename = "text")]
	Text(String),
	#[non_exhaustive]
	Unknown,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlockStart {
	ToolUse(ToolUseBlockStart),
	ReasoningContent,
	Text,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseBlockStart {
	pub tool_use_id: String,
	pub name: String,
}
