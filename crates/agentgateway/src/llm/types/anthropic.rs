//! Wire types for the Anthropic Messages API, used by the Vertex AI Anthropic
//! (`rawPredict` / `streamRawPredict`) translator per spec §4.5. Vertex wraps
//! this exact shape, adding a top-level `anthropic_version` and dropping `model`
//! (see `llm::providers::vertex::prepare_anthropic_request_body`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Copy, Clone, Deserialize, Serialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	#[default]
	User,
	Assistant,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct ContentTextBlock {
	pub text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_control: Option<CacheControlEphemeral>,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct ContentImageBlock {
	pub source: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_control: Option<CacheControlEphemeral>,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct ContentDocumentBlock {
	pub source: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_control: Option<CacheControlEphemeral>,
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ContentBlock {
	Text(ContentTextBlock),
	Image(ContentImageBlock),
	Document(ContentDocumentBlock),
	Thinking {
		thinking: String,
		signature: String,
	},
	RedactedThinking {
		data: String,
	},
	ToolUse {
		id: String,
		name: String,
		input: serde_json::Value,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		cache_control: Option<CacheControlEphemeral>,
	},
	ToolResult {
		tool_use_id: String,
		content: ToolResultContent,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		cache_control: Option<CacheControlEphemeral>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		is_error: Option<bool>,
	},
	// There are lots of other possible server-side-tool variants; since we
	// don't translate them, accept and round-trip without failing.
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ToolResultContent {
	Text(String),
	Array(Vec<ToolResultContentPart>),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultContentPart {
	Text {
		text: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		cache_control: Option<CacheControlEphemeral>,
	},
	Image {
		source: Value,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		cache_control: Option<CacheControlEphemeral>,
	},
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CacheControlEphemeral {
	Ephemeral {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		ttl: Option<String>,
	},
}

#[derive(Clone, Deserialize, Serialize, Debug)]
#[serde(rename_all = "snake_case")]
pub struct Message {
	pub role: Role,
	#[serde(deserialize_with = "deserialize_content")]
	pub content: Vec<ContentBlock>,
}

fn deserialize_content<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
	D: Deserializer<'de>,
{
	use serde::de::Error;

	let value = Value::deserialize(deserializer)?;
	match value {
		Value::String(text) => Ok(vec![ContentBlock::Text(ContentTextBlock {
			text,
			cache_control: None,
		})]),
		Value::Array(_) => Vec::<ContentBlock>::deserialize(value).map_err(D::Error::custom),
		_ => Err(D::Error::custom("content must be either a string or an array")),
	}
}

/// System prompt — a simple string or an array of content blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
	Text(String),
	Blocks(Vec<SystemContentBlock>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemContentBlock {
	Text {
		text: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		cache_control: Option<CacheControlEphemeral>,
	},
}

#[derive(Clone, Serialize, Deserialize, Debug, Eq, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ThinkingInput {
	Enabled { budget_tokens: u64 },
	Disabled {},
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub struct Request {
	pub messages: Vec<Message>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub system: Option<SystemPrompt>,
	pub model: String,
	pub max_tokens: usize,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub stop_sequences: Vec<String>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub stream: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_k: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<Tool>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<ToolChoice>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thinking: Option<ThinkingInput>,
}

/// Response body for the Messages API.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessagesResponse {
	pub id: String,
	pub r#type: String,
	pub role: Role,
	pub content: Vec<ContentBlock>,
	pub model: String,
	#[serde(default)]
	pub stop_reason: Option<StopReason>,
	#[serde(default)]
	pub stop_sequence: Option<String>,
	pub usage: Usage,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MessagesStreamEvent {
	MessageStart {
		message: MessagesResponse,
	},
	ContentBlockStart {
		index: usize,
		content_block: ContentBlock,
	},
	ContentBlockDelta {
		index: usize,
		delta: ContentBlockDelta,
	},
	ContentBlockStop {
		index: usize,
	},
	MessageDelta {
		delta: MessageDelta,
		usage: MessageDeltaUsage,
	},
	MessageStop,
	Ping,
	Error {
		error: MessagesError,
	},
}

impl MessagesStreamEvent {
	pub fn event_name(&self) -> &'static str {
		match self {
			Self::MessageStart { .. } => "message_start",
			Self::ContentBlockStart { .. } => "content_block_start",
			Self::ContentBlockDelta { .. } => "content_block_delta",
			Self::ContentBlockStop { .. } => "content_block_stop",
			Self::MessageDelta { .. } => "message_delta",
			Self::MessageStop => "message_stop",
			Self::Ping => "ping",
			Self::Error { .. } => "error",
		}
	}
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
#[allow(clippy::enum_variant_names)]
pub enum ContentBlockDelta {
	TextDelta { text: String },
	InputJsonDelta { partial_json: String },
	ThinkingDelta { thinking: String },
	SignatureDelta { signature: String },
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct MessageDeltaUsage {
	pub output_tokens: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub input_tokens: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_read_input_tokens: Option<usize>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct MessageDelta {
	#[serde(default)]
	pub stop_reason: Option<StopReason>,
	#[serde(default)]
	pub stop_sequence: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MessagesErrorResponse {
	pub r#type: String,
	pub error: MessagesError,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MessagesError {
	pub r#type: String,
	pub message: String,
}

/// Reason Anthropic stopped generating.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	EndTurn,
	MaxTokens,
	StopSequence,
	ToolUse,
	Refusal,
	PauseTurn,
	ModelContextWindowExceeded,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
	pub input_tokens: usize,
	pub output_tokens: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_read_input_tokens: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Tool {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub input_schema: serde_json::Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_control: Option<CacheControlEphemeral>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolChoice {
	#[serde(rename = "auto")]
	Auto {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		disable_parallel_tool_use: Option<bool>,
	},
	#[serde(rename = "any")]
	Any {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		disable_parallel_tool_use: Option<bool>,
	},
	#[serde(rename = "tool")]
	Tool {
		name: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		disable_parallel_tool_use: Option<bool>,
	},
	#[serde(rename = "none")]
	None,
}
