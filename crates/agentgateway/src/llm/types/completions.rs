//! The canonical, OpenAI-compatible chat/completions schema. Every provider
//! translator converts to and from this shape; it is never sent on the wire
//! to a backend directly (OpenAI/Azure passthrough rewrites the raw client
//! bytes in place instead of round-tripping through these types — see
//! `conversion::completions`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	Developer,
	User,
	Assistant,
	Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrParts<T> {
	Text(String),
	Parts(Vec<T>),
}

impl<T> StringOrParts<T> {
	pub fn as_text(&self) -> Option<&str> {
		match self {
			StringOrParts::Text(s) => Some(s),
			StringOrParts::Parts(_) => None,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPart {
	pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserPart {
	Text {
		text: String,
	},
	ImageUrl {
		image_url: ImageUrl,
	},
	InputAudio {
		#[serde(default)]
		input_audio: serde_json::Value,
	},
	File {
		#[serde(default)]
		file: serde_json::Value,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantPart {
	Text {
		text: String,
	},
	Thinking {
		thinking: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		signature: Option<String>,
	},
	RedactedThinking {
		data: String,
	},
	Refusal {
		refusal: String,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssistantContent {
	Text(String),
	Block(AssistantPart),
	Parts(Vec<AssistantPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
	System {
		content: StringOrParts<TextPart>,
	},
	Developer {
		content: StringOrParts<TextPart>,
	},
	User {
		content: StringOrParts<UserPart>,
	},
	Assistant {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		content: Option<AssistantContent>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		tool_calls: Option<Vec<ToolCall>>,
	},
	Tool {
		tool_call_id: String,
		content: StringOrParts<TextPart>,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionType {
	Function,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
	pub name: String,
	/// Always a JSON-encoded string in the canonical view (spec invariant);
	/// never a native object.
	pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
	pub id: String,
	#[serde(rename = "type")]
	pub r#type: FunctionType,
	pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parameters: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub strict: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
	#[serde(rename = "type")]
	pub r#type: FunctionType,
	pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoiceMode {
	Auto,
	Required,
	None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedFunction {
	pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedToolChoice {
	#[serde(rename = "type")]
	pub r#type: FunctionType,
	pub function: NamedFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoiceOption {
	Mode(ToolChoiceMode),
	Function(NamedToolChoice),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequence {
	Single(String),
	Multiple(Vec<String>),
}

impl StopSequence {
	pub fn into_vec(self) -> Vec<String> {
		match self {
			StopSequence::Single(s) => vec![s],
			StopSequence::Multiple(v) => v,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingType {
	Enabled,
	Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingConfig {
	#[serde(rename = "type")]
	pub r#type: ThinkingType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub budget_tokens: Option<u32>,
}

impl ThinkingConfig {
	pub fn enabled(&self) -> bool {
		matches!(self.r#type, ThinkingType::Enabled)
	}
}

/// The canonical chat/completions request (spec §3). Vendor-specific fields
/// (Anthropic thinking, GCP Vertex guided decoding) are carried as ordinary
/// optional fields rather than a separate nested bag, since this type is
/// never itself round-tripped byte-for-byte to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	pub model: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stream: Option<bool>,
	pub messages: Vec<Message>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<Tool>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<ToolChoiceOption>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parallel_tool_calls: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_k: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_completion_tokens: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stop: Option<StopSequence>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thinking: Option<ThinkingConfig>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub guided_choice: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub guided_regex: Option<String>,
}

impl Request {
	/// `max_completion_tokens` supersedes the deprecated `max_tokens` field.
	pub fn effective_max_tokens(&self) -> Option<u32> {
		self.max_completion_tokens.or(self.max_tokens)
	}

	pub fn stop_sequences(&self) -> Vec<String> {
		self.stop.clone().map(StopSequence::into_vec).unwrap_or_default()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
	Stop,
	Length,
	ToolCalls,
	ContentFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptTokensDetails {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cached_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionTokensDetails {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoning_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
	pub prompt_tokens: u32,
	pub completion_tokens: u32,
	pub total_tokens: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prompt_tokens_details: Option<PromptTokensDetails>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub completion_tokens_details: Option<CompletionTokensDetails>,
}

/// The provider that produced a `reasoning_content` block, so clients can
/// tell apart the two distinct shapes this crate emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningProvider {
	AwsBedrock,
	VertexAnthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningContent {
	pub provider: ReasoningProvider,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redacted_content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
	pub role: Role,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<ToolCall>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoning_content: Option<ReasoningContent>,
	/// Gemini's per-candidate safety ratings, passed through verbatim when the
	/// backend reports them (spec §4.4). Absent for every other backend.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub safety_ratings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
	pub index: u32,
	pub message: ResponseMessage,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logprobs: Option<serde_json::Value>,
	pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: String,
	pub object: String,
	pub created: u32,
	pub model: String,
	pub choices: Vec<ChatChoice>,
	pub usage: Usage,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub system_fingerprint: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_tier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamResponseDelta {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<Role>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<ChatCompletionMessageToolCallChunk>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoning_content: Option<ReasoningContent>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub safety_ratings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallStream {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub arguments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionMessageToolCallChunk {
	pub index: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub r#type: Option<FunctionType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub function: Option<FunctionCallStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoiceStream {
	pub index: u32,
	pub delta: StreamResponseDelta,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logprobs: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamResponse {
	pub id: String,
	pub object: String,
	pub created: u32,
	pub model: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub system_fingerprint: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_tier: Option<String>,
	pub choices: Vec<ChatChoiceStream>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn message_role_tag_round_trips() {
		let m: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
		assert_matches::assert_matches!(m, Message::User { content: StringOrParts::Text(s) } if s == "hi");
	}

	#[test]
	fn tool_choice_mode_is_untagged_string() {
		let t: ToolChoiceOption = serde_json::from_str(r#""auto""#).unwrap();
		assert_matches::assert_matches!(t, ToolChoiceOption::Mode(ToolChoiceMode::Auto));
	}

	#[test]
	fn stop_sequence_normalizes_single_to_vec() {
		let s: StopSequence = serde_json::from_str(r#""STOP""#).unwrap();
		assert_eq!(s.into_vec(), vec!["STOP".to_string()]);
	}
}
