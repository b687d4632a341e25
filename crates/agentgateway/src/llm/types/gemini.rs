//! Wire types for the Vertex AI Gemini `generateContent` / `streamGenerateContent`
//! API, per spec §4.4.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
	Text {
		text: String,
	},
	FunctionCall {
		#[serde(rename = "functionCall")]
		function_call: FunctionCall,
	},
	FunctionResponse {
		#[serde(rename = "functionResponse")]
		function_response: FunctionResponse,
	},
	InlineData {
		#[serde(rename = "inlineData")]
		inline_data: Blob,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
	#[serde(rename = "mimeType")]
	pub mime_type: String,
	pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
	pub name: String,
	#[serde(default)]
	pub args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
	pub name: String,
	pub response: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<Role>,
	#[serde(default)]
	pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	#[serde(rename = "topP", default, skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f32>,
	#[serde(rename = "maxOutputTokens", default, skip_serializing_if = "Option::is_none")]
	pub max_output_tokens: Option<u32>,
	#[serde(rename = "stopSequences", default, skip_serializing_if = "Vec::is_empty")]
	pub stop_sequences: Vec<String>,
	#[serde(rename = "thinkingConfig", default, skip_serializing_if = "Option::is_none")]
	pub thinking_config: Option<serde_json::Value>,
	#[serde(rename = "responseMimeType", default, skip_serializing_if = "Option::is_none")]
	pub response_mime_type: Option<String>,
	#[serde(rename = "responseSchema", default, skip_serializing_if = "Option::is_none")]
	pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(rename = "parametersJsonSchema", default, skip_serializing_if = "Option::is_none")]
	pub parameters_json_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
	#[serde(rename = "functionDeclarations")]
	pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionCallingMode {
	Auto,
	Any,
	None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallingConfig {
	pub mode: FunctionCallingMode,
	#[serde(rename = "allowedFunctionNames", default, skip_serializing_if = "Vec::is_empty")]
	pub allowed_function_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
	#[serde(rename = "functionCallingConfig")]
	pub function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentRequest {
	pub contents: Vec<Content>,
	#[serde(rename = "systemInstruction", default, skip_serializing_if = "Option::is_none")]
	pub system_instruction: Option<Content>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<ToolDeclaration>>,
	#[serde(rename = "toolConfig", default, skip_serializing_if = "Option::is_none")]
	pub tool_config: Option<ToolConfig>,
	#[serde(rename = "generationConfig", default, skip_serializing_if = "Option::is_none")]
	pub generation_config: Option<GenerationConfig>,
	#[serde(rename = "safetySettings", default, skip_serializing_if = "Option::is_none")]
	pub safety_settings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
	#[serde(rename = "STOP")]
	Stop,
	#[serde(rename = "MAX_TOKENS")]
	MaxTokens,
	#[serde(rename = "SAFETY")]
	Safety,
	#[serde(rename = "RECITATION")]
	Recitation,
	#[serde(rename = "MALFORMED_FUNCTION_CALL")]
	MalformedFunctionCall,
	#[serde(other)]
	Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
	#[serde(default)]
	pub content: Option<Content>,
	#[serde(rename = "finishReason", default)]
	pub finish_reason: Option<FinishReason>,
	#[serde(rename = "safetyRatings", default)]
	pub safety_ratings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageMetadata {
	#[serde(rename = "promptTokenCount", default)]
	pub prompt_token_count: u32,
	#[serde(rename = "candidatesTokenCount", default)]
	pub candidates_token_count: u32,
	#[serde(rename = "totalTokenCount", default)]
	pub total_token_count: u32,
	#[serde(rename = "cachedContentTokenCount", default)]
	pub cached_content_token_count: Option<u32>,
	#[serde(rename = "thoughtsTokenCount", default)]
	pub thoughts_token_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
	#[serde(default)]
	pub candidates: Vec<Candidate>,
	#[serde(rename = "usageMetadata", default)]
	pub usage_metadata: Option<UsageMetadata>,
	#[serde(rename = "modelVersion", default)]
	pub model_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorEnvelope {
	pub error: GeminiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiError {
	pub code: u32,
	pub message: String,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub details: Option<serde_json::Value>,
}
