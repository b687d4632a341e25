//! Error kinds surfaced by the translators (spec §7) and the canonical
//! `{type:"error", error:{type, message, code}}` envelope they render to.

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AIError {
	#[error("failed to parse request body: {0}")]
	RequestUnmarshal(#[source] serde_json::Error),
	#[error("failed to marshal request body: {0}")]
	RequestMarshal(#[source] serde_json::Error),
	#[error("failed to parse response body: {0}")]
	ResponseUnmarshal(#[source] serde_json::Error),
	#[error("failed to marshal response body: {0}")]
	ResponseMarshal(#[source] serde_json::Error),
	#[error("unknown message role: {0}")]
	UnknownRole(String),
	#[error("unsupported content part: {0}")]
	UnsupportedContentPart(String),
	#[error("unsupported tool_choice: {0}")]
	UnsupportedToolChoice(String),
	#[error("missing required parameter: {0}")]
	MissingParameter(&'static str),
	#[error("temperature {0} out of range: must satisfy 0 <= T <= 1")]
	TemperatureOutOfRange(f32),
	#[error("unsupported image media type: {0}")]
	UnsupportedMediaType(String),
	#[error("failed to dereference tool parameters: {0}")]
	SchemaDereference(#[from] crate::json::SchemaError),
	#[error("malformed data: URI")]
	MalformedDataUri,
	#[error("unknown stream event: {0}")]
	UnknownStreamEvent(String),
	#[error("stream payload type mismatch: {0}")]
	StreamPayloadMismatch(String),
	#[error("upstream eventstream framing error: {0}")]
	EventStreamFraming(String),
	#[error("upstream returned an error: {0}")]
	UpstreamError(String),
	#[error("{0}")]
	Other(String),
}

impl AIError {
	/// The `error.type` discriminator used in the canonical error envelope.
	pub fn error_type(&self) -> &'static str {
		match self {
			AIError::RequestUnmarshal(_) | AIError::ResponseUnmarshal(_) => "invalid_request_error",
			AIError::RequestMarshal(_) | AIError::ResponseMarshal(_) => "internal_error",
			AIError::UnknownRole(_)
			| AIError::UnsupportedContentPart(_)
			| AIError::UnsupportedToolChoice(_)
			| AIError::MissingParameter(_)
			| AIError::TemperatureOutOfRange(_)
			| AIError::UnsupportedMediaType(_)
			| AIError::MalformedDataUri => "invalid_request_error",
			AIError::SchemaDereference(_) => "schema_error",
			AIError::UnknownStreamEvent(_) | AIError::StreamPayloadMismatch(_) | AIError::EventStreamFraming(_) => {
				"stream_error"
			},
			AIError::UpstreamError(_) => "upstream_error",
			AIError::Other(_) => "internal_error",
		}
	}

	/// Render as the canonical error envelope (spec §7).
	pub fn to_envelope(&self, code: u16) -> ErrorEnvelope {
		ErrorEnvelope {
			r#type: "error",
			error: ErrorDetail {
				r#type: self.error_type().to_string(),
				message: self.to_string(),
				code,
			},
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
	pub r#type: &'static str,
	pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
	pub r#type: String,
	pub message: String,
	pub code: u16,
}

impl ErrorEnvelope {
	/// Wrap a raw non-JSON upstream error body with a provider-specific
	/// backend-error tag (spec §4.2, §7).
	pub fn wrap_backend_error(tag: &str, message: impl Into<String>, code: u16) -> ErrorEnvelope {
		ErrorEnvelope {
			r#type: "error",
			error: ErrorDetail {
				r#type: format!("{tag}BackendError"),
				message: message.into(),
				code,
			},
		}
	}

	pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn envelope_shape() {
		let err = AIError::MissingParameter("max_tokens");
		let env = err.to_envelope(400);
		let v = serde_json::to_value(&env).unwrap();
		assert_eq!(v["type"], "error");
		assert_eq!(v["error"]["code"], 400);
	}

	#[test]
	fn backend_error_wrap_tags_provider() {
		let env = ErrorEnvelope::wrap_backend_error("OpenAI", "boom", 502);
		assert_eq!(env.error.r#type, "OpenAIBackendError");
	}
}
