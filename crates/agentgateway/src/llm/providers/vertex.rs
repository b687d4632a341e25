use agent_core::strng;
use agent_core::strng::Strng;
use serde_json::{Map, Value};

use crate::llm::AIError;

pub const ANTHROPIC_VERSION: &str = "vertex-2023-10-16";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<Strng>,
	pub project_id: Strng,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("gcp.vertex_ai");
}

impl Provider {
	fn configured_model<'a>(&'a self, request_model: Option<&'a str>) -> Option<&'a str> {
		self.model.as_deref().or(request_model)
	}

	/// Vertex hosts both Gemini and partner (Anthropic) models behind the same
	/// project/region; the model id prefix is what tells us which wire
	/// protocol to speak.
	pub fn anthropic_model<'a>(&'a self, request_model: Option<&'a str>) -> Option<Strng> {
		let model = self.configured_model(request_model)?;
		model
			.strip_prefix("publishers/anthropic/models/")
			.or_else(|| model.strip_prefix("anthropic/"))
			.map(strng::new)
	}

	pub fn is_anthropic_model(&self, request_model: Option<&str>) -> bool {
		self.anthropic_model(request_model).is_some()
	}

	/// The rawPredict body is the Anthropic Messages request with
	/// `anthropic_version` injected and `model` stripped (it lives in the path).
	pub fn prepare_anthropic_request_body(&self, body: &[u8]) -> Result<Vec<u8>, AIError> {
		let mut map: Map<String, Value> =
			serde_json::from_slice(body).map_err(AIError::RequestUnmarshal)?;
		map.insert(
			"anthropic_version".to_string(),
			Value::String(ANTHROPIC_VERSION.to_string()),
		);
		map.remove("model");
		serde_json::to_vec(&map).map_err(AIError::RequestMarshal)
	}

	fn location(&self) -> Strng {
		self.region.clone().unwrap_or_else(|| strng::literal!("global"))
	}

	pub fn get_path_for_model(&self, request_model: Option<&str>, streaming: bool) -> Strng {
		let location = self.location();
		if let Some(model) = self.anthropic_model(request_model) {
			return strng::format!(
				"/v1/projects/{}/locations/{}/publishers/anthropic/models/{}:{}",
				self.project_id,
				location,
				model,
				if streaming { "streamRawPredict" } else { "rawPredict" }
			);
		}

		let model = self.configured_model(request_model).unwrap_or_default();
		strng::format!(
			"/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
			self.project_id,
			location,
			model,
			if streaming {
				"streamGenerateContent"
			} else {
				"generateContent"
			}
		)
	}

	pub fn get_host(&self) -> Strng {
		match &self.region {
			None => strng::literal!("aiplatform.googleapis.com"),
			Some(region) => strng::format!("{region}-aiplatform.googleapis.com"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_anthropic_model_prefix() {
		let p = Provider {
			model: Some(strng::literal!("publishers/anthropic/models/claude-3-opus")),
			region: None,
			project_id: strng::literal!("my-project"),
		};
		assert!(p.is_anthropic_model(None));
		assert_eq!(
			p.get_path_for_model(None, false),
			"/v1/projects/my-project/locations/global/publishers/anthropic/models/claude-3-opus:rawPredict"
		);
	}

	#[test]
	fn gemini_model_uses_generate_content() {
		let p = Provider {
			model: Some(strng::literal!("gemini-1.5-pro")),
			region: Some(strng::literal!("us-central1")),
			project_id: strng::literal!("my-project"),
		};
		assert!(!p.is_anthropic_model(None));
		assert_eq!(
			p.get_path_for_model(None, true),
			"/v1/projects/my-project/locations/us-central1/publishers/google/models/gemini-1.5-pro:streamGenerateContent"
		);
	}
}
