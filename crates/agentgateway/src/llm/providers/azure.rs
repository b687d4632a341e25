use agent_core::strng;
use agent_core::strng::Strng;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Provider {
	/// Azure OpenAI deployment name; overrides the request's `model` field.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
	pub host: Strng,
	/// Defaults to "v1" (the unversioned `/openai/v1/...` surface).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_version: Option<Strng>,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("azure.openai");
}

impl Provider {
	pub fn get_path_for_model(&self, model: &str) -> Strng {
		match self.api_version() {
			"v1" => strng::literal!("/openai/v1/chat/completions"),
			"preview" => strng::literal!("/openai/v1/chat/completions?api-version=preview"),
			version => {
				let model = self.model.as_deref().unwrap_or(model);
				strng::format!("/openai/deployments/{model}/chat/completions?api-version={version}")
			},
		}
	}

	pub fn get_host(&self) -> Strng {
		self.host.clone()
	}

	fn api_version(&self) -> &str {
		self.api_version.as_deref().unwrap_or("v1")
	}
}
