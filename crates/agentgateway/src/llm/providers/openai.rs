use agent_core::strng;
use agent_core::strng::Strng;

pub const DEFAULT_HOST_STR: &str = "api.openai.com";
pub const DEFAULT_HOST: Strng = strng::literal!(DEFAULT_HOST_STR);
pub const PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Provider {
	/// Overrides the model named in the request body, if set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host: Option<Strng>,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("openai");
}

impl Provider {
	pub fn get_host(&self) -> Strng {
		self.host.clone().unwrap_or(DEFAULT_HOST)
	}

	pub fn get_path(&self) -> &'static str {
		PATH
	}
}
