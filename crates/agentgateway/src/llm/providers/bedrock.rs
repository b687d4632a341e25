use agent_core::strng;
use agent_core::strng::Strng;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// RFC 3986 unreserved characters kept literal; everything else (including
/// `/`) is percent-encoded. Bedrock model IDs are sometimes full ARNs
/// (`arn:aws:bedrock:...:provisioned-model/abc123`), and the `/` in the
/// resource segment must become `%2F` or API Gateway splits it into an extra
/// path segment.
const MODEL_ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~')
	.remove(b':');

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
	pub region: Strng,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("aws.bedrock");
}

impl Provider {
	pub fn get_path(&self, streaming: bool, model: &str) -> String {
		let model = self.model.as_deref().unwrap_or(model);
		let encoded = utf8_percent_encode(model, MODEL_ID_ENCODE_SET);
		if streaming {
			format!("/model/{encoded}/converse-stream")
		} else {
			format!("/model/{encoded}/converse")
		}
	}

	pub fn get_host(&self) -> Strng {
		strng::format!("bedrock-runtime.{}.amazonaws.com", self.region)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escapes_slash_in_arn() {
		let p = Provider {
			model: None,
			region: strng::literal!("us-east-1"),
		};
		let path = p.get_path(false, "arn:aws:bedrock:us-east-1:111122223333:provisioned-model/abc123");
		assert_eq!(
			path,
			"/model/arn:aws:bedrock:us-east-1:111122223333:provisioned-model%2Fabc123/converse"
		);
	}

	#[test]
	fn streaming_route_uses_converse_stream() {
		let p = Provider {
			model: Some(strng::literal!("anthropic.claude-3-sonnet")),
			region: strng::literal!("us-west-2"),
		};
		assert_eq!(
			p.get_path(true, "ignored"),
			"/model/anthropic.claude-3-sonnet/converse-stream"
		);
	}
}
