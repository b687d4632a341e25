pub mod json;
pub mod llm;
pub mod parse;

#[cfg(feature = "schema")]
pub use schemars::JsonSchema;

pub use macro_rules_attribute::apply;

/// Bundles the derives every small wire/config struct in this crate needs:
/// `Debug + Clone + Serialize + Deserialize` plus an optional `JsonSchema`
/// derive gated behind the `schema` feature.
#[macro_export]
macro_rules! __schema_attr {
	($(#[$meta:meta])* $vis:vis struct $name:ident $($rest:tt)*) => {
		#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
		#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
		$(#[$meta])*
		$vis struct $name $($rest)*
	};
	($(#[$meta:meta])* $vis:vis enum $name:ident $($rest:tt)*) => {
		#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
		#[serde(rename_all = "snake_case")]
		#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
		$(#[$meta])*
		$vis enum $name $($rest)*
	};
}
pub use __schema_attr as schema;

/// Like `schema!`, but for types that are only ever produced, never parsed
/// back in (no `Deserialize`).
#[macro_export]
macro_rules! __schema_ser_attr {
	($(#[$meta:meta])* $vis:vis struct $name:ident $($rest:tt)*) => {
		#[derive(Debug, Clone, serde::Serialize)]
		#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
		$(#[$meta])*
		$vis struct $name $($rest)*
	};
}
pub use __schema_ser_attr as schema_ser;
