//! JSON-Schema utilities (spec §4.6) and small serde_json helpers shared by
//! every provider translator: `$ref` dereferencing with cycle detection,
//! projection to the Gemini/Gapic schema subset, a generic value-level
//! conversion helper, and a byte-preserving top-level string field setter
//! used by the OpenAI/Azure passthrough translator (spec §4.2, §9).

use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
	#[error("empty $ref")]
	EmptyRef,
	#[error("$ref must start with '#/': {0}")]
	BadPrefix(String),
	#[error("$ref contains an empty path component: {0}")]
	EmptyRefComponent(String),
	#[error("$ref target not found: {0}")]
	MissingTarget(String),
	#[error("$ref traverses a non-object at: {0}")]
	NonObjectTraversal(String),
	#[error("circular reference detected: {0}")]
	CircularReference(String),
	#[error("disallowed field in Gemini schema: {0}")]
	DisallowedField(String),
	#[error("invalid shape for '{0}': {1}")]
	InvalidShape(String, String),
}

/// Keys pruned from dereferenced output — these are definition containers,
/// not schema constraints, and are meaningless once every `$ref` pointing
/// into them has been inlined.
const SKIP_LIST: &[&str] = &["components", "$defs", "definitions"];

/// Walk a JSON-Schema value, replacing every `$ref` string of the form
/// `#/a/b/c` with a deep copy of the referenced subtree under `root`,
/// recursively. Detects cycles and rejects malformed refs (spec §4.6, P7).
pub fn dereference(schema: &Value) -> Result<Value, SchemaError> {
	let root = schema.clone();
	let mut in_progress = HashSet::new();
	resolve(schema, &root, &mut in_progress)
}

fn resolve(node: &Value, root: &Value, in_progress: &mut HashSet<String>) -> Result<Value, SchemaError> {
	match node {
		Value::Object(map) => {
			if let Some(Value::String(r)) = map.get("$ref") {
				return resolve_ref(r, root, in_progress);
			}
			let mut out = Map::new();
			for (k, v) in map {
				if SKIP_LIST.contains(&k.as_str()) {
					continue;
				}
				out.insert(k.clone(), resolve(v, root, in_progress)?);
			}
			Ok(Value::Object(out))
		},
		Value::Array(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(resolve(item, root, in_progress)?);
			}
			Ok(Value::Array(out))
		},
		other => Ok(other.clone()),
	}
}

fn resolve_ref(r: &str, root: &Value, in_progress: &mut HashSet<String>) -> Result<Value, SchemaError> {
	if r.is_empty() {
		return Err(SchemaError::EmptyRef);
	}
	if !r.starts_with("#/") {
		return Err(SchemaError::BadPrefix(r.to_string()));
	}
	if in_progress.contains(r) {
		return Err(SchemaError::CircularReference(r.to_string()));
	}

	let mut cur = root;
	for part in r[2..].split('/') {
		if part.is_empty() {
			return Err(SchemaError::EmptyRefComponent(r.to_string()));
		}
		let part = unescape_pointer(part);
		match cur {
			Value::Object(map) => {
				cur = map
					.get(part.as_str())
					.ok_or_else(|| SchemaError::MissingTarget(r.to_string()))?;
			},
			_ => return Err(SchemaError::NonObjectTraversal(r.to_string())),
		}
	}

	in_progress.insert(r.to_string());
	let resolved = resolve(cur, root, in_progress);
	in_progress.remove(r);
	resolved
}

fn unescape_pointer(part: &str) -> String {
	part.replace("~1", "/").replace("~0", "~")
}

const GEMINI_ALLOWED_FIELDS: &[&str] = &[
	"type",
	"properties",
	"items",
	"required",
	"description",
	"enum",
	"format",
	"allOf",
	"anyOf",
	"minimum",
	"maximum",
	"minLength",
	"maxLength",
	"minItems",
	"maxItems",
	"pattern",
	"nullable",
	"$defs",
];

/// Project a dereferenced JSON-Schema subtree down to the keyword subset
/// Gemini's Gapic schema accepts (spec §4.6).
pub fn project_to_gemini(schema: &Value) -> Result<Value, SchemaError> {
	let Value::Object(map) = schema else {
		return Ok(schema.clone());
	};

	let mut out = Map::new();
	for (k, v) in map {
		if k == "$defs" {
			// definitions are meaningless post-dereference; silently skipped.
			continue;
		}
		if !GEMINI_ALLOWED_FIELDS.contains(&k.as_str()) {
			return Err(SchemaError::DisallowedField(k.clone()));
		}
		match k.as_str() {
			"type" => project_type(v, &mut out)?,
			"properties" => out.insert(k.clone(), project_properties(v)?).map(drop).unwrap_or(()),
			"items" => {
				let Value::Object(_) = v else {
					return Err(SchemaError::InvalidShape("items".into(), "must be an object".into()));
				};
				out.insert(k.clone(), project_to_gemini(v)?);
			},
			"allOf" => {
				let Value::Array(items) = v else {
					return Err(SchemaError::InvalidShape(
						"allOf".into(),
						"must be a non-empty single-element list".into(),
					));
				};
				if items.len() != 1 {
					return Err(SchemaError::InvalidShape(
						"allOf".into(),
						"must be a non-empty single-element list".into(),
					));
				}
				let merged = project_to_gemini(&items[0])?;
				if let Value::Object(merged_map) = merged {
					for (mk, mv) in merged_map {
						out.insert(mk, mv);
					}
				}
			},
			"anyOf" => {
				let Value::Array(items) = v else {
					return Err(SchemaError::InvalidShape(
						"anyOf".into(),
						"must be a non-empty list of objects".into(),
					));
				};
				if items.is_empty() {
					return Err(SchemaError::InvalidShape(
						"anyOf".into(),
						"must be a non-empty list of objects".into(),
					));
				}
				let mut projected = Vec::with_capacity(items.len());
				for item in items {
					if !item.is_object() {
						return Err(SchemaError::InvalidShape(
							"anyOf".into(),
							"must be a non-empty list of objects".into(),
						));
					}
					projected.push(project_to_gemini(item)?);
				}
				out.insert(k.clone(), Value::Array(projected));
			},
			_ => {
				out.insert(k.clone(), v.clone());
			},
		}
	}
	Ok(Value::Object(out))
}

fn project_type(v: &Value, out: &mut Map<String, Value>) -> Result<(), SchemaError> {
	match v {
		Value::String(_) => {
			out.insert("type".to_string(), v.clone());
			Ok(())
		},
		Value::Array(items) => {
			let non_null: Vec<&Value> = items.iter().filter(|i| i.as_str() != Some("null")).collect();
			let has_null = items.iter().any(|i| i.as_str() == Some("null"));
			if items.len() != 2 || non_null.len() != 1 || !has_null {
				return Err(SchemaError::InvalidShape(
					"type".into(),
					"list form must contain exactly one non-null type and \"null\"".into(),
				));
			}
			out.insert("type".to_string(), non_null[0].clone());
			out.insert("nullable".to_string(), Value::Bool(true));
			Ok(())
		},
		_ => Err(SchemaError::InvalidShape(
			"type".into(),
			"must be a string or a two-element list".into(),
		)),
	}
}

fn project_properties(v: &Value) -> Result<Value, SchemaError> {
	let Value::Object(props) = v else {
		return Err(SchemaError::InvalidShape(
			"properties".into(),
			"must be object-of-object".into(),
		));
	};
	let mut out = Map::new();
	for (name, prop) in props {
		if !prop.is_object() {
			return Err(SchemaError::InvalidShape(
				"properties".into(),
				"must be object-of-object".into(),
			));
		}
		out.insert(name.clone(), project_to_gemini(prop)?);
	}
	Ok(Value::Object(out))
}

/// Round-trip `a` through a `serde_json::Value` into a `B`. Used whenever a
/// translator needs the canonical model reshaped as a provider-specific
/// struct without hand-writing a field-by-field mapper for shape-compatible
/// pieces.
pub fn convert<A: Serialize, B: DeserializeOwned>(a: &A) -> serde_json::Result<B> {
	let v = serde_json::to_value(a)?;
	serde_json::from_value(v)
}

/// Rewrite a single top-level string field in a raw JSON byte buffer,
/// preserving every other byte exactly (whitespace, key order, nested
/// structures). Returns `None` if the field isn't present as a top-level
/// string value, in which case the caller should fall back to a full
/// re-serialization.
///
/// This is a straightforward hand-rolled scanner, not a full JSON parser: it
/// tracks brace/bracket nesting depth and string-literal state (including
/// escapes) just far enough to find the `"<field>":"<value>"` pair at depth 1.
pub fn set_top_level_string_field(raw: &[u8], field: &str, new_value: &str) -> Option<Vec<u8>> {
	let key_pattern = format!("\"{field}\"");
	let mut depth: i32 = 0;
	let mut in_string = false;
	let mut escape = false;
	let mut i = 0usize;

	while i < raw.len() {
		let b = raw[i];
		if in_string {
			if escape {
				escape = false;
			} else if b == b'\\' {
				escape = true;
			} else if b == b'"' {
				in_string = false;
			}
			i += 1;
			continue;
		}
		match b {
			b'"' => {
				if depth == 1 && raw[i..].starts_with(key_pattern.as_bytes()) {
					let key_end = i + key_pattern.len();
					// skip whitespace and the colon
					let mut j = key_end;
					while j < raw.len() && raw[j] != b':' {
						j += 1;
					}
					j += 1; // past ':'
					while j < raw.len() && raw[j].is_ascii_whitespace() {
						j += 1;
					}
					if j >= raw.len() || raw[j] != b'"' {
						// not a string value; give up on byte-stable rewrite
						return None;
					}
					let value_start = j + 1;
					let mut k = value_start;
					let mut esc = false;
					while k < raw.len() {
						if esc {
							esc = false;
						} else if raw[k] == b'\\' {
							esc = true;
						} else if raw[k] == b'"' {
							break;
						}
						k += 1;
					}
					let value_end = k; // index of closing quote
					let mut result = Vec::with_capacity(raw.len());
					result.extend_from_slice(&raw[..value_start]);
					result.extend_from_slice(escape_json_string(new_value).as_bytes());
					result.extend_from_slice(&raw[value_end..]);
					return Some(result);
				}
				in_string = true;
			},
			b'{' | b'[' => depth += 1,
			b'}' | b']' => depth -= 1,
			_ => {},
		}
		i += 1;
	}
	None
}

fn escape_json_string(s: &str) -> String {
	let Value::String(escaped) = Value::String(s.to_string()) else {
		unreachable!()
	};
	// serde_json's string serialization already produces a quoted, escaped literal.
	serde_json::to_string(&escaped).unwrap_or_else(|_| format!("\"{escaped}\""))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn dereference_resolves_nested_ref() {
		let schema = json!({
			"type": "object",
			"properties": { "a": { "$ref": "#/$defs/A" } },
			"$defs": { "A": { "type": "string" } }
		});
		let out = dereference(&schema).unwrap();
		assert_eq!(out["properties"]["a"]["type"], "string");
		assert!(out.get("$defs").is_none());
	}

	#[test]
	fn dereference_detects_cycle() {
		let schema = json!({
			"$defs": {
				"A": { "properties": { "b": { "$ref": "#/$defs/B" } } },
				"B": { "properties": { "a": { "$ref": "#/$defs/A" } } }
			},
			"$ref": "#/$defs/A"
		});
		let err = dereference(&schema).unwrap_err();
		assert!(matches!(err, SchemaError::CircularReference(_)));
	}

	#[test]
	fn dereference_rejects_bad_prefix() {
		let schema = json!({ "$ref": "A" });
		assert!(matches!(dereference(&schema), Err(SchemaError::BadPrefix(_))));
	}

	#[test]
	fn project_nullable_list_type() {
		let schema = json!({ "type": ["string", "null"] });
		let out = project_to_gemini(&schema).unwrap();
		assert_eq!(out["type"], "string");
		assert_eq!(out["nullable"], true);
	}

	#[test]
	fn project_rejects_disallowed_field() {
		let schema = json!({ "type": "string", "patternProperties": {} });
		assert!(project_to_gemini(&schema).is_err());
	}

	#[test]
	fn set_top_level_field_preserves_surrounding_bytes() {
		let raw = br#"{"model":"gpt-4","messages":[{"role":"user","content":"hi \"there\""}]}"#;
		let out = set_top_level_string_field(raw, "model", "gpt-4o").unwrap();
		assert_eq!(
			out,
			br#"{"model":"gpt-4o","messages":[{"role":"user","content":"hi \"there\""}]}"#.to_vec()
		);
	}

	#[test]
	fn set_top_level_field_ignores_nested_same_name_key() {
		let raw = br#"{"messages":[{"model":"nested"}],"model":"gpt-4"}"#;
		let out = set_top_level_string_field(raw, "model", "gpt-4o").unwrap();
		assert_eq!(out, br#"{"messages":[{"model":"nested"}],"model":"gpt-4o"}"#.to_vec());
	}
}
