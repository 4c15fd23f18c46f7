//! `version.json` reader.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::VersionMap;

/// Key used when a plain-text manifest is flattened into a [`VersionMap`].
pub const PLAIN_TEXT_KEY: &str = "content";

/// Outcome of reading a deployed manifest body.
///
/// Keeps "the endpoint did not return JSON" apart from "a service happens to
/// be called `content`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DeployedVersions {
    /// Body parsed as JSON; versions extracted per top-level key.
    Structured(VersionMap),
    /// Body was not JSON; trimmed raw text.
    PlainText(String),
}

impl DeployedVersions {
    /// Flattens the outcome into a map. Plain text becomes a single
    /// [`PLAIN_TEXT_KEY`] entry.
    pub fn into_version_map(self) -> VersionMap {
        match self {
            DeployedVersions::Structured(map) => map,
            DeployedVersions::PlainText(text) => {
                let mut map = VersionMap::new();
                map.insert(PLAIN_TEXT_KEY.to_string(), text);
                map
            }
        }
    }

    pub fn is_plain_text(&self) -> bool {
        matches!(self, DeployedVersions::PlainText(_))
    }
}

/// Parses a `version.json` body.
///
/// Top-level keys are lowercased. Per key:
/// - a string is stored as-is;
/// - an object with a `version` field stores that field;
/// - any other object contributes each sub-key containing `version`
///   (case-insensitive) with a string value as `"{key}_{subkey}"`.
///
/// JSON that is not an object yields an empty map.
pub fn parse_deployed(text: &str) -> DeployedVersions {
    let data: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "version manifest is not JSON, treating as plain text");
            return DeployedVersions::PlainText(text.trim().to_string());
        }
    };

    let mut versions = VersionMap::new();
    let Value::Object(entries) = data else {
        return DeployedVersions::Structured(versions);
    };

    for (key, value) in entries {
        let key = key.to_lowercase();
        match value {
            Value::String(version) => {
                versions.insert(key, version);
            }
            Value::Object(inner) if inner.contains_key("version") => {
                if let Some(version) = inner.get("version").and_then(scalar_to_string) {
                    versions.insert(key, version);
                }
            }
            Value::Object(inner) => {
                for (sub_key, sub_value) in inner {
                    let sub_key = sub_key.to_lowercase();
                    if !sub_key.contains("version") {
                        continue;
                    }
                    if let Value::String(version) = sub_value {
                        versions.insert(format!("{key}_{sub_key}"), version);
                    }
                }
            }
            _ => {}
        }
    }

    DeployedVersions::Structured(versions)
}

/// Parses a `version.json` body into a flat map, falling back to the single
/// [`PLAIN_TEXT_KEY`] entry for non-JSON bodies.
pub fn parse_deployed_json(text: &str) -> VersionMap {
    parse_deployed(text).into_version_map()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
