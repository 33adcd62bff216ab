//! Decoding of model answers.
//!
//! The model is asked for bare JSON but often wraps it in a markdown code
//! fence. [`clean_json`] removes one such wrapper; the `parse_*` functions
//! decode the result and fall back instead of failing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_ANALYSIS;

/// Materials the model reported for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialResult {
    /// Object name, usually one of the confirmed objects.
    pub object_name: String,
    /// Material names, e.g. `["металл", "дерево"]`.
    #[serde(default)]
    pub materials: Vec<String>,
}

impl MaterialResult {
    pub fn new(object_name: impl Into<String>, materials: impl IntoIterator<Item = String>) -> Self {
        Self {
            object_name: object_name.into(),
            materials: materials.into_iter().collect(),
        }
    }
}

/// Strips one markdown fence wrapper and surrounding whitespace.
///
/// A leading "```json" is preferred over a bare "```"; only one of them is
/// removed. Applying the function twice gives the same result as once.
pub fn clean_json(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Decodes a JSON array of strings from a cleaned answer.
///
/// A JSON `null` decodes to an empty list.
pub fn decode_object_list(text: &str) -> serde_json::Result<Vec<String>> {
    serde_json::from_str::<Option<Vec<String>>>(clean_json(text)).map(Option::unwrap_or_default)
}

/// Decodes a JSON array of [`MaterialResult`]s from a cleaned answer.
pub fn decode_material_results(text: &str) -> serde_json::Result<Vec<MaterialResult>> {
    serde_json::from_str::<Option<Vec<MaterialResult>>>(clean_json(text))
        .map(Option::unwrap_or_default)
}

/// Returns the object names in `text`, or the raw text as the only item.
///
/// The single-item fallback is indistinguishable from a one-object answer by
/// shape alone; it is logged at `warn` when it happens.
pub fn parse_object_list(text: &str) -> Vec<String> {
    match decode_object_list(text) {
        Ok(objects) => objects,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET_ANALYSIS,
                error = %error,
                answer_len = text.len(),
                "Object list could not be decoded, returning the raw answer"
            );
            vec![text.to_owned()]
        }
    }
}

/// Returns the material results in `text`, or nothing.
pub fn parse_material_results(text: &str) -> Vec<MaterialResult> {
    match decode_material_results(text) {
        Ok(results) => results,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET_ANALYSIS,
                error = %error,
                answer_len = text.len(),
                "Material results could not be decoded, returning no results"
            );
            Vec::new()
        }
    }
}
