//! Response-shape normalization.
//!
//! The backend's payload layout is not stable across API versions, so text is
//! located by trying a fixed list of matchers in priority order.

use serde_json::Value;

use crate::error::ModelError;

/// A named, pure extractor for one known payload layout.
#[derive(Clone, Copy)]
pub struct ShapeMatcher {
    pub name: &'static str,
    pub extract: fn(&Value) -> Option<String>,
}

impl std::fmt::Debug for ShapeMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShapeMatcher").field(&self.name).finish()
    }
}

/// Known layouts, highest priority first.
pub const RESPONSE_SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "generations",
        extract: generations_text,
    },
    ShapeMatcher {
        name: "text",
        extract: direct_text,
    },
    ShapeMatcher {
        name: "candidates",
        extract: candidates_text,
    },
    ShapeMatcher {
        name: "choices",
        extract: choices_text,
    },
];

/// `{"generations": [{"text": ...}, ...]}`
fn generations_text(value: &Value) -> Option<String> {
    first_element(value, "generations")?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// `{"text": ...}`
fn direct_text(value: &Value) -> Option<String> {
    value.get("text")?.as_str().map(str::to_string)
}

/// Gemini's native layout: the parts of the first candidate, concatenated.
fn candidates_text(value: &Value) -> Option<String> {
    let parts = first_element(value, "candidates")?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

/// `{"choices": [{"text": ...}]}`, or the chat form `{"choices": [{"message": {"content": ...}}]}`.
fn choices_text(value: &Value) -> Option<String> {
    let first = first_element(value, "choices")?;
    first
        .get("text")
        .and_then(Value::as_str)
        .or_else(|| {
            first
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

fn first_element<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key)?.as_array()?.first()
}

/// Extract the generated text using the first matching shape.
pub fn normalize_response(value: &Value) -> Result<String, ModelError> {
    RESPONSE_SHAPES
        .iter()
        .find_map(|shape| (shape.extract)(value))
        .ok_or_else(|| ModelError::UnrecognizedShape {
            keys: top_level_keys(value),
        })
}

fn top_level_keys(value: &Value) -> String {
    match value {
        Value::Object(map) if !map.is_empty() => {
            map.keys().cloned().collect::<Vec<_>>().join(", ")
        }
        Value::Object(_) => "<empty object>".to_string(),
        Value::Array(_) => "<array>".to_string(),
        Value::String(_) => "<string>".to_string(),
        Value::Null => "<null>".to_string(),
        _ => "<scalar>".to_string(),
    }
}
