//! Step serialization
//!
//! A step becomes a comma-joined list of `code_value` tokens sorted by code
//! and then value, followed by any raw transformation text.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde_json::Value;

use crate::options::{canonicalize, scalar_to_string};
use crate::transformation::TransformationStep;
use crate::vocabulary::{Encoding, OptionRole, Vocabulary, VocabularyEntry};

/// Serialize one step. Returns `None` when nothing in it renders.
pub fn render_step(step: &TransformationStep, vocabulary: &Vocabulary) -> Option<String> {
    let mut tokens: Vec<(&str, String)> = Vec::with_capacity(step.len());
    let mut raw: Vec<String> = Vec::new();

    for (key, value) in step.iter() {
        let entry = vocabulary.get(key).filter(|e| e.role == OptionRole::Transformation);
        let Some(entry) = entry else {
            tracing::debug!(key, "skipping non-transformation option in step");
            continue;
        };

        match entry.encoding {
            Encoding::Raw => raw.extend(render_value(value, entry.separator())),
            Encoding::Plain => {
                let text = render_value(value, entry.separator());
                if let (Some(code), Some(text)) = (entry.code.as_deref(), text) {
                    tokens.push((code, text));
                }
            }
            Encoding::Function | Encoding::PreFunction => {
                let text = render_function(entry, value);
                if let (Some(code), Some(text)) = (entry.code.as_deref(), text) {
                    tokens.push((code, text));
                }
            }
        }
    }

    tokens.sort();
    let mut parts: Vec<String> =
        tokens.into_iter().map(|(code, text)| format!("{code}_{text}")).collect();
    parts.extend(raw);

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Render an option value as token text.
///
/// Arrays are joined with `separator`. Null, empty strings, empty arrays and
/// objects render nothing.
pub fn render_value(value: &Value, separator: &str) -> Option<String> {
    let text = match value {
        Value::Array(items) => {
            let parts: Vec<String> =
                items.iter().filter_map(scalar_to_string).filter(|s| !s.is_empty()).collect();
            parts.join(separator)
        }
        Value::Object(_) => {
            tracing::warn!(value = %value, "object value cannot be rendered as a token");
            return None;
        }
        other => scalar_to_string(other)?,
    };
    (!text.is_empty()).then_some(text)
}

/// Render a custom function descriptor `{function_type, source}`.
///
/// `remote` sources are base64 encoded, `wasm` sources are used as-is.
/// Pre-processing functions only support `remote`. Anything else is dropped.
fn render_function(entry: &VocabularyEntry, value: &Value) -> Option<String> {
    let object = value.as_object()?;
    let field = |name: &str| {
        object.iter().find(|(k, _)| canonicalize(k) == name).and_then(|(_, v)| v.as_str())
    };
    let function_type = field("functionType")?;
    let source = field("source").filter(|s| !s.is_empty())?;

    let rendered = match (entry.encoding, function_type) {
        (Encoding::Function, "remote") => format!("remote:{}", URL_SAFE.encode(source)),
        (Encoding::Function, "wasm") => format!("wasm:{source}"),
        (Encoding::PreFunction, "remote") => format!("pre:remote:{}", URL_SAFE.encode(source)),
        _ => {
            tracing::warn!(key = %entry.key, function_type, "unsupported custom function type");
            return None;
        }
    };
    Some(rendered)
}
