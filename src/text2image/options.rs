//! Generation options: the built-in defaults and `--options` parsing.

use serde_json::{json, Map, Value};

use super::client::ImageError;

/// Options sent when the caller supplies none.
///
/// `guidance_scale` is deliberately the string `"0."`; the service accepts it
/// in that form.
pub fn default_options() -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("guidance_scale".to_string(), json!("0."));
    options.insert("height".to_string(), json!(768));
    options.insert("width".to_string(), json!(1360));
    options.insert("num_inference_steps".to_string(), json!(8));
    options.insert("max_sequence_length".to_string(), json!(256));
    options
}

/// Resolve the options object for a request.
///
/// A supplied JSON string replaces the defaults entirely; nothing is merged.
///
/// # Errors
///
/// Returns `ImageError::InvalidOptions` if the string is not valid JSON or is
/// not a JSON object.
pub fn resolve_options(raw: Option<&str>) -> Result<Map<String, Value>, ImageError> {
    let Some(raw) = raw else {
        return Ok(default_options());
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| ImageError::InvalidOptions {
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ImageError::InvalidOptions {
            reason: format!("expected a JSON object, got {}", other),
        }),
    }
}
