//! Extracts the single `*response` payload from a JSON body

use cloudcall_domain::constants::RESPONSE_KEY_MARKER;
use cloudcall_domain::{CloudCallError, DecodedResult, Result};
use serde_json::Value;

/// Decodes response bodies of the form `{"<command>response": {...}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl ResponseDecoder {
    /// New decoder.
    pub fn new() -> Self {
        Self
    }

    /// Parse `body` and return the payload under the one top-level key whose
    /// name contains `response`. Sibling keys are ignored.
    ///
    /// # Errors
    /// [`CloudCallError::Decode`] on malformed JSON, a non-object body, zero
    /// or several matching keys, or a payload that is not an object.
    pub fn decode(&self, body: &[u8]) -> Result<DecodedResult> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| CloudCallError::Decode(format!("malformed JSON response: {e}")))?;

        let Value::Object(mut envelope) = value else {
            return Err(CloudCallError::Decode("response body is not a JSON object".into()));
        };

        let mut matches = envelope
            .keys()
            .filter(|key| key.to_ascii_lowercase().contains(RESPONSE_KEY_MARKER))
            .cloned();

        let key = match (matches.next(), matches.next()) {
            (Some(key), None) => key,
            (None, _) => {
                return Err(CloudCallError::Decode(
                    "no top-level key containing 'response' in body".into(),
                ))
            }
            (Some(first), Some(second)) => {
                return Err(CloudCallError::Decode(format!(
                    "ambiguous response envelope: '{first}' and '{second}' both match"
                )))
            }
        };

        match envelope.remove(&key) {
            Some(Value::Object(payload)) => Ok(DecodedResult::new(payload)),
            Some(other) => Err(CloudCallError::Decode(format!(
                "'{key}' holds {} instead of an object",
                json_kind(&other)
            ))),
            None => Err(CloudCallError::Decode(format!("'{key}' vanished from envelope"))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
