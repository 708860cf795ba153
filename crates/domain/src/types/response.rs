//! Raw transport responses and decoded payloads

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::PARAM_JOB_ID;
use crate::errors::{CloudCallError, Result};

/// Outcome class of a single HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// 2xx answer.
    Success,
    /// Any other HTTP status.
    HttpError,
    /// No HTTP answer at all.
    TransportError,
}

/// What the transport observed, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Outcome class.
    pub status: ResponseStatus,
    /// Response body; empty for transport errors.
    pub body: Vec<u8>,
    /// HTTP status code, when the server answered.
    pub http_status: Option<u16>,
    /// Human-readable failure description.
    pub error_detail: Option<String>,
}

impl RawResponse {
    /// A 2xx answer.
    pub fn success(http_status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: ResponseStatus::Success,
            body: body.into(),
            http_status: Some(http_status),
            error_detail: None,
        }
    }

    /// A non-2xx answer with its description.
    pub fn http_error(
        http_status: u16,
        body: impl Into<Vec<u8>>,
        error_detail: Option<String>,
    ) -> Self {
        Self {
            status: ResponseStatus::HttpError,
            body: body.into(),
            http_status: Some(http_status),
            error_detail,
        }
    }

    /// A failure without any HTTP answer.
    pub fn transport_error(detail: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::TransportError,
            body: Vec::new(),
            http_status: None,
            error_detail: Some(detail.into()),
        }
    }

    /// Hand back the body of a successful exchange, or the matching error.
    ///
    /// # Errors
    /// [`CloudCallError::Http`] for HTTP failures and
    /// [`CloudCallError::Transport`] for connection failures.
    pub fn into_body(self) -> Result<Vec<u8>> {
        match self.status {
            ResponseStatus::Success => Ok(self.body),
            ResponseStatus::HttpError => {
                let status = self.http_status.unwrap_or_default();
                let description = self
                    .error_detail
                    .filter(|detail| !detail.trim().is_empty())
                    .unwrap_or_else(|| format!("request failed with HTTP status {status}"));
                Err(CloudCallError::Http { status, description })
            }
            ResponseStatus::TransportError => Err(CloudCallError::Transport(
                self.error_detail.unwrap_or_else(|| "connection failed".to_string()),
            )),
        }
    }
}

/// Generic key/value payload pulled out of a response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedResult(Map<String, Value>);

impl DecodedResult {
    /// Wrap a decoded JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Integer field, accepting either a JSON number or a numeric string.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// The async job id, if the server returned one.
    pub fn job_id(&self) -> Option<String> {
        match self.0.get(PARAM_JOB_ID)? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Whether the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Bind the payload to a caller-defined response schema.
    ///
    /// # Errors
    /// [`CloudCallError::Decode`] when the payload does not fit `T`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| CloudCallError::Decode(format!("payload does not match schema: {e}")))
    }
}

impl From<Map<String, Value>> for DecodedResult {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn result(value: Value) -> DecodedResult {
        match value {
            Value::Object(map) => DecodedResult::new(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn job_id_accepts_strings_and_numbers() {
        assert_eq!(result(json!({"jobid": "abc-1"})).job_id().as_deref(), Some("abc-1"));
        assert_eq!(result(json!({"jobid": 42})).job_id().as_deref(), Some("42"));
        assert_eq!(result(json!({"jobid": ""})).job_id(), None);
        assert_eq!(result(json!({"id": "vm-1"})).job_id(), None);
    }

    #[test]
    fn get_i64_parses_numeric_strings() {
        let payload = result(json!({"jobstatus": "1", "count": 3, "name": "x"}));
        assert_eq!(payload.get_i64("jobstatus"), Some(1));
        assert_eq!(payload.get_i64("count"), Some(3));
        assert_eq!(payload.get_i64("name"), None);
        assert_eq!(payload.get_str("name"), Some("x"));
    }

    #[test]
    fn deserialize_into_binds_schema() {
        #[derive(Debug, Deserialize)]
        struct Zone {
            id: String,
        }
        let zone: Zone = result(json!({"id": "z1", "extra": true})).deserialize_into().unwrap();
        assert_eq!(zone.id, "z1");

        let err = result(json!({"name": "no id"})).deserialize_into::<Zone>().unwrap_err();
        assert_eq!(err.label(), "decode");
    }

    #[test]
    fn raw_http_error_prefers_server_description() {
        let raw = RawResponse::http_error(431, b"{}".to_vec(), Some("Unable to find zone".into()));
        assert_eq!(
            raw.into_body().unwrap_err(),
            CloudCallError::Http { status: 431, description: "Unable to find zone".into() }
        );

        let raw = RawResponse::http_error(503, Vec::new(), None);
        assert_eq!(
            raw.into_body().unwrap_err(),
            CloudCallError::Http {
                status: 503,
                description: "request failed with HTTP status 503".into()
            }
        );
    }

    #[test]
    fn raw_transport_error_maps_to_transport() {
        let raw = RawResponse::transport_error("connection refused");
        assert_eq!(
            raw.into_body().unwrap_err(),
            CloudCallError::Transport("connection refused".into())
        );
        assert_eq!(RawResponse::success(200, b"{}".to_vec()).into_body().unwrap(), b"{}");
    }
}
