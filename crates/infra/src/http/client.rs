use std::time::Duration;

use async_trait::async_trait;
use cloudcall_core::Transport;
use cloudcall_domain::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_TRANSPORT_ATTEMPTS,
    DESCRIPTION_HEADER, FIELD_ERROR_TEXT,
};
use cloudcall_domain::{CloudCallError, HttpConfig, RawResponse, Result, SignedRequest};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::InfraError;

/// HTTP transport with built-in retry and timeout support.
///
/// Only failures to establish a connection are retried, since the request
/// never left the client. A timeout or a broken exchange after the request was
/// sent is returned after that attempt: the server may already be acting on it.
/// Once the server has answered, whatever it said is classified and returned,
/// error statuses included.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: u32,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// [`CloudCallError::Config`] when the underlying client cannot be built.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Build a client from the `http` config section.
    ///
    /// # Errors
    /// See [`HttpClient::new`].
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::builder()
            .timeout(config.timeout())
            .max_attempts(config.max_attempts)
            .base_backoff(config.retry_backoff())
            .build()
    }

    /// Attempts per `fetch` call, the first try included.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// One GET, reading the whole body.
    async fn attempt(&self, url: &str) -> std::result::Result<RawResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let description = response
            .headers()
            .get(DESCRIPTION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(RawResponse::success(status.as_u16(), body));
        }

        let detail = describe_failure(description.as_deref(), &body, status);
        Ok(RawResponse::http_error(status.as_u16(), body, Some(detail)))
    }

    fn backoff_delay(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8);
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: u32) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch(&self, request: &SignedRequest) -> RawResponse {
        let attempts = self.max_attempts.max(1);
        let url = request.redacted_url();

        for attempt in 1..=attempts {
            debug!(attempt, command = request.command(), %url, "sending HTTP request");

            match self.attempt(request.url()).await {
                Ok(response) => {
                    debug!(
                        attempt,
                        command = request.command(),
                        status = ?response.http_status,
                        "received HTTP response"
                    );
                    return response;
                }
                Err(err) => {
                    if attempt < attempts && should_retry_error(&err) {
                        warn!(
                            attempt,
                            max_attempts = attempts,
                            command = request.command(),
                            error = %err.without_url(),
                            "HTTP request failed, retrying"
                        );
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    let error: CloudCallError = InfraError::from(err).into();
                    warn!(attempt, command = request.command(), %error, "HTTP request failed");
                    return match error {
                        CloudCallError::Transport(detail) => RawResponse::transport_error(detail),
                        other => RawResponse::transport_error(other.to_string()),
                    };
                }
            }
        }

        RawResponse::transport_error("http client exhausted retries without producing a result")
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_attempts: DEFAULT_TRANSPORT_ATTEMPTS,
            base_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Connect plus read timeout for a single attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry, doubled for each retry after that.
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Override the `cloudcall/<version>` user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    /// [`CloudCallError::Config`] when reqwest rejects the settings.
    pub fn build(self) -> Result<HttpClient> {
        let agent =
            self.user_agent.unwrap_or_else(|| format!("cloudcall/{}", env!("CARGO_PKG_VERSION")));
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(agent)
            .no_proxy()
            .build()
            .map_err(|err| {
                let infra: InfraError = err.into();
                CloudCallError::from(infra)
            })?;

        Ok(HttpClient { client, max_attempts: self.max_attempts.max(1), base_backoff: self.base_backoff })
    }
}

/// Whether `err` happened before the request reached the server (DNS lookup,
/// refused or reset connect). Anything later is not safe to resend.
fn should_retry_error(err: &reqwest::Error) -> bool {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}

/// Pick the most specific explanation of an error status: the description
/// header, the `errortext` of a JSON body, the raw body, then the status
/// reason phrase.
fn describe_failure(header: Option<&str>, body: &[u8], status: StatusCode) -> String {
    if let Some(description) = header.map(str::trim).filter(|text| !text.is_empty()) {
        return description.to_string();
    }

    if let Some(text) = body_error_text(body) {
        return text;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status.canonical_reason().map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

/// `errortext` at the top level or inside the single `<command>response`
/// object error bodies are wrapped in.
fn body_error_text(body: &[u8]) -> Option<String> {
    let Value::Object(root) = serde_json::from_slice::<Value>(body).ok()? else {
        return None;
    };

    let error_text = |object: &serde_json::Map<String, Value>| {
        object
            .get(FIELD_ERROR_TEXT)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    error_text(&root).or_else(|| {
        root.values().find_map(|value| match value {
            Value::Object(inner) => error_text(inner),
            _ => None,
        })
    })
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use cloudcall_domain::ResponseStatus;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with_attempts(attempts: u32) -> HttpClient {
        HttpClient::builder()
            .timeout(Duration::from_millis(500))
            .max_attempts(attempts)
            .build()
            .expect("http client")
    }

    fn request_for(server: &MockServer) -> SignedRequest {
        SignedRequest::new(
            "listZones",
            format!("{}/client/api?command=listZones&response=json&signature=abc%3D", server.uri()),
        )
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/client/api"))
            .and(query_param("signature", "abc="))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"listzonesresponse":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_attempts(3);
        let response = client.fetch(&request_for(&server)).await;

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.http_status, Some(200));
        assert_eq!(response.body, br#"{"listzonesresponse":{}}"#);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn http_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(530))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_attempts(5);
        let response = client.fetch(&request_for(&server)).await;

        assert_eq!(response.status, ResponseStatus::HttpError);
        assert_eq!(response.http_status, Some(530));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn description_header_wins_over_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(431)
                    .insert_header(DESCRIPTION_HEADER, "Unable to verify user credentials")
                    .set_body_string(r#"{"listzonesresponse":{"errortext":"from body"}}"#),
            )
            .mount(&server)
            .await;

        let response = client_with_attempts(1).fetch(&request_for(&server)).await;

        assert_eq!(response.error_detail.as_deref(), Some("Unable to verify user credentials"));
    }

    #[tokio::test]
    async fn sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "ops-console/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder().user_agent("ops-console/2").build().expect("http client");
        let response = client.fetch(&request_for(&server)).await;

        assert_eq!(response.status, ResponseStatus::Success);
    }

    #[tokio::test]
    async fn read_timeout_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .timeout(Duration::from_millis(100))
            .max_attempts(3)
            .build()
            .expect("http client");
        let response = client.fetch(&request_for(&server)).await;

        assert_eq!(response.status, ResponseStatus::TransportError);
        assert_eq!(response.http_status, None);
        let detail = response.error_detail.unwrap();
        assert!(detail.contains("timed out"), "{detail}");
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn retries_on_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let request = SignedRequest::new(
            "listZones",
            format!("http://{addr}/client/api?command=listZones&signature=secret%3D"),
        );
        let client = HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("http client");

        let response = client.fetch(&request).await;

        assert_eq!(response.status, ResponseStatus::TransportError);
        assert_eq!(response.http_status, None);
        let detail = response.error_detail.unwrap();
        assert!(detail.contains("connection failed"), "{detail}");
        assert!(!detail.contains("secret%3D"), "{detail}");
    }

    #[test]
    fn backoff_doubles_from_base() {
        let client = HttpClient::builder()
            .base_backoff(Duration::from_millis(100))
            .build()
            .expect("http client");
        assert_eq!(client.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(400));

        let immediate = HttpClient::new().expect("http client");
        assert_eq!(immediate.backoff_delay(4), Duration::ZERO);
        assert_eq!(immediate.max_attempts(), 5);
    }

    #[test]
    fn failure_description_fallback_order() {
        let status = StatusCode::from_u16(530).unwrap();
        let json_body = br#"{"deployvirtualmachineresponse":{"errorcode":530,"errortext":"zone is disabled"}}"#;

        assert_eq!(describe_failure(Some("header text"), json_body, status), "header text");
        assert_eq!(describe_failure(Some("  "), json_body, status), "zone is disabled");
        assert_eq!(
            describe_failure(None, br#"{"errortext":"flat error"}"#, status),
            "flat error"
        );
        assert_eq!(
            describe_failure(None, b"  upstream proxy error \n", StatusCode::BAD_GATEWAY),
            "upstream proxy error"
        );
        assert_eq!(describe_failure(None, b"", StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(describe_failure(None, b"", status), "HTTP 530");
    }
}
