#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cloudcall_core::{Dispatcher, HmacSha1Signer, RequestSigner};
use cloudcall_domain::{ClientConfig, Credentials, CredentialsConfig, EndpointConfig};
use cloudcall_infra::HttpClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const API_KEY: &str = "integration-key";
pub const SECRET_KEY: &str = "integration-secret";
pub const API_PATH: &str = "/client/api";

pub fn endpoint_for(server: &MockServer) -> EndpointConfig {
    let address = server.address();
    EndpointConfig::new("http", address.ip().to_string(), address.port())
}

pub fn credentials() -> Credentials {
    Credentials::new(API_KEY, SECRET_KEY)
}

/// Config pointing at `server`, signed with the test credentials.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        endpoint: endpoint_for(server),
        credentials: Some(CredentialsConfig {
            api_key: API_KEY.to_string(),
            secret_key: SECRET_KEY.to_string(),
        }),
        ..ClientConfig::default()
    }
}

/// Dispatcher over a real [`HttpClient`] with a millisecond poll interval.
pub fn fast_dispatcher(server: &MockServer, budget: Duration) -> Dispatcher {
    let transport = HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .max_attempts(2)
        .build()
        .expect("http client should build");

    Dispatcher::builder(endpoint_for(server), Arc::new(transport))
        .credentials(Some(credentials()))
        .poll_interval(Duration::from_millis(20))
        .job_budget(budget)
        .build()
        .expect("dispatcher should build")
}

pub fn envelope(command: &str, payload: Value) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(format!("{}response", command.to_lowercase()), payload);
    Value::Object(body)
}

/// Answer `command` with `{"<command>response": payload}`.
pub async fn mount_command(server: &MockServer, command: &str, payload: Value) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("command", command))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(command, payload)))
        .mount(server)
        .await;
}

/// Answer `queryAsyncJobResult` with `pending` pending statuses, then `last`.
/// Returns the shared poll counter.
pub async fn mount_job(
    server: &MockServer,
    job_id: &str,
    pending: usize,
    last: Value,
) -> Arc<AtomicUsize> {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = polls.clone();
    let job_id = job_id.to_string();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("command", "queryAsyncJobResult"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            let current = counter.fetch_add(1, Ordering::SeqCst);
            let status = if current < pending {
                json!({ "jobid": job_id, "jobstatus": 0 })
            } else {
                last.clone()
            };
            ResponseTemplate::new(200)
                .set_body_json(json!({ "queryasyncjobresultresponse": status }))
        })
        .mount(server)
        .await;

    polls
}

/// Recompute the signature of a received request and compare it with the
/// one on the wire.
pub fn signature_matches(request: &Request, secret: &str) -> bool {
    let mut params = Vec::new();
    let mut sent = None;
    for (key, value) in request.url.query_pairs() {
        if key == "signature" {
            sent = Some(value.into_owned());
        } else {
            params.push((key.into_owned(), value.into_owned()));
        }
    }

    let Some(sent) = sent else {
        return false;
    };
    let expected =
        HmacSha1Signer::new().sign(&params, secret.as_bytes()).expect("signature");
    let raw_query = request.url.query().unwrap_or_default();
    raw_query.ends_with(&format!("&signature={expected}")) && !sent.is_empty()
}
