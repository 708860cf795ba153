//! Scripted transport for dispatcher and poller tests
//!
//! Responses are served in order; every request URL is recorded so tests
//! can count exactly how many calls reached the "network".

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cloudcall_core::{Dispatcher, Transport};
use cloudcall_domain::{Credentials, EndpointConfig, RawResponse, SignedRequest};
use serde_json::{json, Value};

type Responder = dyn Fn(&SignedRequest) -> RawResponse + Send + Sync;

/// In-memory [`Transport`] driven by a script or a responder closure.
#[derive(Clone)]
pub struct FakeTransport {
    script: Arc<Mutex<VecDeque<RawResponse>>>,
    responder: Option<Arc<Responder>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    /// Serve `responses` in order, then fail with a transport error.
    pub fn scripted(responses: Vec<RawResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into())),
            responder: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every request with `responder`.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&SignedRequest) -> RawResponse + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            responder: Some(Arc::new(responder)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of `queryAsyncJobResult` calls seen so far.
    pub fn poll_count(&self) -> usize {
        self.requests().iter().filter(|url| url.contains("command=queryAsyncJobResult")).count()
    }

    pub fn remaining_script(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, request: &SignedRequest) -> RawResponse {
        self.requests.lock().unwrap().push(request.url().to_string());

        if let Some(responder) = &self.responder {
            return responder(request);
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RawResponse::transport_error("script exhausted"))
    }
}

pub fn ok_json(body: Value) -> RawResponse {
    RawResponse::success(200, serde_json::to_vec(&body).unwrap())
}

/// `{"<command>response": payload}`, the envelope every command answers with.
pub fn envelope(command: &str, payload: Value) -> RawResponse {
    let mut body = serde_json::Map::new();
    body.insert(format!("{}response", command.to_lowercase()), payload);
    ok_json(Value::Object(body))
}

pub fn job_accepted(command: &str, job_id: &str) -> RawResponse {
    envelope(command, json!({ "jobid": job_id, "id": "res-1" }))
}

pub fn job_pending(job_id: &str) -> RawResponse {
    ok_json(json!({ "queryasyncjobresultresponse": { "jobid": job_id, "jobstatus": 0 } }))
}

pub fn job_succeeded(job_id: &str, result: Value) -> RawResponse {
    ok_json(json!({
        "queryasyncjobresultresponse": { "jobid": job_id, "jobstatus": 1, "jobresult": result }
    }))
}

pub fn job_failed(job_id: &str, code: i64, text: &str) -> RawResponse {
    ok_json(json!({
        "queryasyncjobresultresponse": {
            "jobid": job_id,
            "jobstatus": 2,
            "jobresultcode": 530,
            "jobresult": { "errorcode": code, "errortext": text }
        }
    }))
}

pub fn credentials() -> Credentials {
    Credentials::new("test-api-key", "test-secret-key")
}

pub fn dispatcher(transport: &FakeTransport, interval: Duration, budget: Duration) -> Dispatcher {
    Dispatcher::builder(EndpointConfig::new("http", "mgmt.test", 8080), Arc::new(transport.clone()))
        .credentials(Some(credentials()))
        .poll_interval(interval)
        .job_budget(budget)
        .build()
        .expect("dispatcher should build")
}
