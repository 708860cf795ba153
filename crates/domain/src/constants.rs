//! Protocol and configuration constants
//!
//! Parameter names and command names here are part of the wire contract with
//! the management server and must not change.

// Wire parameters

/// Query key carrying the command name.
pub const PARAM_COMMAND: &str = "command";
/// Query key selecting the response format.
pub const PARAM_RESPONSE: &str = "response";
/// Query key carrying the public API key.
pub const PARAM_API_KEY: &str = "apiKey";
/// Query key carrying the request signature. Always last on the wire.
pub const PARAM_SIGNATURE: &str = "signature";
/// Async job id, both in responses and in status queries.
pub const PARAM_JOB_ID: &str = "jobid";
/// Value of [`PARAM_RESPONSE`] on every request.
pub const RESPONSE_FORMAT_JSON: &str = "json";

// Async job polling

/// Command used to poll a job.
pub const QUERY_ASYNC_JOB_RESULT: &str = "queryAsyncJobResult";
/// Numeric job status: 0 pending, 1 succeeded, 2 failed.
pub const FIELD_JOB_STATUS: &str = "jobstatus";
/// Result object of a finished job.
pub const FIELD_JOB_RESULT: &str = "jobresult";
/// Fallback error code of a failed job.
pub const FIELD_JOB_RESULT_CODE: &str = "jobresultcode";
/// Error code inside a failed job's result.
pub const FIELD_ERROR_CODE: &str = "errorcode";
/// Error text inside a failed job's result or an error body.
pub const FIELD_ERROR_TEXT: &str = "errortext";

// Response envelope

/// Substring identifying the payload key of a response body.
pub const RESPONSE_KEY_MARKER: &str = "response";
/// Header some servers use to describe an error status.
pub const DESCRIPTION_HEADER: &str = "X-Description";

// Endpoint defaults

/// Default URL scheme.
pub const DEFAULT_PROTOCOL: &str = "http";
/// Default API host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default API port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default API path.
pub const DEFAULT_API_PATH: &str = "/client/api";

// Transport defaults

/// Per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Attempts per request when the connection cannot be established.
pub const DEFAULT_TRANSPORT_ATTEMPTS: u32 = 5;
/// Delay before the first connect retry; zero retries immediately.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 0;

// Job defaults

/// Delay between job status queries.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Total polling time per job.
pub const DEFAULT_JOB_BUDGET_SECS: u64 = 3600;
