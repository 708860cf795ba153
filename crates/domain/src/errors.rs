//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CloudCall.
///
/// A dispatched command ends in exactly one successful result or exactly one
/// of these kinds; no layer swallows an error from the layer below it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum CloudCallError {
    /// A required command field was missing. Raised before any network I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure with no HTTP answer. Failed connects (DNS, refused,
    /// reset) are retried by the transport first; a timeout is reported after
    /// one attempt.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response. Never retried.
    #[error("HTTP {status}: {description}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-provided description, or the status reason phrase.
        description: String,
    },

    /// Malformed JSON or an ambiguous response envelope.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The remote async job finished with a failure status.
    #[error("Async job {job_id} failed ({}): {text}", .code.map_or_else(|| "no code".to_string(), |c| c.to_string()))]
    AsyncJob {
        /// Identifier of the failed job.
        job_id: String,
        /// The job's error code, when it reported one.
        code: Option<i64>,
        /// The job's error text, verbatim.
        text: String,
    },

    /// The polling budget ran out while the job was still pending. The remote
    /// job may still complete.
    #[error("Async job {job_id} still pending after {budget_secs}s")]
    Timeout {
        /// Identifier of the job that was still pending.
        job_id: String,
        /// Polling budget that ran out.
        budget_secs: u64,
    },

    /// Invalid configuration, or a local facility that could not be set up.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CloudCallError {
    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport(_) => "transport",
            Self::Http { .. } => "http",
            Self::Decode(_) => "decode",
            Self::AsyncJob { .. } => "async_job",
            Self::Timeout { .. } => "timeout",
            Self::Config(_) => "config",
        }
    }

    /// Whether the failure happened before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config(_))
    }
}

/// Result type alias for CloudCall operations
pub type Result<T> = std::result::Result<T, CloudCallError>;
