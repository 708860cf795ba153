//! Async job status codes and tracking state

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::command::{CommandSpec, Field};
use crate::constants::{PARAM_JOB_ID, QUERY_ASYNC_JOB_RESULT};

/// Server-reported job status. The integer codes are a wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// `0`: still running.
    Pending = 0,
    /// `1`: finished with a result.
    Succeeded = 1,
    /// `2`: finished with an error.
    Failed = 2,
}

impl JobStatus {
    /// Map a `jobstatus` value. Unknown or absent codes count as pending.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Succeeded,
            Some(2) => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Wire value of the status.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Whether the job has settled.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Tracking state for one server-side job while it is being polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncJob {
    /// Server-assigned job id.
    pub job_id: String,
    /// Polling time left before giving up.
    pub remaining_budget: Duration,
    /// Delay charged per pending answer.
    pub poll_interval: Duration,
}

impl AsyncJob {
    /// Start tracking `job_id` with the full `budget`.
    pub fn new(job_id: impl Into<String>, budget: Duration, poll_interval: Duration) -> Self {
        Self { job_id: job_id.into(), remaining_budget: budget, poll_interval }
    }

    /// Charge one poll interval against the budget.
    ///
    /// Returns `true` once the budget is used up.
    pub fn charge_interval(&mut self) -> bool {
        self.remaining_budget = self.remaining_budget.saturating_sub(self.poll_interval);
        self.is_exhausted()
    }

    /// Whether no budget is left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_budget.is_zero()
    }
}

/// The synthetic status query issued for every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAsyncJobResult {
    /// Job to ask about.
    pub job_id: String,
}

impl QueryAsyncJobResult {
    /// Status query for `job_id`.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into() }
    }
}

impl CommandSpec for QueryAsyncJobResult {
    const NAME: &'static str = QUERY_ASYNC_JOB_RESULT;

    fn fields(&self) -> Vec<Field> {
        vec![Field::required(PARAM_JOB_ID, Some(self.job_id.as_str()))]
    }
}
