//! Polling `queryAsyncJobResult` until a job settles
//!
//! The poller is a small state machine: every iteration issues one status
//! query through the shared [`CommandPipeline`], maps `jobstatus` to a
//! [`JobState`], and either returns, fails, or sleeps one interval and
//! charges it against the job budget.
//!
//! There is no cancel path. Dropping the future stops tracking locally; the
//! server-side job keeps running.

use std::time::Duration;

use cloudcall_domain::constants::{
    FIELD_ERROR_CODE, FIELD_ERROR_TEXT, FIELD_JOB_RESULT, FIELD_JOB_RESULT_CODE, FIELD_JOB_STATUS,
};
use cloudcall_domain::{
    AsyncJob, CloudCallError, Command, Credentials, DecodedResult, JobStatus, QueryAsyncJobResult,
    Result,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::pipeline::CommandPipeline;

/// Where a polled job stands after one status query.
///
/// Running out of budget is not a server answer; the poller reports it as
/// [`CloudCallError::Timeout`].
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Still running; poll again after the interval.
    Pending,
    /// Finished; carries the `jobresult` object.
    Succeeded(DecodedResult),
    /// Finished with an error.
    Failed {
        /// `errorcode` from the job result, else `jobresultcode`.
        code: Option<i64>,
        /// The job's error text.
        text: String,
    },
}

impl JobState {
    /// Interpret one decoded `queryAsyncJobResult` payload.
    ///
    /// # Errors
    /// [`CloudCallError::Decode`] when a succeeded job carries a `jobresult`
    /// that is not an object.
    pub fn from_status(status: &DecodedResult) -> Result<Self> {
        match JobStatus::from_code(status.get_i64(FIELD_JOB_STATUS)) {
            JobStatus::Pending => Ok(Self::Pending),
            JobStatus::Succeeded => match status.get(FIELD_JOB_RESULT) {
                Some(Value::Object(result)) => Ok(Self::Succeeded(DecodedResult::new(result.clone()))),
                None | Some(Value::Null) => Ok(Self::Succeeded(DecodedResult::default())),
                Some(_) => Err(CloudCallError::Decode(
                    "succeeded job returned a non-object jobresult".into(),
                )),
            },
            JobStatus::Failed => Ok(failure(status)),
        }
    }

    /// Whether polling should stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

fn failure(status: &DecodedResult) -> JobState {
    let (code, text) = match status.get(FIELD_JOB_RESULT) {
        Some(Value::Object(result)) => {
            let detail = DecodedResult::new(result.clone());
            (detail.get_i64(FIELD_ERROR_CODE), detail.get_str(FIELD_ERROR_TEXT).map(str::to_string))
        }
        Some(Value::String(text)) => (None, Some(text.clone())),
        _ => (None, None),
    };

    JobState::Failed {
        code: code.or_else(|| status.get_i64(FIELD_JOB_RESULT_CODE)),
        text: text.unwrap_or_else(|| "job failed without error text".to_string()),
    }
}

/// Polls one job at a time at a fixed interval.
#[derive(Clone)]
pub struct AsyncJobPoller {
    pipeline: CommandPipeline,
    poll_interval: Duration,
}

impl AsyncJobPoller {
    /// Poller issuing status queries through `pipeline`.
    ///
    /// # Errors
    /// [`CloudCallError::Config`] for a zero poll interval.
    pub fn new(pipeline: CommandPipeline, poll_interval: Duration) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(CloudCallError::Config("job poll interval must be non-zero".into()));
        }
        Ok(Self { pipeline, poll_interval })
    }

    /// Fixed delay between status queries.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll `job_id` until it succeeds, fails, or `budget` runs out.
    ///
    /// Status queries are strictly sequential. Each pending answer costs one
    /// poll interval of budget, so the wait never overshoots the budget by
    /// more than one interval.
    ///
    /// # Errors
    /// [`CloudCallError::AsyncJob`] when the job fails,
    /// [`CloudCallError::Timeout`] when the budget is exhausted, and any
    /// pipeline error raised by a status query.
    #[instrument(skip(self, credentials), fields(budget_secs = budget.as_secs()))]
    pub async fn poll(
        &self,
        job_id: &str,
        budget: Duration,
        credentials: Option<&Credentials>,
    ) -> Result<DecodedResult> {
        let mut job = AsyncJob::new(job_id, budget, self.poll_interval);
        let query = Command::from_spec(&QueryAsyncJobResult::new(job_id));
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            let status = self.pipeline.execute(&query, credentials).await?;

            match JobState::from_status(&status)? {
                JobState::Succeeded(result) => {
                    info!(job_id, polls, "async job succeeded");
                    return Ok(result);
                }
                JobState::Failed { code, text } => {
                    warn!(job_id, polls, ?code, error = %text, "async job failed");
                    return Err(CloudCallError::AsyncJob { job_id: job.job_id, code, text });
                }
                JobState::Pending => {
                    debug!(job_id, polls, remaining_secs = job.remaining_budget.as_secs(), "job pending");
                }
            }

            tokio::time::sleep(job.poll_interval).await;
            if job.charge_interval() {
                warn!(job_id, polls, "async job budget exhausted");
                return Err(CloudCallError::Timeout {
                    job_id: job.job_id,
                    budget_secs: budget.as_secs(),
                });
            }
        }
    }
}
