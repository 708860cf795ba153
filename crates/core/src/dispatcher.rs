//! Command dispatch façade
//!
//! The dispatcher is the only entry point callers need: it validates, signs,
//! sends and decodes a command, and for async commands keeps polling until
//! the job settles. It holds no mutable state, so one instance can serve
//! concurrent sends.

use std::sync::Arc;
use std::time::Duration;

use cloudcall_domain::constants::{DEFAULT_JOB_BUDGET_SECS, DEFAULT_POLL_INTERVAL_SECS};
use cloudcall_domain::{Command, Credentials, DecodedResult, EndpointConfig, Result};
use tracing::{debug, instrument};

use crate::jobs::AsyncJobPoller;
use crate::pipeline::CommandPipeline;
use crate::ports::Transport;
use crate::request::RequestBuilder;
use crate::signing::{HmacSha1Signer, RequestSigner};

/// Sends commands and resolves async jobs.
#[derive(Clone)]
pub struct Dispatcher {
    pipeline: CommandPipeline,
    poller: AsyncJobPoller,
    credentials: Option<Credentials>,
    job_budget: Duration,
}

impl Dispatcher {
    /// Start building a dispatcher for `endpoint` over `transport`.
    pub fn builder(endpoint: EndpointConfig, transport: Arc<dyn Transport>) -> DispatcherBuilder {
        DispatcherBuilder::new(endpoint, transport)
    }

    /// Send `command` with the configured credentials and job budget.
    ///
    /// # Errors
    /// Exactly one of the [`cloudcall_domain::CloudCallError`] kinds; a
    /// validation error is returned before any network I/O.
    pub async fn send(&self, command: &Command) -> Result<DecodedResult> {
        self.dispatch(command, self.credentials.as_ref(), self.job_budget).await
    }

    /// Send with explicit credentials; `None` sends unsigned.
    ///
    /// # Errors
    /// See [`Dispatcher::send`].
    pub async fn send_with(
        &self,
        command: &Command,
        credentials: Option<&Credentials>,
    ) -> Result<DecodedResult> {
        self.dispatch(command, credentials, self.job_budget).await
    }

    /// Send with a job budget other than the configured one.
    ///
    /// # Errors
    /// See [`Dispatcher::send`].
    pub async fn send_with_budget(
        &self,
        command: &Command,
        budget: Duration,
    ) -> Result<DecodedResult> {
        self.dispatch(command, self.credentials.as_ref(), budget).await
    }

    /// Endpoint every request goes to.
    pub fn base_url(&self) -> &str {
        self.pipeline.builder().base_url()
    }

    /// Default polling budget for async commands.
    pub fn job_budget(&self) -> Duration {
        self.job_budget
    }

    /// The job poller shared by all dispatches.
    pub fn poller(&self) -> &AsyncJobPoller {
        &self.poller
    }

    /// Whether default credentials are configured.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    #[instrument(
        name = "dispatch",
        skip_all,
        fields(command = %command.name(), is_async = command.is_async(), signed = credentials.is_some())
    )]
    async fn dispatch(
        &self,
        command: &Command,
        credentials: Option<&Credentials>,
        budget: Duration,
    ) -> Result<DecodedResult> {
        // Validation happens inside the builder, before the transport is touched.
        let result = self.pipeline.execute(command, credentials).await?;

        if !command.is_async() {
            return Ok(result);
        }

        match result.job_id() {
            Some(job_id) => {
                debug!(%job_id, "command returned async job");
                self.poller.poll(&job_id, budget, credentials).await
            }
            None => {
                debug!("async command completed without a job id");
                Ok(result)
            }
        }
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    endpoint: EndpointConfig,
    transport: Arc<dyn Transport>,
    signer: Arc<dyn RequestSigner>,
    credentials: Option<Credentials>,
    poll_interval: Duration,
    job_budget: Duration,
}

impl DispatcherBuilder {
    fn new(endpoint: EndpointConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
            signer: Arc::new(HmacSha1Signer::new()),
            credentials: None,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            job_budget: Duration::from_secs(DEFAULT_JOB_BUDGET_SECS),
        }
    }

    /// Replace the HMAC-SHA1 signer.
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Default credentials for [`Dispatcher::send`]. Leave unset for
    /// unauthenticated access.
    pub fn credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Delay between job status queries.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Total polling time allowed per async command.
    pub fn job_budget(mut self, budget: Duration) -> Self {
        self.job_budget = budget;
        self
    }

    /// # Errors
    /// [`cloudcall_domain::CloudCallError::Config`] for a zero poll interval.
    pub fn build(self) -> Result<Dispatcher> {
        let builder = RequestBuilder::new(&self.endpoint, self.signer);
        let pipeline = CommandPipeline::new(builder, self.transport);
        let poller = AsyncJobPoller::new(pipeline.clone(), self.poll_interval)?;

        Ok(Dispatcher {
            pipeline,
            poller,
            credentials: self.credentials,
            job_budget: self.job_budget,
        })
    }
}
