//! Build → fetch → decode for a single command

use std::sync::Arc;

use cloudcall_domain::{Command, Credentials, DecodedResult, Result};
use tracing::debug;

use crate::ports::Transport;
use crate::request::RequestBuilder;
use crate::response::ResponseDecoder;

/// One round trip for one command. Shared by the dispatcher and the job
/// poller so status queries go through exactly the same path as any other
/// command.
#[derive(Clone)]
pub struct CommandPipeline {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    decoder: ResponseDecoder,
}

impl CommandPipeline {
    /// Pipeline sending requests built by `builder` through `transport`.
    pub fn new(builder: RequestBuilder, transport: Arc<dyn Transport>) -> Self {
        Self { builder, transport, decoder: ResponseDecoder::new() }
    }

    /// The request builder in use.
    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Execute `command` once and decode the response payload.
    ///
    /// # Errors
    /// Validation errors before any I/O; transport, HTTP and decode errors
    /// afterwards.
    pub async fn execute(
        &self,
        command: &Command,
        credentials: Option<&Credentials>,
    ) -> Result<DecodedResult> {
        let request = self.builder.build(command, credentials)?;
        debug!(command = command.name(), url = %request.redacted_url(), "dispatching request");

        let raw = self.transport.fetch(&request).await;
        let body = raw.into_body()?;
        self.decoder.decode(&body)
    }
}
