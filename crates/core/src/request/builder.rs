//! Signed and unsigned request construction

use std::sync::Arc;

use cloudcall_domain::constants::{
    PARAM_API_KEY, PARAM_COMMAND, PARAM_RESPONSE, PARAM_SIGNATURE, RESPONSE_FORMAT_JSON,
};
use cloudcall_domain::{Command, Credentials, EndpointConfig, Result, SignedRequest};
use tracing::trace;

use super::flatten::flatten_params;
use crate::signing::{wire_query, RequestSigner};

/// Builds `protocol://host:port/path?<query>` GET URLs for commands.
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: String,
    signer: Arc<dyn RequestSigner>,
}

impl RequestBuilder {
    /// Builder for `endpoint`, signing with `signer`.
    pub fn new(endpoint: &EndpointConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self { base_url: endpoint.base_url(), signer }
    }

    /// URL without the query string.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request URL for `command`.
    ///
    /// With credentials the query carries `apiKey` and a trailing
    /// `signature`; without them the query is sent unsigned.
    ///
    /// # Errors
    /// [`cloudcall_domain::CloudCallError::Validation`] when the command is
    /// missing a required field, or the signer's error.
    pub fn build(
        &self,
        command: &Command,
        credentials: Option<&Credentials>,
    ) -> Result<SignedRequest> {
        command.validate()?;

        let mut params = flatten_params(command.parameters());
        params.push((PARAM_COMMAND.to_string(), command.name().to_string()));
        params.push((PARAM_RESPONSE.to_string(), RESPONSE_FORMAT_JSON.to_string()));

        let query = match credentials {
            Some(credentials) => {
                params.push((PARAM_API_KEY.to_string(), credentials.api_key().to_string()));
                let signature = self.signer.sign(&params, credentials.secret_key())?;
                format!("{}&{PARAM_SIGNATURE}={signature}", wire_query(&params))
            }
            None => wire_query(&params),
        };

        trace!(command = command.name(), params = params.len(), "built request query");
        Ok(SignedRequest::new(command.name(), format!("{}?{query}", self.base_url)))
    }
}
