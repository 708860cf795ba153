//! Fully formed outbound requests

use std::fmt;

use crate::constants::PARAM_SIGNATURE;

/// A complete GET URL for one command. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    command: String,
    url: String,
}

impl SignedRequest {
    /// Wrap a finished URL.
    pub fn new(command: impl Into<String>, url: impl Into<String>) -> Self {
        Self { command: command.into(), url: url.into() }
    }

    /// Name of the command this request carries.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Full URL, signature included. Do not log it; use
    /// [`SignedRequest::redacted_url`].
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the query carries a signature.
    pub fn is_signed(&self) -> bool {
        self.url.contains(&format!("&{PARAM_SIGNATURE}="))
    }

    /// URL with the signature value masked, safe to log.
    pub fn redacted_url(&self) -> String {
        let marker = format!("&{PARAM_SIGNATURE}=");
        match self.url.find(&marker) {
            Some(start) => {
                let value_start = start + marker.len();
                let value_end = self.url[value_start..]
                    .find('&')
                    .map_or(self.url.len(), |offset| value_start + offset);
                format!("{}***{}", &self.url[..value_start], &self.url[value_end..])
            }
            None => self.url.clone(),
        }
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("command", &self.command)
            .field("url", &self.redacted_url())
            .finish()
    }
}
