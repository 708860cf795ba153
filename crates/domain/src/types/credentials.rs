//! API credentials

use std::fmt;

/// API key and shared secret for signed requests.
///
/// Unauthenticated (trusted local port) access is expressed by passing no
/// credentials at all rather than an empty value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret_key: Vec<u8>,
}

impl Credentials {
    /// Pair an API key with its secret.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<Vec<u8>>) -> Self {
        Self { api_key: api_key.into(), secret_key: secret_key.into() }
    }

    /// Public key sent as `apiKey`.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signing secret. Never sent on the wire.
    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
