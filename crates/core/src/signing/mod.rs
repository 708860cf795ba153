//! Request canonicalization and signing
//!
//! Two strings are built from the same sorted parameters: the lowercased
//! hash input that gets signed, and the case-preserving wire query that gets
//! sent. The server rebuilds the hash input from the wire query, so both must
//! agree on order and escaping byte for byte.

pub mod canonical;
pub mod hmac_sha1;

use cloudcall_domain::Result;

pub use self::canonical::{hash_input, sort_params, url_escape, wire_query};
pub use self::hmac_sha1::HmacSha1Signer;

/// Produces the `signature` parameter for a set of request parameters.
pub trait RequestSigner: Send + Sync {
    /// Sign `params` with `secret_key`.
    ///
    /// The returned value is already URL-escaped and can be appended to the
    /// wire query as `&signature=<value>`.
    ///
    /// # Errors
    /// Returns [`cloudcall_domain::CloudCallError::Config`] when the secret
    /// cannot be used as a MAC key.
    fn sign(&self, params: &[(String, String)], secret_key: &[u8]) -> Result<String>;
}
