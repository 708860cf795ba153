//! Port interfaces for outbound I/O
//!
//! Core logic only talks to the network through these traits; the infra
//! crate provides the HTTP implementation and tests provide fakes.

use async_trait::async_trait;
use cloudcall_domain::{RawResponse, SignedRequest};

/// Performs one logical HTTP GET for a fully built request.
///
/// Implementations classify the outcome into a [`RawResponse`] instead of
/// returning an error. Failed connects are retried a bounded number of times
/// per call. Nothing is resent once the request may have reached the server,
/// so timeouts and HTTP error statuses come back after a single delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and report what came back.
    async fn fetch(&self, request: &SignedRequest) -> RawResponse;
}
