//! # CloudCall Core
//!
//! Protocol logic with no network code of its own.
//!
//! This crate contains:
//! - Request canonicalization and HMAC-SHA1 signing
//! - Request URL construction with parameter flattening
//! - Response envelope decoding
//! - The async job polling state machine
//! - The [`Dispatcher`] façade
//!
//! ## Architecture Principles
//! - Only depends on `cloudcall-domain`
//! - All network I/O goes through the [`Transport`] port
//! - Everything is injected; no global state

pub mod dispatcher;
pub mod jobs;
pub mod pipeline;
pub mod ports;
pub mod request;
pub mod response;
pub mod signing;

// Re-export commonly used items
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use jobs::{AsyncJobPoller, JobState};
pub use pipeline::CommandPipeline;
pub use ports::Transport;
pub use request::RequestBuilder;
pub use response::ResponseDecoder;
pub use signing::{HmacSha1Signer, RequestSigner};
