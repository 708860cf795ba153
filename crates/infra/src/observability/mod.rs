//! Observability infrastructure
//!
//! Structured logging through `tracing`. Spans and events are emitted by the
//! core crate; this module only decides where they go and how they look.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};
