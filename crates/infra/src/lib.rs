//! # CloudCall Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport
//! - Configuration loading from environment and files
//! - Logging setup
//!
//! ## Architecture
//! - Implements traits defined in `cloudcall-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

use std::sync::Arc;

use cloudcall_core::Dispatcher;
use cloudcall_domain::{ClientConfig, Result};

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_logging, LogConfig, LogFormat};

/// Assemble a dispatcher over [`HttpClient`] from a complete configuration.
///
/// # Errors
/// `CloudCallError::Config` when the configuration is invalid or the HTTP
/// client cannot be built.
pub fn build_dispatcher(config: &ClientConfig) -> Result<Dispatcher> {
    config.validate()?;

    let transport = HttpClient::from_config(&config.http)?;
    tracing::debug!(
        base_url = %config.endpoint.base_url(),
        authenticated = config.credentials.is_some(),
        "building dispatcher"
    );

    Dispatcher::builder(config.endpoint.clone(), Arc::new(transport))
        .credentials(config.credentials())
        .poll_interval(config.jobs.poll_interval())
        .job_budget(config.jobs.budget())
        .build()
}

/// Load configuration with [`config::load`] and build a dispatcher from it.
///
/// # Errors
/// See [`config::load`] and [`build_dispatcher`].
pub fn connect() -> Result<Dispatcher> {
    build_dispatcher(&config::load()?)
}
