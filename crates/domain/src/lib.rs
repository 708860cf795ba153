//! # CloudCall Domain
//!
//! Data model shared by every CloudCall crate.
//!
//! This crate contains:
//! - Commands, parameter values and typed command specs
//! - Credentials, signed requests and raw/decoded responses
//! - Async job status codes and tracking state
//! - The error taxonomy and configuration structures
//!
//! ## Architecture
//! - No dependencies on other CloudCall crates
//! - No I/O; pure data and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
