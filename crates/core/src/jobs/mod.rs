//! Async job tracking

pub mod poller;

pub use poller::{AsyncJobPoller, JobState};
