//! reqwest-backed implementation of the core `Transport` port

mod client;

pub use client::{HttpClient, HttpClientBuilder};
