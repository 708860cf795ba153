//! Turning commands into request URLs

pub mod builder;
pub mod flatten;

pub use builder::RequestBuilder;
pub use flatten::flatten_params;
