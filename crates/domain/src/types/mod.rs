//! Domain types and models

pub mod command;
pub mod credentials;
pub mod job;
pub mod request;
pub mod response;

pub use command::{Command, CommandSpec, Field, ParamValue, RESERVED_PARAMS};
pub use credentials::Credentials;
pub use job::{AsyncJob, JobStatus, QueryAsyncJobResult};
pub use request::SignedRequest;
pub use response::{DecodedResult, RawResponse, ResponseStatus};
