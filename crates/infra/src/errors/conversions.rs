//! Conversions from external infrastructure errors into domain errors.

use cloudcall_domain::CloudCallError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CloudCallError);

impl From<InfraError> for CloudCallError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CloudCallError> for InfraError {
    fn from(value: CloudCallError) -> Self {
        InfraError(value)
    }
}

trait IntoCloudCallError {
    fn into_cloudcall(self) -> CloudCallError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CloudCallError */
/* -------------------------------------------------------------------------- */

impl IntoCloudCallError for HttpError {
    fn into_cloudcall(self) -> CloudCallError {
        // Builder failures are local misconfiguration, not a network problem.
        if self.is_builder() {
            return CloudCallError::Config(format!("http client configuration error: {self}"));
        }

        let kind = if self.is_timeout() {
            "http request timed out"
        } else if self.is_connect() {
            "http connection failed"
        } else if self.is_body() || self.is_decode() {
            "http response body could not be read"
        } else {
            "http request failed"
        };

        // Error sources can echo the full URL, signature included.
        let message = match self.url().map(redact_url) {
            Some(url) => format!("{kind} ({url}): {}", self.without_url()),
            None => format!("{kind}: {self}"),
        };

        CloudCallError::Transport(message)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_cloudcall())
    }
}

/// Host and path only; the query carries the api key and signature.
fn redact_url(url: &url::Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_failure_maps_to_transport_without_query() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/client/api?command=listZones&signature=abc%3D");
        let err = reqwest::get(&url).await.unwrap_err();
        let mapped: CloudCallError = InfraError::from(err).into();

        match mapped {
            CloudCallError::Transport(message) => {
                assert!(message.starts_with("http connection failed"), "{message}");
                assert!(!message.contains("signature"), "{message}");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn domain_errors_round_trip_through_newtype() {
        let original = CloudCallError::Config("bad".into());
        let back: CloudCallError = InfraError::from(original.clone()).into();
        assert_eq!(back, original);
    }
}
