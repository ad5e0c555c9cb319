//! Transport seam between the submission workflow and the statistics service.
//!
//! Implementations resolve every request into a [`SubmitResult`]; nothing above this
//! module sees transport-specific error types.

mod http;

pub use http::HttpTransport;

use crate::model::{StatsRequest, SubmitResult};
use async_trait::async_trait;
use thiserror::Error;

/// A request that never produced an HTTP response.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportError> for SubmitResult {
    fn from(value: TransportError) -> Self {
        SubmitResult::TransportError(value.message)
    }
}

#[async_trait]
pub trait StatsTransport: Send + Sync {
    /// POST the request body and return the response status code.
    async fn send(&self, request: &StatsRequest) -> Result<u16, TransportError>;

    /// Dispatch and resolve into the three-way result.
    async fn post_stats(&self, request: &StatsRequest) -> SubmitResult {
        match self.send(request).await {
            Ok(status) => SubmitResult::from_status(status),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatisticType;

    struct FixedTransport(Result<u16, String>);

    #[async_trait]
    impl StatsTransport for FixedTransport {
        async fn send(&self, _request: &StatsRequest) -> Result<u16, TransportError> {
            self.0.clone().map_err(TransportError::new)
        }
    }

    fn request() -> StatsRequest {
        StatsRequest {
            variations: vec!["e1".into()],
            replyto: "user@example.com".into(),
            stat_type: StatisticType::VarsInPaper,
        }
    }

    #[tokio::test]
    async fn post_stats_maps_status_and_errors() {
        let ok = FixedTransport(Ok(200)).post_stats(&request()).await;
        assert_eq!(ok, SubmitResult::Success);

        let bad = FixedTransport(Ok(500)).post_stats(&request()).await;
        assert_eq!(bad, SubmitResult::ProtocolError(500));

        let down = FixedTransport(Err("connection refused".into()))
            .post_stats(&request())
            .await;
        assert_eq!(
            down,
            SubmitResult::TransportError("connection refused".into())
        );
    }

    #[test]
    fn transport_error_displays_message_verbatim() {
        let e = TransportError::new("dns error: no such host");
        assert_eq!(e.to_string(), "dns error: no such host");
        let mapped: SubmitResult = e.into();
        assert_eq!(
            mapped,
            SubmitResult::TransportError("dns error: no such host".into())
        );
    }
}
