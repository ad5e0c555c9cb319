//! Submission controller: validate, dispatch, and resolve into a feedback message.
//!
//! The workflow is split into [`SubmissionController::prepare`] and
//! [`SubmissionController::resolve`] so the terminal UI can hand the network step to the
//! orchestrator task; [`SubmissionController::submit`] runs all three steps inline.

use crate::client::StatsTransport;
use crate::form::FormState;
use crate::model::{StatsRequest, SubmitResult};

pub const SUCCESS_MESSAGE: &str =
    "Request submitted. You will receive the results to the provided email address.";
pub const WRONG_FORMAT_MESSAGE: &str = "Error: Wrong request format.";

impl SubmitResult {
    /// User-facing feedback for this result.
    pub fn message(&self) -> String {
        match self {
            SubmitResult::Success => SUCCESS_MESSAGE.to_string(),
            SubmitResult::ProtocolError(_) => WRONG_FORMAT_MESSAGE.to_string(),
            SubmitResult::TransportError(msg) => msg.clone(),
        }
    }
}

/// Holds the single feedback slot of a form session.
#[derive(Debug, Default)]
pub struct SubmissionController {
    outcome: Option<String>,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Option<&str> {
        self.outcome.as_deref()
    }

    /// Validate both fields and build the payload when they pass.
    pub fn prepare(&self, form: &mut FormState) -> Option<StatsRequest> {
        if form.validate() {
            Some(form.to_request())
        } else {
            tracing::debug!(errors = ?form.errors(), "submission blocked by validation");
            None
        }
    }

    pub fn resolve(&mut self, result: &SubmitResult) {
        self.outcome = Some(result.message());
    }

    /// Run one submission attempt. Returns `None` when validation blocked the request.
    pub async fn submit<T>(&mut self, form: &mut FormState, transport: &T) -> Option<SubmitResult>
    where
        T: StatsTransport + ?Sized,
    {
        let request = self.prepare(form)?;
        let result = transport.post_stats(&request).await;
        self.resolve(&result);
        Some(result)
    }

    pub fn dismiss(&mut self) {
        self.outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::model::StatisticType;
    use crate::validation::{EMAIL_ERROR, ENTITIES_ERROR};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and replies with a canned response.
    struct RecordingTransport {
        reply: Result<u16, String>,
        sent: Mutex<Vec<StatsRequest>>,
    }

    impl RecordingTransport {
        fn replying(status: u16) -> Self {
            Self {
                reply: Ok(status),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<StatsRequest> {
            self.sent.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl StatsTransport for RecordingTransport {
        async fn send(&self, request: &StatsRequest) -> Result<u16, TransportError> {
            self.sent.lock().expect("lock").push(request.clone());
            self.reply.clone().map_err(TransportError::new)
        }
    }

    fn valid_form() -> FormState {
        let mut form = FormState::new();
        form.set_entities("gene-1\ngene-2");
        form.set_email("user@example.com");
        form
    }

    #[tokio::test]
    async fn empty_entity_list_blocks_request() {
        let transport = RecordingTransport::replying(200);
        let mut ctrl = SubmissionController::new();
        let mut form = FormState::new();
        form.set_email("user@example.com");

        assert!(ctrl.submit(&mut form, &transport).await.is_none());
        assert_eq!(form.errors().entities.as_deref(), Some(ENTITIES_ERROR));
        assert!(form.errors().email.is_none());
        assert!(transport.sent().is_empty());
        assert!(ctrl.outcome().is_none());
    }

    #[tokio::test]
    async fn malformed_email_blocks_request_and_still_checks_entities() {
        for email in ["not-an-email", "", "a@b"] {
            let transport = RecordingTransport::replying(200);
            let mut ctrl = SubmissionController::new();

            let mut form = FormState::new();
            form.set_email(email);
            assert!(ctrl.submit(&mut form, &transport).await.is_none());
            assert_eq!(form.errors().email.as_deref(), Some(EMAIL_ERROR));
            assert_eq!(form.errors().entities.as_deref(), Some(ENTITIES_ERROR));

            form.set_entities("gene-1");
            assert!(ctrl.submit(&mut form, &transport).await.is_none());
            assert_eq!(form.errors().email.as_deref(), Some(EMAIL_ERROR));
            assert!(form.errors().entities.is_none());

            assert!(transport.sent().is_empty(), "no request for {email:?}");
        }
    }

    #[tokio::test]
    async fn valid_form_sends_exactly_one_request() {
        let transport = RecordingTransport::replying(200);
        let mut ctrl = SubmissionController::new();
        let mut form = valid_form();

        let result = ctrl.submit(&mut form, &transport).await;
        assert_eq!(result, Some(SubmitResult::Success));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            StatsRequest {
                variations: vec!["gene-1".into(), "gene-2".into()],
                replyto: "user@example.com".into(),
                stat_type: StatisticType::TotalCount,
            }
        );
    }

    #[tokio::test]
    async fn blank_line_entity_is_submitted() {
        let transport = RecordingTransport::replying(200);
        let mut ctrl = SubmissionController::new();
        let mut form = FormState::new();
        form.set_entities("");
        form.set_email("user@example.com");

        assert!(ctrl.submit(&mut form, &transport).await.is_some());
        assert_eq!(transport.sent()[0].variations, vec![String::new()]);
    }

    #[tokio::test]
    async fn outcome_messages_follow_response() {
        let mut ctrl = SubmissionController::new();

        let mut form = valid_form();
        ctrl.submit(&mut form, &RecordingTransport::replying(200))
            .await;
        assert_eq!(ctrl.outcome(), Some(SUCCESS_MESSAGE));

        ctrl.submit(&mut form, &RecordingTransport::replying(404))
            .await;
        assert_eq!(ctrl.outcome(), Some(WRONG_FORMAT_MESSAGE));

        ctrl.submit(&mut form, &RecordingTransport::failing("Network Error"))
            .await;
        assert_eq!(ctrl.outcome(), Some("Network Error"));
    }

    #[tokio::test]
    async fn failed_validation_keeps_previous_outcome() {
        let mut ctrl = SubmissionController::new();
        let mut form = valid_form();
        ctrl.submit(&mut form, &RecordingTransport::replying(200))
            .await;

        form.set_email("broken");
        ctrl.submit(&mut form, &RecordingTransport::replying(200))
            .await;
        assert_eq!(ctrl.outcome(), Some(SUCCESS_MESSAGE));
    }

    #[tokio::test]
    async fn dismiss_always_clears_outcome() {
        let mut ctrl = SubmissionController::new();
        ctrl.dismiss();
        assert!(ctrl.outcome().is_none());

        let mut form = valid_form();
        ctrl.submit(&mut form, &RecordingTransport::failing("timed out"))
            .await;
        assert!(ctrl.outcome().is_some());
        ctrl.dismiss();
        assert!(ctrl.outcome().is_none());
    }

    #[test]
    fn status_code_is_not_interpolated() {
        assert_eq!(
            SubmitResult::ProtocolError(503).message(),
            WRONG_FORMAT_MESSAGE
        );
    }
}
