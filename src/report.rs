//! Outcome report for non-interactive runs.
//!
//! One report per invocation, rendered either as text lines or as JSON.

use crate::form::FormState;
use crate::model::{StatsRequest, SubmitResult};
use crate::validation::ValidationErrors;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Report {
    pub request: Option<StatsRequest>,
    pub status: &'static str,
    pub http_status: Option<u16>,
    pub outcome: Option<String>,
    pub errors: ValidationErrors,
}

impl Report {
    /// Build from the form after a submit attempt; `result` is `None` when validation blocked it.
    pub fn new(form: &FormState, result: Option<&SubmitResult>) -> Self {
        match result {
            Some(r) => Report {
                request: Some(form.to_request()),
                status: r.kind(),
                http_status: r.http_status(),
                outcome: Some(r.message()),
                errors: form.errors().clone(),
            },
            None => Report {
                request: None,
                status: "invalid",
                http_status: None,
                outcome: None,
                errors: form.errors().clone(),
            },
        }
    }

    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(req) = self.request.as_ref() {
            lines.push(format!("Entities: {} submitted", req.variations.len()));
            lines.push(format!("Statistic: {}", req.stat_type.label()));
            lines.push(format!("Reply to: {}", req.replyto));
        }
        if let Some(e) = self.errors.email.as_deref() {
            lines.push(format!("Email: {e}"));
        }
        if let Some(e) = self.errors.entities.as_deref() {
            lines.push(format!("Entities: {e}"));
        }
        if let Some(outcome) = self.outcome.as_deref() {
            lines.push(outcome.to_string());
        }
        lines
    }
}
