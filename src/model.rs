use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Resolved client settings, built once from CLI arguments.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Which aggregate the remote service computes for the submitted entities.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StatisticType {
    /// Total number of papers mentioning any of the entities
    #[default]
    #[value(alias = "total_count")]
    TotalCount,
    /// Number of entities mentioned in each paper
    #[value(alias = "vars_in_paper")]
    VarsInPaper,
    /// Number of papers mentioning each entity
    #[value(alias = "papers_per_var")]
    PapersPerVar,
}

impl StatisticType {
    pub const ALL: [StatisticType; 3] = [
        StatisticType::TotalCount,
        StatisticType::VarsInPaper,
        StatisticType::PapersPerVar,
    ];

    /// Wire token sent in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            StatisticType::TotalCount => "total_count",
            StatisticType::VarsInPaper => "vars_in_paper",
            StatisticType::PapersPerVar => "papers_per_var",
        }
    }

    /// Human-readable label for selectors and summaries.
    pub fn label(self) -> &'static str {
        match self {
            StatisticType::TotalCount => "Total Count",
            StatisticType::VarsInPaper => "Entities in each paper",
            StatisticType::PapersPerVar => "Papers mentioning each entity",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatisticType::TotalCount => StatisticType::VarsInPaper,
            StatisticType::VarsInPaper => StatisticType::PapersPerVar,
            StatisticType::PapersPerVar => StatisticType::TotalCount,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            StatisticType::TotalCount => StatisticType::PapersPerVar,
            StatisticType::VarsInPaper => StatisticType::TotalCount,
            StatisticType::PapersPerVar => StatisticType::VarsInPaper,
        }
    }
}

/// JSON body posted to the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRequest {
    pub variations: Vec<String>,
    pub replyto: String,
    #[serde(rename = "type")]
    pub stat_type: StatisticType,
}

/// Resolution of a dispatched request, independent of the transport used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Success,
    ProtocolError(u16),
    TransportError(String),
}

impl SubmitResult {
    /// Map an HTTP status code; only 200 counts as success.
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            SubmitResult::Success
        } else {
            SubmitResult::ProtocolError(status)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmitResult::Success)
    }

    /// Short machine-readable tag used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitResult::Success => "success",
            SubmitResult::ProtocolError(_) => "protocol_error",
            SubmitResult::TransportError(_) => "transport_error",
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            SubmitResult::Success => Some(200),
            SubmitResult::ProtocolError(code) => Some(*code),
            SubmitResult::TransportError(_) => None,
        }
    }
}
