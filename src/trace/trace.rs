use serde::Serialize;

use crate::wizard::submission::SubmissionState;

/// One operator-facing diagnostic record, written as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: i64,
    pub seq: u64,

    pub event: String,
    pub step: usize,
    pub submission_state: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(event: &str, step: usize, state: SubmissionState) -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            seq: 0,
            event: event.to_string(),
            step,
            submission_state: format!("{:?}", state),
            fingerprint: None,
            detail: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl ToString) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
