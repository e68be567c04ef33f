use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};

use crate::transport::payload::{Payload, PayloadValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request never produced a response (DNS, refused, timeout, ...)
    Connection(String),

    /// Building the request or reading the response body failed
    Body(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Connection(msg) => write!(f, "Connection error: {}", msg),
            TransportError::Body(msg) => write!(f, "Request/response body error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

pub trait HttpTransport {
    fn post(&mut self, endpoint: &str, payload: &Payload) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn post(&mut self, endpoint: &str, payload: &Payload) -> Result<HttpResponse, TransportError> {
        (**self).post(endpoint, payload)
    }
}

// ============================================================================
// Outcome classification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDetail {
    Rejected { status: u16, body: String },
    Transport(TransportError),
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureDetail::Rejected { status, body } => {
                write!(f, "status {}: {}", status, body)
            }
            FailureDetail::Transport(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failure(FailureDetail),
}

/// True when the body is a JSON object with `"status": "ok"`.
pub fn body_reports_ok(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("status").and_then(|s| s.as_str()).map(|s| s == "ok"))
        .unwrap_or(false)
}

/// Success is a 2xx status or an `{"status":"ok"}` body, whichever holds.
pub fn classify(result: Result<HttpResponse, TransportError>) -> SubmissionOutcome {
    match result {
        Ok(resp) if resp.is_ok() || body_reports_ok(&resp.body) => SubmissionOutcome::Success,
        Ok(resp) => SubmissionOutcome::Failure(FailureDetail::Rejected {
            status: resp.status,
            body: resp.body,
        }),
        Err(e) => SubmissionOutcome::Failure(FailureDetail::Transport(e)),
    }
}

// ============================================================================
// reqwest transport
// ============================================================================

/// Posts the payload as `multipart/form-data`.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(Self { client })
    }

    fn build_form(payload: &Payload) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for (name, value) in payload.entries() {
            form = match value {
                PayloadValue::Text(s) => form.text(name.clone(), s.clone()),
                PayloadValue::File(file) => {
                    let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime {
                        part = part
                            .mime_str(mime)
                            .map_err(|e| TransportError::Body(e.to_string()))?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(&mut self, endpoint: &str, payload: &Payload) -> Result<HttpResponse, TransportError> {
        let form = Self::build_form(payload)?;
        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// Mock transport (tests and dry runs)
// ============================================================================

/// Replays queued responses and records every payload it receives.
/// With an empty queue it answers `200 {"status":"ok"}`.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub responses: VecDeque<Result<HttpResponse, TransportError>>,
    pub requests: Vec<(String, Payload)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, response: HttpResponse) -> Self {
        self.responses.push_back(Ok(response));
        self
    }

    pub fn fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

impl HttpTransport for MockTransport {
    fn post(&mut self, endpoint: &str, payload: &Payload) -> Result<HttpResponse, TransportError> {
        self.requests.push((endpoint.to_string(), payload.clone()));
        self.responses
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, r#"{"status":"ok"}"#)))
    }
}
