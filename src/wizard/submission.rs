use chrono::{DateTime, Utc};

use crate::{
    form::{form_model::FormModel, matricula::MatriculaGenerator, validator::is_step_valid},
    presentation::presenter::Presenter,
    trace::{logger::TraceLogger, trace::TraceEvent},
    transport::{
        http::{FailureDetail, HttpTransport, SubmissionOutcome, classify},
        payload::Payload,
    },
    wizard::error::WizardError,
};

pub const LOADING_TEXT: &str = "\u{23f3} Sending data...";
pub const SUCCESS_TEXT: &str = "\u{2705} Data sent successfully";
pub const FAILURE_TEXT: &str = "\u{274c} Error sending data";
pub const CONNECTION_ERROR_TEXT: &str = "\u{274c} Connection error";

pub const INCOMPLETE_WARNING: &str = "Complete all required fields before submitting.";
pub const MISSING_CODE_WARNING: &str = "Generate the registration code before submitting.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Proof that a submission is in flight. Only `begin` creates one and
/// `finish` consumes it.
#[derive(Debug)]
pub struct SubmissionTicket {
    payload: Payload,
    fingerprint: String,
    attempt: u32,
}

impl SubmissionTicket {
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Already in flight or already succeeded; no request issued
    Ignored,
    Succeeded,
    Failed(FailureDetail),
}

#[derive(Debug, Clone)]
pub struct SubmissionController {
    state: SubmissionState,
    endpoint: String,
    attempts: u32,
}

impl SubmissionController {
    pub fn new(endpoint: &str) -> Self {
        Self {
            state: SubmissionState::Idle,
            endpoint: endpoint.to_string(),
            attempts: 0,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Form controls are interactive only before the first attempt and after a failure.
    pub fn controls_enabled(&self) -> bool {
        matches!(self.state, SubmissionState::Idle | SubmissionState::Failed)
    }

    /// Check the gates and enter `InFlight`.
    ///
    /// Returns `Ok(None)` when a submission is already in flight or has
    /// succeeded. Gate failures warn the user and leave the state untouched.
    pub fn begin(
        &mut self,
        form: &FormModel,
        generator: &mut MatriculaGenerator,
        presenter: &mut dyn Presenter,
        tracer: &TraceLogger,
        submitted_at: DateTime<Utc>,
    ) -> Result<Option<SubmissionTicket>, WizardError> {
        let last = form.last_index();

        if !form.step(last).is_some_and(is_step_valid) {
            presenter.show_warning(INCOMPLETE_WARNING);
            return Err(WizardError::Validation { step: last });
        }

        let code = match generator.refresh(form, presenter) {
            Some(code) => code.clone(),
            None => {
                presenter.show_warning(MISSING_CODE_WARNING);
                tracer.log(TraceEvent::now("code_missing", last, self.state));
                return Err(WizardError::Generation);
            }
        };

        if !self.controls_enabled() {
            tracer.log(TraceEvent::now("submit_ignored", last, self.state));
            return Ok(None);
        }

        self.state = SubmissionState::InFlight;
        self.attempts += 1;
        presenter.set_controls_enabled(false);
        presenter.show_submit_control(false);
        presenter.set_loading_text(LOADING_TEXT);

        let payload = Payload::from_form(form, &code, submitted_at);
        let fingerprint = payload.fingerprint();

        tracer.log(
            TraceEvent::now("submit_started", last, self.state)
                .with_fingerprint(&fingerprint)
                .with_detail(format!("attempt {} to {}", self.attempts, self.endpoint)),
        );

        Ok(Some(SubmissionTicket {
            payload,
            fingerprint,
            attempt: self.attempts,
        }))
    }

    /// Apply the response of the request started by `begin`.
    pub fn finish(
        &mut self,
        ticket: SubmissionTicket,
        outcome: SubmissionOutcome,
        step: usize,
        presenter: &mut dyn Presenter,
        tracer: &TraceLogger,
    ) -> SubmitOutcome {
        match outcome {
            SubmissionOutcome::Success => {
                self.state = SubmissionState::Succeeded;
                presenter.set_loading_text(SUCCESS_TEXT);
                tracer.log(
                    TraceEvent::now("submit_succeeded", step, self.state)
                        .with_fingerprint(ticket.fingerprint)
                        .with_detail(format!("attempt {}", ticket.attempt)),
                );
                SubmitOutcome::Succeeded
            }
            SubmissionOutcome::Failure(detail) => {
                self.state = SubmissionState::Failed;
                let text = match detail {
                    FailureDetail::Rejected { .. } => FAILURE_TEXT,
                    FailureDetail::Transport(_) => CONNECTION_ERROR_TEXT,
                };
                presenter.set_loading_text(text);
                presenter.set_controls_enabled(true);
                presenter.show_submit_control(true);
                tracer.log(
                    TraceEvent::now("submit_failed", step, self.state)
                        .with_fingerprint(ticket.fingerprint)
                        .with_detail(&detail),
                );
                SubmitOutcome::Failed(detail)
            }
        }
    }

    /// `begin`, one `post`, `finish`.
    pub fn submit(
        &mut self,
        form: &FormModel,
        generator: &mut MatriculaGenerator,
        transport: &mut dyn HttpTransport,
        presenter: &mut dyn Presenter,
        tracer: &TraceLogger,
    ) -> Result<SubmitOutcome, WizardError> {
        let Some(ticket) = self.begin(form, generator, presenter, tracer, Utc::now())? else {
            return Ok(SubmitOutcome::Ignored);
        };

        let outcome = classify(transport.post(&self.endpoint, ticket.payload()));
        Ok(self.finish(ticket, outcome, form.last_index(), presenter, tracer))
    }
}
