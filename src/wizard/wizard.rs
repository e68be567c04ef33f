use crate::{
    form::{
        form_model::{FieldChange, FieldSubscriber, FieldValue, FormModel},
        matricula::{DEFAULT_ID_FIELD, DEFAULT_SURNAME_FIELD, MatriculaGenerator, RegistrationCode},
    },
    presentation::{
        background::{BackgroundCycle, default_backgrounds},
        presenter::Presenter,
    },
    trace::{logger::TraceLogger, trace::TraceEvent},
    transport::http::{HttpResponse, HttpTransport, TransportError, classify},
    wizard::{
        error::WizardError,
        step_controller::{AdvanceOutcome, StepController},
        submission::{SubmissionController, SubmissionState, SubmissionTicket, SubmitOutcome},
    },
};

#[derive(Debug, Clone)]
pub struct WizardOptions {
    pub endpoint: String,
    pub backgrounds: Vec<String>,
    pub surname_field: String,
    pub id_field: String,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            backgrounds: default_backgrounds(),
            surname_field: DEFAULT_SURNAME_FIELD.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }
}

/// Owns the form, both controllers and the collaborators, and routes every
/// field change to the subscribers.
pub struct RegistrationWizard<P: Presenter, T: HttpTransport> {
    form: FormModel,
    steps: StepController,
    generator: MatriculaGenerator,
    submission: SubmissionController,
    subscribers: Vec<Box<dyn FieldSubscriber>>,
    presenter: P,
    transport: T,
    tracer: TraceLogger,
}

impl<P: Presenter, T: HttpTransport> RegistrationWizard<P, T> {
    pub fn new(
        form: FormModel,
        options: WizardOptions,
        mut presenter: P,
        transport: T,
        tracer: TraceLogger,
    ) -> Self {
        let steps = StepController::start(
            &form,
            BackgroundCycle::new(options.backgrounds),
            &mut presenter,
        );
        let mut generator = MatriculaGenerator::new(&options.surname_field, &options.id_field);
        generator.refresh(&form, &mut presenter);

        Self {
            form,
            steps,
            generator,
            submission: SubmissionController::new(&options.endpoint),
            subscribers: Vec::new(),
            presenter,
            transport,
            tracer,
        }
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn current_step(&self) -> usize {
        self.steps.current()
    }

    pub fn is_last_step(&self) -> bool {
        self.steps.is_last()
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission.state()
    }

    pub fn code(&self) -> Option<&RegistrationCode> {
        self.generator.current()
    }

    pub fn background_index(&self) -> usize {
        self.steps.background_index()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Names of the fields the registration code is derived from.
    pub fn code_source_fields(&self) -> (String, String) {
        let (surname, id) = self.generator.source_fields();
        (surname.to_string(), id.to_string())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn tracer(&self) -> &TraceLogger {
        &self.tracer
    }

    /// Register an extra listener for field changes.
    pub fn subscribe(&mut self, subscriber: Box<dyn FieldSubscriber>) {
        self.subscribers.push(subscriber);
    }

    fn ensure_interactive(&self) -> Result<(), WizardError> {
        if self.submission.controls_enabled() {
            Ok(())
        } else {
            Err(WizardError::ControlsLocked)
        }
    }

    pub fn set_value(&mut self, name: &str, value: FieldValue) -> Result<(), WizardError> {
        self.ensure_interactive()?;
        let change = self.form.set_value(name, value)?;
        self.publish(&change);
        Ok(())
    }

    pub fn set_text(&mut self, name: &str, value: &str) -> Result<(), WizardError> {
        self.set_value(name, FieldValue::Text(value.to_string()))
    }

    fn publish(&mut self, change: &FieldChange) {
        self.steps
            .on_field_change(change, &self.form, &mut self.presenter);
        self.generator
            .on_field_change(change, &self.form, &mut self.presenter);
        for subscriber in &mut self.subscribers {
            subscriber.on_field_change(change, &self.form, &mut self.presenter);
        }
    }

    /// The per-step "next" control.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, WizardError> {
        self.ensure_interactive()?;
        let from = self.steps.current();
        let state = self.submission.state();

        match self.steps.advance(&self.form, &mut self.presenter) {
            Ok(outcome) => {
                if let AdvanceOutcome::Advanced(to) = outcome {
                    self.tracer.log(
                        TraceEvent::now("step_advanced", to, state)
                            .with_detail(format!("from step {}", from)),
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                self.tracer
                    .log(TraceEvent::now("advance_rejected", from, state).with_detail(&e));
                Err(e)
            }
        }
    }

    /// The manual "generate code" control.
    pub fn generate_code(&mut self) -> Result<RegistrationCode, WizardError> {
        self.ensure_interactive()?;
        let step = self.steps.current();
        let state = self.submission.state();

        let result = self.generator.generate_manual(&self.form, &mut self.presenter);
        let event = match &result {
            Ok(code) => TraceEvent::now("code_generated", step, state).with_detail(code),
            Err(_) => TraceEvent::now("code_missing", step, state),
        };
        self.tracer.log(event);
        result
    }

    fn ensure_last_step(&self) -> Result<(), WizardError> {
        if self.steps.is_last() {
            Ok(())
        } else {
            Err(WizardError::NotOnLastStep {
                current: self.steps.current(),
            })
        }
    }

    /// The submit control: gates, one request, outcome handling.
    pub fn submit(&mut self) -> Result<SubmitOutcome, WizardError> {
        self.ensure_last_step()?;
        self.submission.submit(
            &self.form,
            &mut self.generator,
            &mut self.transport,
            &mut self.presenter,
            &self.tracer,
        )
    }

    /// First half of `submit` for hosts that perform the request themselves.
    pub fn begin_submit(&mut self) -> Result<Option<SubmissionTicket>, WizardError> {
        self.ensure_last_step()?;
        self.submission.begin(
            &self.form,
            &mut self.generator,
            &mut self.presenter,
            &self.tracer,
            chrono::Utc::now(),
        )
    }

    /// Second half of `submit`: apply the response to a ticket from `begin_submit`.
    pub fn complete_submit(
        &mut self,
        ticket: SubmissionTicket,
        response: Result<HttpResponse, TransportError>,
    ) -> SubmitOutcome {
        self.submission.finish(
            ticket,
            classify(response),
            self.form.last_index(),
            &mut self.presenter,
            &self.tracer,
        )
    }

    pub fn endpoint(&self) -> &str {
        self.submission.endpoint()
    }
}
