use crate::{
    form::{
        form_model::{FieldChange, FieldSubscriber, FormModel},
        validator::is_step_valid,
    },
    presentation::{background::BackgroundCycle, presenter::Presenter},
    wizard::error::WizardError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the given step index
    Advanced(usize),
    /// Already on the last step, nothing to move to
    AtLastStep,
}

/// Forward-only step state machine.
#[derive(Debug, Clone)]
pub struct StepController {
    current: usize,
    last: usize,
    backgrounds: BackgroundCycle,
}

impl StepController {
    /// Activate step 0, publish every step's advance state and the first background.
    pub fn start(
        form: &FormModel,
        backgrounds: BackgroundCycle,
        presenter: &mut dyn Presenter,
    ) -> Self {
        let controller = Self {
            current: 0,
            last: form.last_index(),
            backgrounds,
        };

        presenter.set_step_active(0, true);
        for step in form.steps() {
            presenter.set_advance_enabled(step.index, is_step_valid(step));
        }
        controller.backgrounds.show_current(presenter);
        controller
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_last(&self) -> bool {
        self.current == self.last
    }

    pub fn background_index(&self) -> usize {
        self.backgrounds.index()
    }

    pub fn advance(
        &mut self,
        form: &FormModel,
        presenter: &mut dyn Presenter,
    ) -> Result<AdvanceOutcome, WizardError> {
        let valid = form.step(self.current).is_some_and(is_step_valid);
        if !valid {
            let err = WizardError::Validation { step: self.current };
            presenter.show_warning(&err.user_message());
            return Err(err);
        }

        if self.is_last() {
            return Ok(AdvanceOutcome::AtLastStep);
        }

        presenter.set_step_active(self.current, false);
        self.current = (self.current + 1).min(self.last);
        presenter.set_step_active(self.current, true);
        self.backgrounds.advance(presenter);

        Ok(AdvanceOutcome::Advanced(self.current))
    }
}

impl FieldSubscriber for StepController {
    fn on_field_change(
        &mut self,
        change: &FieldChange,
        form: &FormModel,
        presenter: &mut dyn Presenter,
    ) {
        if let Some(step) = form.step(change.step) {
            presenter.set_advance_enabled(step.index, is_step_valid(step));
        }
    }
}
