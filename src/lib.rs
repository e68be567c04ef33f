//! Multi-step registration form: validated step progression, registration
//! code derivation and a single in-flight submission with manual retry.

pub mod cli;
pub mod form;
pub mod presentation;
pub mod trace;
pub mod transport;
pub mod wizard;

pub use form::{
    definition::FormDefinition,
    form_model::{Field, FieldKind, FieldValue, FormModel, Step},
    matricula::{RegistrationCode, recompute},
    validator::is_step_valid,
};
pub use presentation::presenter::{Presenter, RecordingPresenter};
pub use transport::http::{HttpResponse, HttpTransport, MockTransport, TransportError};
pub use wizard::{
    error::WizardError,
    step_controller::AdvanceOutcome,
    submission::{SubmissionState, SubmitOutcome},
    wizard::{RegistrationWizard, WizardOptions},
};
