use std::fmt;

use serde::Serialize;

use crate::{
    form::form_model::{FieldChange, FieldSubscriber, FormModel},
    presentation::presenter::Presenter,
    wizard::error::WizardError,
};

pub const CODE_SEPARATOR: char = '-';
pub const ID_SUFFIX_DIGITS: usize = 4;

pub const DEFAULT_SURNAME_FIELD: &str = "apellidoPaterno";
pub const DEFAULT_ID_FIELD: &str = "ci";

/// Registration code ("matrícula"): surname initial + separator + last four id digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RegistrationCode(String);

impl RegistrationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the code, or `None` when the surname is blank or the id has
/// fewer than four digits. Non-digit characters in `id` are ignored.
pub fn recompute(surname: &str, id: &str) -> Option<RegistrationCode> {
    let surname = surname.trim();
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();

    let initial = surname.chars().next()?;
    if digits.len() < ID_SUFFIX_DIGITS {
        return None;
    }

    let mut code: String = initial.to_uppercase().collect();
    code.push(CODE_SEPARATOR);
    code.push_str(&digits[digits.len() - ID_SUFFIX_DIGITS..]);
    Some(RegistrationCode(code))
}

pub fn display_text(code: Option<&RegistrationCode>) -> String {
    match code {
        Some(c) => format!("Registration code: {}", c),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct MatriculaGenerator {
    surname_field: String,
    id_field: String,
    current: Option<RegistrationCode>,
}

impl Default for MatriculaGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SURNAME_FIELD, DEFAULT_ID_FIELD)
    }
}

impl MatriculaGenerator {
    pub fn new(surname_field: &str, id_field: &str) -> Self {
        Self {
            surname_field: surname_field.to_string(),
            id_field: id_field.to_string(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&RegistrationCode> {
        self.current.as_ref()
    }

    /// (surname field, id field)
    pub fn source_fields(&self) -> (&str, &str) {
        (&self.surname_field, &self.id_field)
    }

    pub fn is_source(&self, field: &str) -> bool {
        field == self.surname_field || field == self.id_field
    }

    /// Re-run the derivation against the form and publish the result.
    pub fn refresh(
        &mut self,
        form: &FormModel,
        presenter: &mut dyn Presenter,
    ) -> Option<&RegistrationCode> {
        self.current = recompute(form.text(&self.surname_field), form.text(&self.id_field));
        presenter.show_code(&display_text(self.current.as_ref()));
        self.current.as_ref()
    }

    /// Manual "generate" button: same derivation, but an empty result warns the user.
    pub fn generate_manual(
        &mut self,
        form: &FormModel,
        presenter: &mut dyn Presenter,
    ) -> Result<RegistrationCode, WizardError> {
        match self.refresh(form, presenter).cloned() {
            Some(code) => Ok(code),
            None => {
                let err = WizardError::Generation;
                presenter.show_warning(&err.user_message());
                Err(err)
            }
        }
    }
}

impl FieldSubscriber for MatriculaGenerator {
    fn on_field_change(
        &mut self,
        change: &FieldChange,
        form: &FormModel,
        presenter: &mut dyn Presenter,
    ) {
        if self.is_source(&change.field) {
            self.refresh(form, presenter);
        }
    }
}
