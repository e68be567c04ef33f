use std::fmt;

#[derive(Debug)]
pub enum WizardError {
    /// A required field of the step is not satisfied (advance or final submit gate)
    Validation { step: usize },

    /// Registration code could not be derived from surname + identification
    Generation,

    /// Form controls are disabled (submission in flight or already succeeded)
    ControlsLocked,

    /// Submit control lives on the last step only
    NotOnLastStep { current: usize },

    /// No field with this name exists in the form
    UnknownField(String),

    /// Value shape does not match the field kind
    ValueKindMismatch { field: String, expected: &'static str },

    /// Selected option is not offered by the field
    UnknownOption { field: String, option: String },

    /// Form definition is inconsistent (duplicate names, no steps, ...)
    Definition(String),

    /// Reading a form, values or attachment file failed
    Io { context: String, source: std::io::Error },

    /// YAML parsing failed (form definition or values file)
    Yaml { context: String, source: serde_yaml::Error },
}

impl WizardError {
    /// Message shown to the user for gate failures.
    pub fn user_message(&self) -> String {
        match self {
            WizardError::Validation { .. } => {
                "Complete all required fields of this step before continuing.".to_string()
            }
            WizardError::Generation => {
                "Fill in the surname and identification number to generate the registration code."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardError::Validation { step } => {
                write!(f, "Step {} has unsatisfied required fields", step)
            }
            WizardError::Generation => {
                write!(f, "Registration code could not be generated")
            }
            WizardError::ControlsLocked => {
                write!(f, "Form controls are disabled")
            }
            WizardError::NotOnLastStep { current } => {
                write!(f, "Submit is only available on the last step (current step {})", current)
            }
            WizardError::UnknownField(name) => {
                write!(f, "Unknown field '{}'", name)
            }
            WizardError::ValueKindMismatch { field, expected } => {
                write!(f, "Field '{}' expects a {} value", field, expected)
            }
            WizardError::UnknownOption { field, option } => {
                write!(f, "Field '{}' has no option '{}'", field, option)
            }
            WizardError::Definition(msg) => {
                write!(f, "Invalid form definition: {}", msg)
            }
            WizardError::Io { context, source } => {
                write!(f, "I/O error ({}): {}", context, source)
            }
            WizardError::Yaml { context, source } => {
                write!(f, "YAML error ({}): {}", context, source)
            }
        }
    }
}

impl std::error::Error for WizardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WizardError::Io { source, .. } => Some(source),
            WizardError::Yaml { source, .. } => Some(source),
            _ => None,
        }
    }
}
