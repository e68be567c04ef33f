use crate::form::form_model::{Field, FieldValue, Step};

/// Whether a single field passes its kind-specific rule.
///
/// Multi-selects need one selected option, file fields one attachment,
/// everything else a value that is non-empty after trimming. Optional
/// fields are always satisfied.
pub fn is_field_satisfied(field: &Field) -> bool {
    if !field.required {
        return true;
    }

    match &field.value {
        FieldValue::Selected(set) => !set.is_empty(),
        FieldValue::Files(files) => !files.is_empty(),
        FieldValue::Text(s) => !s.trim().is_empty(),
    }
}

pub fn is_step_valid(step: &Step) -> bool {
    step.fields.iter().all(is_field_satisfied)
}

/// Names of the required fields still blocking the step.
pub fn missing_fields(step: &Step) -> Vec<&str> {
    step.fields
        .iter()
        .filter(|f| !is_field_satisfied(f))
        .map(|f| f.name.as_str())
        .collect()
}
