use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{presentation::presenter::Presenter, wizard::error::WizardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Select,
    MultiSelect,
    File,
}

impl FieldKind {
    fn expected_shape(self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::Select => "text",
            FieldKind::MultiSelect => "selection",
            FieldKind::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Selected(BTreeSet<String>),
    Files(Vec<FileAttachment>),
}

impl FieldValue {
    pub fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Select => FieldValue::Text(String::new()),
            FieldKind::MultiSelect => FieldValue::Selected(BTreeSet::new()),
            FieldKind::File => FieldValue::Files(Vec::new()),
        }
    }

    pub fn selected<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Selected(options.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Text(_), FieldKind::Text)
                | (FieldValue::Text(_), FieldKind::Select)
                | (FieldValue::Selected(_), FieldKind::MultiSelect)
                | (FieldValue::Files(_), FieldKind::File)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub options: Vec<String>,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            required: false,
            options: Vec::new(),
            value: FieldValue::empty_for(kind),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Check shape and offered options before a value is stored.
    fn check_value(&self, value: &FieldValue) -> Result<(), WizardError> {
        if !value.fits(self.kind) {
            return Err(WizardError::ValueKindMismatch {
                field: self.name.clone(),
                expected: self.kind.expected_shape(),
            });
        }
        if self.options.is_empty() {
            return Ok(());
        }

        let unknown = match value {
            FieldValue::Text(s) if self.kind == FieldKind::Select && !s.is_empty() => {
                (!self.options.contains(s)).then(|| s.clone())
            }
            FieldValue::Selected(set) => set.iter().find(|o| !self.options.contains(o)).cloned(),
            _ => None,
        };

        match unknown {
            Some(option) => Err(WizardError::UnknownOption {
                field: self.name.clone(),
                option,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub index: usize,
    pub title: String,
    pub fields: Vec<Field>,
}

/// Published after every accepted value change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub step: usize,
}

/// Receives every `FieldChange` after the form has been updated.
pub trait FieldSubscriber {
    fn on_field_change(
        &mut self,
        change: &FieldChange,
        form: &FormModel,
        presenter: &mut dyn Presenter,
    );
}

#[derive(Debug, Clone)]
pub struct FormModel {
    steps: Vec<Step>,
    // name -> (step index, position within step)
    index: HashMap<String, (usize, usize)>,
}

impl FormModel {
    pub fn new(steps: Vec<Step>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::Definition("form has no steps".into()));
        }

        let mut index = HashMap::new();
        let mut steps = steps;
        for (step_idx, step) in steps.iter_mut().enumerate() {
            step.index = step_idx;
            for (pos, field) in step.fields.iter().enumerate() {
                if index.insert(field.name.clone(), (step_idx, pos)).is_some() {
                    return Err(WizardError::Definition(format!(
                        "duplicate field name '{}'",
                        field.name
                    )));
                }
            }
        }

        Ok(Self { steps, index })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        let (s, p) = *self.index.get(name)?;
        Some(&self.steps[s].fields[p])
    }

    pub fn step_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|(s, _)| *s)
    }

    /// Text value of a field, empty when the field is missing or not textual.
    pub fn text(&self, name: &str) -> &str {
        self.field(name)
            .and_then(|f| f.value.as_text())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, name: &str, value: FieldValue) -> Result<FieldChange, WizardError> {
        let (s, p) = *self
            .index
            .get(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;

        let field = &mut self.steps[s].fields[p];
        field.check_value(&value)?;
        field.value = value;

        Ok(FieldChange {
            field: name.to_string(),
            step: s,
        })
    }

    /// All fields in step order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }
}
