use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    form::form_model::{Field, FieldKind, FieldValue, FileAttachment, FormModel, Step},
    wizard::error::WizardError,
};

const BUILTIN_FORM: &str = include_str!("../../forms/registro.yaml");

/// A form description, deserialized from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormDefinition {
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDefinition {
    pub title: String,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FormDefinition {
    /// The registration form shipped with the crate.
    pub fn builtin() -> Result<Self, WizardError> {
        Self::from_yaml(BUILTIN_FORM, "builtin form")
    }

    pub fn from_yaml(content: &str, context: &str) -> Result<Self, WizardError> {
        serde_yaml::from_str(content).map_err(|source| WizardError::Yaml {
            context: context.to_string(),
            source,
        })
    }

    pub fn load(path: &str) -> Result<Self, WizardError> {
        let content = std::fs::read_to_string(path).map_err(|source| WizardError::Io {
            context: format!("reading form {}", path),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    /// `--form` given: load it, otherwise the builtin form.
    pub fn resolve(path: Option<&str>) -> Result<Self, WizardError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn to_model(&self) -> Result<FormModel, WizardError> {
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, s)| Step {
                index,
                title: s.title.clone(),
                fields: s.fields.iter().map(FieldDefinition::to_field).collect(),
            })
            .collect();
        FormModel::new(steps)
    }
}

impl FieldDefinition {
    fn to_field(&self) -> Field {
        let mut field = Field::new(&self.name, self.kind).with_options(self.options.clone());
        if let Some(label) = &self.label {
            field = field.with_label(label);
        }
        if self.required {
            field = field.required();
        }
        field
    }
}

// ============================================================================
// Values files
// ============================================================================

/// One entry of a values file: a scalar or a list.
///
/// File fields take paths, resolved relative to the values file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl RawValue {
    fn into_list(self) -> Vec<String> {
        match self {
            RawValue::One(s) => vec![s],
            RawValue::Many(v) => v,
        }
    }
}

pub fn parse_values(content: &str, context: &str) -> Result<BTreeMap<String, RawValue>, WizardError> {
    serde_yaml::from_str(content).map_err(|source| WizardError::Yaml {
        context: context.to_string(),
        source,
    })
}

/// Load a YAML values file and convert each entry to the shape its field expects.
pub fn load_values(path: &str, form: &FormModel) -> Result<Vec<(String, FieldValue)>, WizardError> {
    let content = std::fs::read_to_string(path).map_err(|source| WizardError::Io {
        context: format!("reading values {}", path),
        source,
    })?;
    let raw = parse_values(&content, path)?;
    let base = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
    convert_values(raw, form, base)
}

pub fn convert_values(
    raw: BTreeMap<String, RawValue>,
    form: &FormModel,
    base: &Path,
) -> Result<Vec<(String, FieldValue)>, WizardError> {
    let mut values = Vec::with_capacity(raw.len());

    for (name, raw_value) in raw {
        let field = form
            .field(&name)
            .ok_or_else(|| WizardError::UnknownField(name.clone()))?;

        let value = match (field.kind, raw_value) {
            (FieldKind::Text | FieldKind::Select, RawValue::One(s)) => FieldValue::Text(s),
            (FieldKind::Text | FieldKind::Select, RawValue::Many(_)) => {
                return Err(WizardError::ValueKindMismatch {
                    field: name,
                    expected: "text",
                });
            }
            (FieldKind::MultiSelect, raw_value) => FieldValue::selected(raw_value.into_list()),
            (FieldKind::File, raw_value) => {
                let files = raw_value
                    .into_list()
                    .iter()
                    .map(|p| read_attachment(&base.join(p)))
                    .collect::<Result<Vec<_>, _>>()?;
                FieldValue::Files(files)
            }
        };

        values.push((name, value));
    }

    Ok(values)
}

pub fn read_attachment(path: &Path) -> Result<FileAttachment, WizardError> {
    let bytes = std::fs::read(path).map_err(|source| WizardError::Io {
        context: format!("reading attachment {}", path.display()),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(FileAttachment::new(file_name, bytes))
}
