use chrono::{DateTime, SecondsFormat, Utc};

use crate::form::{
    form_model::{FieldValue, FileAttachment, FormModel},
    matricula::RegistrationCode,
};

pub const CODE_FIELD: &str = "matricula";
pub const TIMESTAMP_FIELD: &str = "fechaRegistro";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    Text(String),
    File(FileAttachment),
}

/// Ordered multipart entries. Names may repeat (multi-select, several files).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    entries: Vec<(String, PayloadValue)>,
}

impl Payload {
    /// Collect every field, the registration code and the submission time.
    pub fn from_form(form: &FormModel, code: &RegistrationCode, submitted_at: DateTime<Utc>) -> Self {
        let mut payload = Payload::default();

        for field in form.fields() {
            // the derived code always wins over a same-named form field
            if field.name == CODE_FIELD {
                continue;
            }
            match &field.value {
                FieldValue::Text(s) => payload.push_text(&field.name, s),
                FieldValue::Selected(set) => {
                    // offered options first, in declaration order
                    let declared = field.options.iter().filter(|o| set.contains(*o));
                    let undeclared = set.iter().filter(|o| !field.options.contains(*o));
                    for option in declared.chain(undeclared) {
                        payload.push_text(&field.name, option);
                    }
                }
                FieldValue::Files(files) => {
                    for file in files {
                        payload
                            .entries
                            .push((field.name.clone(), PayloadValue::File(file.clone())));
                    }
                }
            }
        }

        payload.push_text(CODE_FIELD, code.as_str());
        payload.push_text(
            TIMESTAMP_FIELD,
            &submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        payload
    }

    pub fn push_text(&mut self, name: &str, value: &str) {
        self.entries
            .push((name.to_string(), PayloadValue::Text(value.to_string())));
    }

    pub fn entries(&self) -> &[(String, PayloadValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First text value under `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts(name).into_iter().next()
    }

    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, v)| match v {
                PayloadValue::Text(s) => Some(s.as_str()),
                PayloadValue::File(_) => None,
            })
            .collect()
    }

    pub fn files(&self, name: &str) -> Vec<&FileAttachment> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, v)| match v {
                PayloadValue::File(f) => Some(f),
                PayloadValue::Text(_) => None,
            })
            .collect()
    }

    /// SHA-1 over the content without the timestamp, so retries of the
    /// same data share a fingerprint in the trace log.
    pub fn fingerprint(&self) -> String {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        for (name, value) in &self.entries {
            if name == TIMESTAMP_FIELD {
                continue;
            }
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            match value {
                PayloadValue::Text(s) => hasher.update(s.as_bytes()),
                PayloadValue::File(f) => {
                    hasher.update(f.file_name.as_bytes());
                    hasher.update(&f.bytes);
                }
            }
            hasher.update([0xffu8]);
        }
        format!("{:x}", hasher.finalize())
    }
}
