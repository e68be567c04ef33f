use registration_wizard::{
    Field, FieldKind, FieldValue, FormModel, MockTransport, RecordingPresenter, RegistrationWizard,
    Step, WizardOptions,
    form::form_model::FileAttachment,
    trace::logger::TraceLogger,
};

pub const ENDPOINT: &str = "https://example.com/registro";

/// Three steps: identity, modules (multi-select), documents (file).
pub fn sample_form() -> FormModel {
    FormModel::new(vec![
        Step {
            index: 0,
            title: "Identity".into(),
            fields: vec![
                Field::new("apellidoPaterno", FieldKind::Text).required(),
                Field::new("ci", FieldKind::Text).required(),
                Field::new("apellidoMaterno", FieldKind::Text),
            ],
        },
        Step {
            index: 1,
            title: "Modules".into(),
            fields: vec![
                Field::new("modulos", FieldKind::MultiSelect)
                    .required()
                    .with_options(["M1", "M2", "M3"]),
                Field::new("turno", FieldKind::Select).with_options(["Mañana", "Tarde"]),
            ],
        },
        Step {
            index: 2,
            title: "Documents".into(),
            fields: vec![
                Field::new("fotoCi", FieldKind::File).required(),
                Field::new("correo", FieldKind::Text),
            ],
        },
    ])
    .unwrap()
}

pub fn options() -> WizardOptions {
    WizardOptions {
        endpoint: ENDPOINT.into(),
        ..WizardOptions::default()
    }
}

pub fn wizard_with(transport: MockTransport) -> RegistrationWizard<RecordingPresenter, MockTransport> {
    RegistrationWizard::new(
        sample_form(),
        options(),
        RecordingPresenter::new(),
        transport,
        TraceLogger::in_memory(),
    )
}

pub fn wizard() -> RegistrationWizard<RecordingPresenter, MockTransport> {
    wizard_with(MockTransport::new())
}

pub fn fill_identity(w: &mut RegistrationWizard<RecordingPresenter, MockTransport>) {
    w.set_text("apellidoPaterno", "Gomez").unwrap();
    w.set_text("ci", "987654321").unwrap();
}

/// Fill every required field and advance to the last step.
pub fn complete_to_last_step(w: &mut RegistrationWizard<RecordingPresenter, MockTransport>) {
    fill_identity(w);
    w.advance().unwrap();
    w.set_value("modulos", FieldValue::selected(["M1", "M3"])).unwrap();
    w.advance().unwrap();
    w.set_value(
        "fotoCi",
        FieldValue::Files(vec![FileAttachment::new("ci.pdf", b"%PDF".to_vec())]),
    )
    .unwrap();
    assert!(w.is_last_step());
}
