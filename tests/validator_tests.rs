use proptest::prelude::*;

use registration_wizard::{
    Field, FieldKind, FieldValue, Step,
    form::{
        form_model::FileAttachment,
        validator::{is_field_satisfied, is_step_valid, missing_fields},
    },
};

fn step(fields: Vec<Field>) -> Step {
    Step {
        index: 0,
        title: "Test".into(),
        fields,
    }
}

fn with_value(field: Field, value: FieldValue) -> Field {
    Field { value, ..field }
}

// =========================================================================
// Kind-specific rules
// =========================================================================

#[test]
fn required_text_needs_non_blank_value() {
    let empty = Field::new("nombres", FieldKind::Text).required();
    let blank = with_value(empty.clone(), FieldValue::Text("   \t".into()));
    let filled = with_value(empty.clone(), FieldValue::Text(" Ana ".into()));

    assert!(!is_field_satisfied(&empty));
    assert!(!is_field_satisfied(&blank));
    assert!(is_field_satisfied(&filled));
}

#[test]
fn required_select_uses_text_rule() {
    let f = Field::new("turno", FieldKind::Select).required();
    assert!(!is_field_satisfied(&f));
    assert!(is_field_satisfied(&with_value(f, FieldValue::Text("Tarde".into()))));
}

#[test]
fn required_multi_select_needs_one_option() {
    let f = Field::new("modulos", FieldKind::MultiSelect).required();
    assert!(!is_field_satisfied(&f));
    assert!(is_field_satisfied(&with_value(f, FieldValue::selected(["M1"]))));
}

#[test]
fn required_file_needs_one_attachment() {
    let f = Field::new("fotoCi", FieldKind::File).required();
    assert!(!is_field_satisfied(&f));

    let attached = with_value(
        f,
        FieldValue::Files(vec![FileAttachment::new("ci.png", vec![1, 2, 3])]),
    );
    assert!(is_field_satisfied(&attached));
}

#[test]
fn optional_fields_never_block() {
    let s = step(vec![
        Field::new("a", FieldKind::Text),
        Field::new("b", FieldKind::MultiSelect),
        Field::new("c", FieldKind::File),
    ]);
    assert!(is_step_valid(&s));
}

#[test]
fn empty_step_is_valid() {
    assert!(is_step_valid(&step(vec![])));
}

#[test]
fn missing_fields_lists_only_unsatisfied_required() {
    let s = step(vec![
        with_value(Field::new("a", FieldKind::Text).required(), FieldValue::Text("x".into())),
        Field::new("b", FieldKind::Text).required(),
        Field::new("c", FieldKind::Text),
        Field::new("d", FieldKind::File).required(),
    ]);
    assert_eq!(missing_fields(&s), vec!["b", "d"]);
    assert!(!is_step_valid(&s));
}

#[test]
fn validation_is_idempotent() {
    let s = step(vec![Field::new("a", FieldKind::Text).required()]);
    assert_eq!(is_step_valid(&s), is_step_valid(&s));
    assert!(!is_step_valid(&s));
}

// =========================================================================
// Property: valid iff every required field satisfies its kind rule
// =========================================================================

#[derive(Debug, Clone)]
struct FieldCase {
    kind: FieldKind,
    required: bool,
    text: String,
    count: usize,
}

fn kind_strategy() -> impl Strategy<Value = FieldKind> {
    prop_oneof![
        Just(FieldKind::Text),
        Just(FieldKind::Select),
        Just(FieldKind::MultiSelect),
        Just(FieldKind::File),
    ]
}

fn case_strategy() -> impl Strategy<Value = FieldCase> {
    (kind_strategy(), any::<bool>(), "[ a-z\t]{0,3}", 0usize..3).prop_map(
        |(kind, required, text, count)| FieldCase {
            kind,
            required,
            text,
            count,
        },
    )
}

fn build(i: usize, case: &FieldCase) -> Field {
    let mut field = Field::new(format!("f{}", i), case.kind);
    field.required = case.required;
    field.value = match case.kind {
        FieldKind::Text | FieldKind::Select => FieldValue::Text(case.text.clone()),
        FieldKind::MultiSelect => FieldValue::selected((0..case.count).map(|n| format!("o{}", n))),
        FieldKind::File => FieldValue::Files(
            (0..case.count)
                .map(|n| FileAttachment::new(format!("f{}.bin", n), vec![n as u8]))
                .collect(),
        ),
    };
    field
}

fn expected_satisfied(case: &FieldCase) -> bool {
    if !case.required {
        return true;
    }
    match case.kind {
        FieldKind::MultiSelect | FieldKind::File => case.count > 0,
        FieldKind::Text | FieldKind::Select => !case.text.trim().is_empty(),
    }
}

proptest! {
    #[test]
    fn step_valid_iff_all_required_satisfied(cases in prop::collection::vec(case_strategy(), 0..8)) {
        let fields: Vec<Field> = cases.iter().enumerate().map(|(i, c)| build(i, c)).collect();
        let s = step(fields);

        let expected = cases.iter().all(expected_satisfied);
        prop_assert_eq!(is_step_valid(&s), expected);
        prop_assert_eq!(missing_fields(&s).is_empty(), expected);
    }
}
