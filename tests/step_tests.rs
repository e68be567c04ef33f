use std::{cell::RefCell, rc::Rc};

use registration_wizard::{
    AdvanceOutcome, FieldValue, FormModel, Presenter, RecordingPresenter, SubmissionState,
    WizardError,
    form::form_model::{FieldChange, FieldSubscriber},
    presentation::{
        background::{BackgroundCycle, default_backgrounds},
        presenter::PresenterCall,
    },
    wizard::step_controller::StepController,
};

use crate::common::utils::{complete_to_last_step, fill_identity, sample_form, wizard};

mod common;

// =========================================================================
// Initial state
// =========================================================================

#[test]
fn starts_on_first_step_with_controls_reflecting_validity() {
    let w = wizard();
    let p = w.presenter();

    assert_eq!(w.current_step(), 0);
    assert_eq!(p.active_steps, vec![0]);
    assert!(!p.is_advance_enabled(0));
    assert!(!p.is_advance_enabled(1));
    assert!(!p.is_advance_enabled(2));
    assert_eq!(p.backgrounds, vec!["IMG/1M.jpg".to_string()]);
}

// =========================================================================
// Advance guard
// =========================================================================

#[test]
fn advance_rejected_when_step_invalid() {
    let mut w = wizard();
    w.set_text("apellidoPaterno", "Gomez").unwrap();

    let err = w.advance().unwrap_err();
    assert!(matches!(err, WizardError::Validation { step: 0 }));
    assert_eq!(w.current_step(), 0);
    assert_eq!(w.submission_state(), SubmissionState::Idle);
    assert_eq!(w.presenter().warnings.len(), 1);
    assert_eq!(w.presenter().backgrounds.len(), 1);
}

#[test]
fn repeated_rejected_advances_never_move() {
    let mut w = wizard();
    for _ in 0..5 {
        assert!(w.advance().is_err());
    }
    assert_eq!(w.current_step(), 0);
    assert_eq!(w.presenter().warnings.len(), 5);
    assert_eq!(w.submission_state(), SubmissionState::Idle);
}

#[test]
fn advance_moves_one_step_and_switches_active() {
    let mut w = wizard();
    fill_identity(&mut w);

    assert_eq!(w.advance().unwrap(), AdvanceOutcome::Advanced(1));
    assert_eq!(w.current_step(), 1);
    assert_eq!(w.presenter().active_steps, vec![1]);
    assert!(w.presenter().calls.contains(&PresenterCall::StepActive(0, false)));
}

#[test]
fn optional_blank_fields_do_not_block_advance() {
    let mut w = wizard();
    fill_identity(&mut w);
    w.set_text("apellidoMaterno", "   ").unwrap();
    assert!(w.advance().is_ok());
}

#[test]
fn last_step_has_no_advance_target() {
    let mut w = wizard();
    complete_to_last_step(&mut w);
    let backgrounds = w.presenter().backgrounds.len();

    assert_eq!(w.advance().unwrap(), AdvanceOutcome::AtLastStep);
    assert_eq!(w.current_step(), 2);
    assert_eq!(w.presenter().backgrounds.len(), backgrounds);
}

#[test]
fn last_step_still_guards_validity() {
    let mut w = wizard();
    fill_identity(&mut w);
    w.advance().unwrap();
    w.set_value("modulos", FieldValue::selected(["M2"])).unwrap();
    w.advance().unwrap();

    assert!(matches!(w.advance(), Err(WizardError::Validation { step: 2 })));
}

// =========================================================================
// Continuous advance-control enablement
// =========================================================================

#[test]
fn advance_control_follows_field_contents() {
    let mut w = wizard();
    w.set_text("apellidoPaterno", "Gomez").unwrap();
    assert!(!w.presenter().is_advance_enabled(0));

    w.set_text("ci", "123").unwrap();
    assert!(w.presenter().is_advance_enabled(0));

    w.set_text("ci", "  ").unwrap();
    assert!(!w.presenter().is_advance_enabled(0));
}

#[test]
fn multi_select_enables_control_on_first_selection() {
    let mut w = wizard();
    fill_identity(&mut w);
    w.advance().unwrap();
    assert!(!w.presenter().is_advance_enabled(1));

    w.set_value("modulos", FieldValue::selected(["M2"])).unwrap();
    assert!(w.presenter().is_advance_enabled(1));

    w.set_value("modulos", FieldValue::selected(Vec::<String>::new())).unwrap();
    assert!(!w.presenter().is_advance_enabled(1));
}

#[test]
fn change_only_updates_owning_step_control() {
    let mut w = wizard();
    let before = w.presenter().calls.len();
    w.set_text("correo", "a@b.c").unwrap();

    let touched: Vec<_> = w.presenter().calls[before..]
        .iter()
        .filter_map(|c| match c {
            PresenterCall::AdvanceEnabled(i, _) => Some(*i),
            _ => None,
        })
        .collect();
    assert_eq!(touched, vec![2]);
}

// =========================================================================
// Extra subscribers
// =========================================================================

/// Records each change with the field's text as the form saw it.
struct ChangeLog(Rc<RefCell<Vec<(FieldChange, String)>>>);

impl FieldSubscriber for ChangeLog {
    fn on_field_change(
        &mut self,
        change: &FieldChange,
        form: &FormModel,
        _presenter: &mut dyn Presenter,
    ) {
        let text = form.text(&change.field).to_string();
        self.0.borrow_mut().push((change.clone(), text));
    }
}

#[test]
fn subscribers_see_every_accepted_change() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut w = wizard();
    w.subscribe(Box::new(ChangeLog(Rc::clone(&log))));

    w.set_text("apellidoPaterno", "Gomez").unwrap();
    w.set_text("ci", "987654321").unwrap();
    w.set_value("modulos", FieldValue::selected(["M1"])).unwrap();
    // rejected values are not published
    assert!(w.set_value("turno", FieldValue::selected(["Noche"])).is_err());

    let log = log.borrow();
    let seen: Vec<(&str, usize)> = log
        .iter()
        .map(|(c, _)| (c.field.as_str(), c.step))
        .collect();
    assert_eq!(
        seen,
        vec![("apellidoPaterno", 0), ("ci", 0), ("modulos", 1)]
    );
    assert_eq!(log[1].1, "987654321");
}

#[test]
fn subscribers_share_the_presenter() {
    struct Warner(Rc<RefCell<Vec<bool>>>);

    impl FieldSubscriber for Warner {
        fn on_field_change(
            &mut self,
            _change: &FieldChange,
            _form: &FormModel,
            presenter: &mut dyn Presenter,
        ) {
            presenter.show_warning("extra");
            self.0.borrow_mut().push(true);
        }
    }

    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut w = wizard();
    w.subscribe(Box::new(Warner(Rc::clone(&calls))));
    fill_identity(&mut w);

    assert_eq!(calls.borrow().len(), 2);
    assert!(w.code().is_some());
    assert_eq!(w.presenter().last_warning(), Some("extra"));
}

// =========================================================================
// Backgrounds
// =========================================================================

#[test]
fn background_cycles_once_per_transition() {
    let mut w = wizard();
    complete_to_last_step(&mut w);

    assert_eq!(
        w.presenter().backgrounds,
        vec!["IMG/1M.jpg", "IMG/2M.jpg", "IMG/3M.jpg"]
    );
    assert_eq!(w.background_index(), 2);
}

#[test]
fn background_cycle_wraps_around() {
    let mut presenter = RecordingPresenter::new();
    let mut cycle = BackgroundCycle::new(vec!["a".into(), "b".into()]);
    cycle.show_current(&mut presenter);
    cycle.advance(&mut presenter);
    cycle.advance(&mut presenter);
    cycle.advance(&mut presenter);

    assert_eq!(presenter.backgrounds, vec!["a", "b", "a", "b"]);
}

#[test]
fn default_backgrounds_are_four_distinct_resources() {
    let mut list = default_backgrounds();
    assert_eq!(list.len(), 4);
    list.dedup();
    assert_eq!(list.len(), 4);
}

#[test]
fn empty_background_list_is_silent() {
    let mut presenter = RecordingPresenter::new();
    let form = sample_form();
    let mut steps = StepController::start(&form, BackgroundCycle::new(vec![]), &mut presenter);
    assert!(presenter.backgrounds.is_empty());

    let mut form = form;
    form.set_value("apellidoPaterno", FieldValue::Text("A".into())).unwrap();
    form.set_value("ci", FieldValue::Text("1".into())).unwrap();
    steps.advance(&form, &mut presenter).unwrap();
    assert!(presenter.backgrounds.is_empty());
    assert_eq!(steps.current(), 1);
}

// =========================================================================
// Trace
// =========================================================================

#[test]
fn transitions_are_traced() {
    let mut w = wizard();
    let _ = w.advance();
    fill_identity(&mut w);
    w.advance().unwrap();

    assert_eq!(
        w.tracer().event_names(),
        vec!["advance_rejected".to_string(), "step_advanced".to_string()]
    );
}
