use std::collections::BTreeMap;

/// Everything the wizard asks of the UI. The core never reads UI state back.
pub trait Presenter {
    fn set_step_active(&mut self, index: usize, active: bool);
    fn set_advance_enabled(&mut self, index: usize, enabled: bool);
    fn show_warning(&mut self, message: &str);
    fn show_background(&mut self, resource: &str);
    fn set_loading_text(&mut self, text: &str);
    fn set_controls_enabled(&mut self, enabled: bool);
    fn show_submit_control(&mut self, visible: bool);
    fn show_code(&mut self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    StepActive(usize, bool),
    AdvanceEnabled(usize, bool),
    Warning(String),
    Background(String),
    LoadingText(String),
    ControlsEnabled(bool),
    SubmitControl(bool),
    Code(String),
}

/// Presenter that keeps the resulting view state plus a call log.
#[derive(Debug, Clone)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
    pub active_steps: Vec<usize>,
    pub advance_enabled: BTreeMap<usize, bool>,
    pub warnings: Vec<String>,
    pub backgrounds: Vec<String>,
    pub loading_text: String,
    pub controls_enabled: bool,
    pub submit_visible: bool,
    pub code_text: String,
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            active_steps: Vec::new(),
            advance_enabled: BTreeMap::new(),
            warnings: Vec::new(),
            backgrounds: Vec::new(),
            loading_text: String::new(),
            controls_enabled: true,
            submit_visible: true,
            code_text: String::new(),
        }
    }
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_advance_enabled(&self, index: usize) -> bool {
        self.advance_enabled.get(&index).copied().unwrap_or(false)
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.warnings.last().map(String::as_str)
    }
}

impl Presenter for RecordingPresenter {
    fn set_step_active(&mut self, index: usize, active: bool) {
        if active {
            if !self.active_steps.contains(&index) {
                self.active_steps.push(index);
            }
        } else {
            self.active_steps.retain(|i| *i != index);
        }
        self.calls.push(PresenterCall::StepActive(index, active));
    }

    fn set_advance_enabled(&mut self, index: usize, enabled: bool) {
        self.advance_enabled.insert(index, enabled);
        self.calls.push(PresenterCall::AdvanceEnabled(index, enabled));
    }

    fn show_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
        self.calls.push(PresenterCall::Warning(message.to_string()));
    }

    fn show_background(&mut self, resource: &str) {
        self.backgrounds.push(resource.to_string());
        self.calls.push(PresenterCall::Background(resource.to_string()));
    }

    fn set_loading_text(&mut self, text: &str) {
        self.loading_text = text.to_string();
        self.calls.push(PresenterCall::LoadingText(text.to_string()));
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
        self.calls.push(PresenterCall::ControlsEnabled(enabled));
    }

    fn show_submit_control(&mut self, visible: bool) {
        self.submit_visible = visible;
        self.calls.push(PresenterCall::SubmitControl(visible));
    }

    fn show_code(&mut self, text: &str) {
        self.code_text = text.to_string();
        self.calls.push(PresenterCall::Code(text.to_string()));
    }
}
