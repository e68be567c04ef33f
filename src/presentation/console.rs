use crate::presentation::presenter::Presenter;

// ============================================================================
// Console presenter: terminal rendering for the `run` command
// ============================================================================

/// Prints presentation changes to stdout.
///
/// Background and control-state changes only show up with `verbose > 0`;
/// warnings, codes and loading text are always printed.
pub struct ConsolePresenter {
    pub verbose: u8,
}

impl ConsolePresenter {
    pub fn new(verbose: u8) -> Self {
        Self { verbose }
    }
}

impl Presenter for ConsolePresenter {
    fn set_step_active(&mut self, index: usize, active: bool) {
        if active {
            println!("\n=== Step {} ===", index + 1);
        }
    }

    fn set_advance_enabled(&mut self, index: usize, enabled: bool) {
        if self.verbose > 1 {
            eprintln!("[step {}] next {}", index + 1, if enabled { "enabled" } else { "disabled" });
        }
    }

    fn show_warning(&mut self, message: &str) {
        println!("\u{26a0} {}", message);
    }

    fn show_background(&mut self, resource: &str) {
        if self.verbose > 0 {
            eprintln!("[background] {}", resource);
        }
    }

    fn set_loading_text(&mut self, text: &str) {
        println!("{}", text);
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        if self.verbose > 0 {
            eprintln!("[controls] {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    fn show_submit_control(&mut self, visible: bool) {
        if self.verbose > 0 {
            eprintln!("[submit] {}", if visible { "shown" } else { "hidden" });
        }
    }

    fn show_code(&mut self, text: &str) {
        if !text.is_empty() {
            println!("{}", text);
        }
    }
}
