use crate::presentation::presenter::Presenter;

pub fn default_backgrounds() -> Vec<String> {
    ["IMG/1M.jpg", "IMG/2M.jpg", "IMG/3M.jpg", "IMG/4M.jpg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Cycles through background resources, one per successful step transition.
#[derive(Debug, Clone)]
pub struct BackgroundCycle {
    resources: Vec<String>,
    index: usize,
}

impl Default for BackgroundCycle {
    fn default() -> Self {
        Self::new(default_backgrounds())
    }
}

impl BackgroundCycle {
    pub fn new(resources: Vec<String>) -> Self {
        Self { resources, index: 0 }
    }

    pub fn current(&self) -> Option<&str> {
        self.resources.get(self.index).map(String::as_str)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Show the initial background.
    pub fn show_current(&self, presenter: &mut dyn Presenter) {
        if let Some(res) = self.current() {
            presenter.show_background(res);
        }
    }

    /// Move to the next resource (wrapping) and show it. No-op without resources.
    pub fn advance(&mut self, presenter: &mut dyn Presenter) {
        if self.resources.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.resources.len();
        presenter.show_background(&self.resources[self.index]);
    }
}
