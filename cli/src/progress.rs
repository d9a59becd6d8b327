//! Terminal spinner for tree generation.

use std::cell::RefCell;
use std::time::Duration;

use cli_tree_generator::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

/// Shows a spinner on stderr while a tree is generated.
///
/// indicatif hides the spinner when stderr is not a terminal.
#[derive(Default)]
pub struct SpinnerProgress {
    current: RefCell<Option<(ProgressBar, String)>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for SpinnerProgress {
    fn begin(&self, message: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.current.borrow_mut() = Some((pb, message.to_string()));
    }

    fn finish(&self, success: bool) {
        let Some((pb, message)) = self.current.borrow_mut().take() else {
            return;
        };
        let outcome = if success { "done" } else { "failed" };
        pb.finish_with_message(format!("{message}...{outcome}."));
    }
}
