// Terminal feedback while blocking calls are in flight. Spinners draw to
// stderr and disappear on their own when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Progress { enabled }
    }

    /// Start a ticking spinner with `msg`. Finish it with
    /// `finish_and_clear` once the call returns.
    pub fn spinner(&self, msg: impl Into<String>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(msg.into());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Bar counting `len` steps, e.g. rows being uploaded.
    pub fn bar(&self, len: u64, msg: impl Into<String>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let style = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(msg.into());
        bar
    }
}
