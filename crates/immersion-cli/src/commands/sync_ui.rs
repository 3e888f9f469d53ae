use immersion_models::SyncStatus;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a sync runs; falls back to log lines without a terminal
pub struct SyncSpinner {
    spinner: Option<ProgressBar>,
}

impl SyncSpinner {
    pub fn start(quiet: bool) -> Self {
        let message = SyncStatus::InProgress.message();
        if quiet || !is_interactive() {
            tracing::info!(operation = "sync", status = "in_progress", "{}", message);
            return Self { spinner: None };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "))
        {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner: Some(spinner) }
    }

    pub fn finish(self, status: SyncStatus) {
        match self.spinner {
            Some(spinner) => spinner.finish_and_clear(),
            None => tracing::info!(operation = "sync", status = ?status, "{}", status.message()),
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
