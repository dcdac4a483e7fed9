use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// One spinner per pipeline stage
pub struct ProgressReporter {
    multi_progress: MultiProgress,
    stage: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            stage: None,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Start a spinner for `message`, finishing any stage still running
    pub fn start_stage(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        if let Some(previous) = self.stage.take() {
            previous.finish_and_clear();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        self.stage = Some(pb);
    }

    pub fn finish_stage(&mut self, message: &str) {
        if let Some(pb) = self.stage.take() {
            pb.finish_with_message(format!("✓ {message}"));
        }
    }

    pub fn finish_and_clear(&mut self) {
        if let Some(pb) = self.stage.take() {
            pb.finish_and_clear();
        }
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }
}
