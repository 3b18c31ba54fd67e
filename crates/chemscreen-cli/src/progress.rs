//! Progress bar for exports
//!
//! Draws to stderr so stdout stays clean for JSON output. The bar is cleared
//! on drop when the export did not finish, so error output is not interleaved
//! with a half-drawn bar.

use chemscreen_core::export::{ExportProgress, ExportStage};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub(crate) struct ExportProgressBar {
    pb: Option<ProgressBar>,
}

impl ExportProgressBar {
    /// Create a progress bar; a disabled bar ignores every update
    pub(crate) fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { pb: None };
        }

        let pb = ProgressBar::new(100);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{spinner} {msg} [{bar:30.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb: Some(pb) }
    }

    /// Remove the bar from the terminal
    pub(crate) fn clear(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl ExportProgress for ExportProgressBar {
    fn report(&self, stage: ExportStage) {
        let Some(pb) = &self.pb else {
            return;
        };

        pb.set_message(stage.message());
        pb.set_position((stage.fraction().clamp(0.0, 1.0) * 100.0).round() as u64);
    }
}

impl Drop for ExportProgressBar {
    fn drop(&mut self) {
        if let Some(pb) = &self.pb {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
