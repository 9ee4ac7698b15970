//! Progress bar reporter and the end-of-run summary table.

use indicatif::{ProgressBar, ProgressStyle};
use lineforge_core::{ProgressEvent, Reporter, RunSummary};

/// Drives a per-stage progress bar and logs every event.
///
/// Log lines are emitted with the bar suspended so they do not tear it, and
/// go through `tracing` so the per-run log file receives them too.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: create_progress_bar(),
        }
    }

    /// Reporter whose bar never draws.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Clear the bar, whether or not the run finished.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn update_bar(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage, total, .. } => {
                self.bar.reset();
                self.bar.set_length(*total as u64);
                self.bar.set_prefix(format!("[{}] {}", stage.letter(), stage));
                self.bar.set_message("");
            }
            ProgressEvent::FileStarted { index, file, .. } => {
                self.bar.set_position(index.saturating_sub(1) as u64);
                self.bar.set_message(file.clone());
            }
            ProgressEvent::StageFinished { .. } => {
                if let Some(len) = self.bar.length() {
                    self.bar.set_position(len);
                }
            }
            ProgressEvent::RunFinished(_) => self.bar.finish_and_clear(),
            _ => {}
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ProgressReporter {
    fn report(&self, event: &ProgressEvent) {
        self.update_bar(event);
        let line = event.message();
        self.bar.suspend(|| {
            if event.is_warning() {
                tracing::warn!("{}", line.trim_start());
            } else {
                tracing::info!("{}", line);
            }
        });
    }
}

/// Create the per-stage progress bar.
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

/// Print a formatted summary table after a run.
pub fn print_summary(summary: &RunSummary) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Inputs:       {:>8}", summary.inputs);
    if summary.containers_expanded > 0 {
        eprintln!(
            "    Icons:        {:>8}  ({} frames)",
            summary.containers_expanded, summary.frames_extracted
        );
    }
    for stage in &summary.stages {
        eprintln!(
            "    {:<13} {:>8}  -> {}",
            format!("{}:", stage.stage),
            stage.outputs,
            stage.directory.display()
        );
    }
    if !summary.icons_rebuilt.is_empty() || !summary.icons_skipped.is_empty() {
        eprintln!("    Rebuilt:      {:>8}", summary.icons_rebuilt.len());
    }
    if !summary.icons_skipped.is_empty() {
        eprintln!(
            "    Skipped:      {:>8}  ({})",
            summary.icons_skipped.len(),
            summary.icons_skipped.join(", ")
        );
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", summary.elapsed.as_secs_f64());
    eprintln!("    Output:       {}", summary.output_root.display());
    eprintln!("  ====================================");
}
