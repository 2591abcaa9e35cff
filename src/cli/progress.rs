//! Progress display for the per-row stages.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a stage run. Per-item log lines already report progress
/// unless `quiet` is set, so the bar is only drawn in quiet mode.
pub fn stage_progress(quiet: bool) -> ProgressBar {
    if !quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb
}
