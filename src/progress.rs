//! Progress reporting for the scan pipeline.
//!
//! [`ProgressCallback`] is the hook the finder and the similarity grouper
//! report through. [`Progress`] renders it with indicatif: a spinner while
//! walking, then a bar for each of the fingerprint and cluster phases.
//! Phases run one after another, so only one bar is live at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives progress updates from the scan pipeline.
///
/// Phases are named `"walking"`, `"fingerprint"` and `"cluster"`.
pub trait ProgressCallback: Send + Sync {
    /// A phase started; `total` is 0 when unknown (walking).
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Item `current` (1-based) of the running phase was reached.
    fn on_progress(&self, current: usize, path: &str);

    /// A file of `bytes` bytes finished fingerprinting.
    fn on_item_completed(&self, _bytes: u64) {}

    /// A phase finished.
    fn on_phase_end(&self, phase: &str);

    /// Free-form status text.
    fn on_message(&self, _message: &str) {}
}

/// indicatif-backed progress display on stderr.
pub struct Progress {
    active: Mutex<Option<(String, ProgressBar)>>,
    bytes_done: AtomicU64,
    hidden: bool,
}

impl Progress {
    /// Create a progress display; `hidden` suppresses all drawing.
    ///
    /// ```
    /// use dupefinder::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        Self {
            active: Mutex::new(None),
            bytes_done: AtomicU64::new(0),
            hidden,
        }
    }

    fn bar_for(&self, phase: &str, total: usize) -> ProgressBar {
        let bar = if total == 0 {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} {msg} [{elapsed_precise}] {pos} files",
                )
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█>-"),
            );
            bar
        };
        bar.set_prefix(phase.to_string());
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar
    }

    fn with_active(&self, f: impl FnOnce(&str, &ProgressBar)) {
        let guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((phase, bar)) = guard.as_ref() {
            f(phase, bar);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        let bar = self.bar_for(phase, total);
        bar.set_message(phase_label(phase));
        self.bytes_done.store(0, Ordering::Relaxed);

        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((phase.to_string(), bar));
        if let Some((_, stale)) = previous {
            stale.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        self.with_active(|phase, bar| {
            bar.set_position(current as u64);
            if phase == "fingerprint" {
                let done = ByteSize(self.bytes_done.load(Ordering::Relaxed));
                bar.set_message(format!("{done} {}", truncate_path(path, 30)));
            } else {
                bar.set_message(truncate_path(path, 30));
            }
        });
    }

    fn on_item_completed(&self, bytes: u64) {
        self.bytes_done.fetch_add(bytes, Ordering::Relaxed);
    }

    fn on_phase_end(&self, phase: &str) {
        let mut guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(|(active, _)| active == phase) {
            if let Some((_, bar)) = guard.take() {
                bar.finish_with_message(format!("{} complete", phase_label(phase)));
            }
        }
    }

    fn on_message(&self, message: &str) {
        self.with_active(|_, bar| bar.set_message(message.to_string()));
    }
}

fn phase_label(phase: &str) -> String {
    match phase {
        "walking" => "Walking".to_string(),
        "fingerprint" => "Fingerprinting".to_string(),
        "cluster" => "Clustering".to_string(),
        other => other.to_string(),
    }
}

/// Shorten a path to its file name when it does not fit in `max_len`.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
