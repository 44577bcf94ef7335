//! Terminal rendering of the active transfer.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::format::format_memory;

use super::progress::{DownloadTask, ProgressDisplay};

const BAR_STYLE: &str =
    "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {percent:>3}% {msg}";

const BAR_CHARS: &str = "█▓▒░  ";

fn bar_style() -> ProgressStyle {
    match ProgressStyle::with_template(BAR_STYLE) {
        Ok(style) => style.progress_chars(BAR_CHARS),
        Err(_) => ProgressStyle::default_bar(),
    }
}

/// Draws one progress bar per file on stderr. The bar sits behind its own
/// mutex, separate from the slot's; it is only handed task copies.
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: false,
        }
    }

    /// Tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Position of the bar currently shown, if any.
    pub fn position(&self) -> Option<u64> {
        self.lock().as_ref().map(ProgressBar::position)
    }
}

fn progress_message(task: &DownloadTask) -> String {
    format!(
        "{} {} / {}",
        task.file_name,
        format_memory(task.bytes_transferred),
        format_memory(task.total_size)
    )
}

impl ProgressDisplay for ConsoleProgress {
    fn started(&self, task: &DownloadTask) {
        let bar = ProgressBar::new(task.total_size);
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(bar_style());
        bar.set_message(progress_message(task));

        if let Some(previous) = self.lock().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn update(&self, task: &DownloadTask) {
        if let Some(bar) = self.lock().as_ref() {
            bar.set_position(task.bytes_transferred);
            bar.set_message(progress_message(task));
        }
    }

    fn finished(&self, task: &DownloadTask) {
        if let Some(bar) = self.lock().as_ref() {
            bar.set_position(task.bytes_transferred);
            bar.finish_with_message(format!(
                "Downloaded {} ({})",
                task.file_name,
                format_memory(task.bytes_transferred)
            ));
        }
    }
}
