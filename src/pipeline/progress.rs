//! Progress notifications for the loading pass.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

/// Observer notified as files are loaded
pub trait ProgressObserver {
    fn started(&mut self, _total: usize) {}

    /// `done` files of `total` have been loaded; `path` is the latest
    fn file_loaded(&mut self, done: usize, total: usize, path: &Path);

    fn finished(&mut self) {}
}

/// Logs a line every `interval` files
#[derive(Debug)]
pub struct LogProgress {
    interval: usize,
}

impl LogProgress {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }
}

impl ProgressObserver for LogProgress {
    fn file_loaded(&mut self, done: usize, total: usize, _path: &Path) {
        if done % self.interval == 0 || done == total {
            let percent = if total == 0 {
                100.0
            } else {
                100.0 * done as f64 / total as f64
            };
            info!("{} / {} = {:.2}%", done, total, percent);
        }
    }
}

/// Terminal progress bar, plus the periodic log line
#[derive(Debug)]
pub struct BarProgress {
    bar: ProgressBar,
    log: LogProgress,
}

impl BarProgress {
    pub fn new(interval: usize) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self {
            bar,
            log: LogProgress::new(interval),
        }
    }
}

impl ProgressObserver for BarProgress {
    fn started(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("Loading tables");
    }

    fn file_loaded(&mut self, done: usize, total: usize, path: &Path) {
        if let Some(file_name) = path.file_name() {
            self.bar
                .set_message(format!("Loaded: {}", file_name.to_string_lossy()));
        }
        self.bar.set_position(done as u64);
        self.log.file_loaded(done, total, path);
    }

    fn finished(&mut self) {
        self.bar.finish_with_message("All tables loaded");
    }
}
