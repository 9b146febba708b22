use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use zip_crawler_core::{CompactionOutcome, CrawlPhase, ProgressReporter, RunResult};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Listing: spinner
/// - Crawl: progress bar over the listed files
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.guard();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.guard().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_phase(&self, phase: CrawlPhase) {
        if phase == CrawlPhase::Listing {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars(TICK_CHARS),
            );
            pb.set_message("Listing files...");
            pb.enable_steady_tick(std::time::Duration::from_millis(80));
            self.set_bar(pb);
        }
    }

    fn on_crawl_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Compacting [{bar:30.cyan/dim}] {pos}/{len} files {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_outcome(&self, name: &str, _outcome: &CompactionOutcome) {
        if let Some(pb) = self.guard().as_ref() {
            pb.set_message(name.to_string());
            pb.inc(1);
        }
    }

    fn on_crawl_complete(&self, result: &RunResult) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Crawl complete: {} files, {} compressed",
            result.records().len(),
            result.compressed_names().len()
        );
    }
}
