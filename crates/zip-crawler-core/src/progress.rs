use crate::engine::RunResult;
use crate::policy::CompactionOutcome;

/// Where a crawl currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Listing,
    ProcessingFile(usize),
    Reporting,
    Done,
}

/// Trait for reporting crawl progress.
///
/// The CLI implements it with indicatif; tests use [`SilentReporter`] or
/// record the calls. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_phase(&self, _phase: CrawlPhase) {}
    fn on_crawl_start(&self, _total_files: usize) {}
    fn on_file_outcome(&self, _name: &str, _outcome: &CompactionOutcome) {}
    fn on_crawl_complete(&self, _result: &RunResult) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
