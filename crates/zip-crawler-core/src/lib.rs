pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod policy;
pub mod progress;
pub mod report;
pub mod scanner;

pub use crate::config::{AppSettings, EmailAddress, RunConfig};
pub use crate::engine::{DirectoryCompactor, FileRecord, RunResult};
pub use crate::error::{ConfigurationError, Error};
pub use crate::policy::{CompactionOutcome, CompactionPolicy, FileFailure};
pub use crate::progress::{CrawlPhase, ProgressReporter, SilentReporter};
