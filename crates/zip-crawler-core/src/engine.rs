use crate::codec::{Artifact, CodecError, CompressionCodec, GzipCodec};
use crate::config::{AppSettings, RunConfig};
use crate::error::Error;
use crate::policy::{compression_ratio, extension_of, CompactionOutcome, CompactionPolicy, FileFailure};
use crate::progress::{CrawlPhase, ProgressReporter};
use crate::scanner::{self, FileRemover, FsProbe, FsRemover, SizeProbe};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// One top-level file as seen by the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub uncompressed_size: u64,
    pub extension: String,
}

impl FileCandidate {
    pub fn new(name: &str, uncompressed_size: u64) -> Self {
        Self {
            name: name.to_string(),
            uncompressed_size,
            extension: extension_of(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub outcome: CompactionOutcome,
}

/// Aggregate of a finished crawl, in crawl order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    records: Vec<FileRecord>,
    compressed_names: Vec<String>,
    uncompressed_names: Vec<String>,
    total_savings_bytes: u64,
    dry_run: bool,
}

impl RunResult {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            records: Vec::new(),
            compressed_names: Vec::new(),
            uncompressed_names: Vec::new(),
            total_savings_bytes: 0,
            dry_run,
        }
    }

    pub fn from_records<I>(records: I, dry_run: bool) -> Self
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let mut result = Self::new(dry_run);
        for record in records {
            result.record(record.name, record.outcome);
        }
        result
    }

    pub(crate) fn record(&mut self, name: String, outcome: CompactionOutcome) {
        if let CompactionOutcome::Compressed { saved_bytes } = outcome {
            self.total_savings_bytes += saved_bytes;
            self.compressed_names.push(name.clone());
        } else {
            self.uncompressed_names.push(name.clone());
        }
        self.records.push(FileRecord { name, outcome });
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn compressed_names(&self) -> &[String] {
        &self.compressed_names
    }

    pub fn uncompressed_names(&self) -> &[String] {
        &self.uncompressed_names
    }

    pub fn total_savings_bytes(&self) -> u64 {
        self.total_savings_bytes
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn failed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, CompactionOutcome::Failed(_)))
            .count()
    }
}

/// Crawls the top level of one directory and compacts what is worth it.
///
/// Files are handled strictly one after another; each file's artifact is
/// committed or removed before the next file is opened, so at most one extra
/// artifact exists at any time.
pub struct DirectoryCompactor {
    config: RunConfig,
    policy: CompactionPolicy,
    probe: Box<dyn SizeProbe>,
    codec: Box<dyn CompressionCodec>,
    remover: Box<dyn FileRemover>,
}

impl DirectoryCompactor {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            policy: CompactionPolicy::default(),
            probe: Box::new(FsProbe),
            codec: Box::new(GzipCodec::default()),
            remover: Box::new(FsRemover),
        }
    }

    pub fn from_settings(config: RunConfig, settings: &AppSettings) -> Self {
        Self::new(config)
            .with_policy(CompactionPolicy::new(&settings.incompressible_extensions))
            .with_codec(GzipCodec::new(
                &settings.artifact_suffix,
                settings.compression_level,
            ))
    }

    pub fn with_policy(mut self, policy: CompactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_probe(mut self, probe: impl SizeProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_codec(mut self, codec: impl CompressionCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn with_remover(mut self, remover: impl FileRemover + 'static) -> Self {
        self.remover = Box::new(remover);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run one crawl. Only failing to list the directory is an error; every
    /// per-file problem becomes that file's outcome.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunResult, Error> {
        let dir = self.config.directory();
        reporter.on_phase(CrawlPhase::Idle);

        reporter.on_phase(CrawlPhase::Listing);
        let files = scanner::list_top_level_files(dir)?;
        info!("Crawling {}: {} files", dir.display(), files.len());
        if self.config.dry_run() {
            info!("Dry run, no files will be changed");
        }

        let start = Instant::now();
        reporter.on_crawl_start(files.len());
        let mut result = RunResult::new(self.config.dry_run());

        for (index, path) in files.iter().enumerate() {
            reporter.on_phase(CrawlPhase::ProcessingFile(index));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            info!("analyzing {}", path.display());
            let outcome = self.process_file(path, &name);
            log_outcome(path, &outcome);

            reporter.on_file_outcome(&name, &outcome);
            result.record(name, outcome);
        }

        reporter.on_phase(CrawlPhase::Reporting);
        info!(
            "Crawl finished in {:.2}s: {} compressed, {} not compressed, {} bytes saved",
            start.elapsed().as_secs_f64(),
            result.compressed_names().len(),
            result.uncompressed_names().len(),
            result.total_savings_bytes(),
        );
        reporter.on_crawl_complete(&result);
        reporter.on_phase(CrawlPhase::Done);

        Ok(result)
    }

    fn process_file(&self, path: &Path, name: &str) -> CompactionOutcome {
        let size = match self.probe.size_of(path) {
            Ok(size) => size,
            Err(err) => return CompactionOutcome::Failed(FileFailure::Probe(err.to_string())),
        };
        let candidate = FileCandidate::new(name, size);

        if let Some(outcome) = self.policy.prefilter(
            candidate.uncompressed_size,
            self.config.size_threshold(),
            &candidate.extension,
        ) {
            return outcome;
        }

        let artifact = match self.codec.compress(path) {
            Ok(artifact) => artifact,
            Err(CodecError::ArtifactCollision(existing)) => {
                return CompactionOutcome::Failed(FileFailure::ArtifactCollision(
                    existing.display().to_string(),
                ));
            }
            Err(err) => return CompactionOutcome::Failed(FileFailure::Codec(err.to_string())),
        };

        if candidate.uncompressed_size > 0 {
            debug!(
                "{}: {} -> {} bytes ({:.1}%)",
                candidate.name,
                candidate.uncompressed_size,
                artifact.compressed_size,
                compression_ratio(candidate.uncompressed_size, artifact.compressed_size),
            );
        }

        let outcome = self
            .policy
            .evaluate(candidate.uncompressed_size, artifact.compressed_size);

        if outcome.is_compressed() && !self.config.dry_run() {
            self.commit(path, &artifact, outcome)
        } else {
            match self.discard(&artifact) {
                Ok(()) => outcome,
                // Both files are on disk now; report it rather than the
                // decision that was made.
                Err(reason) => CompactionOutcome::Failed(FileFailure::Codec(reason)),
            }
        }
    }

    /// Replace the original with its artifact.
    fn commit(
        &self,
        path: &Path,
        artifact: &Artifact,
        outcome: CompactionOutcome,
    ) -> CompactionOutcome {
        match self.remover.remove(path) {
            Ok(()) => outcome,
            Err(err) => {
                // Keep the original, never both.
                let mut reason = format!("could not remove original: {}", err);
                if let Err(cleanup) = self.discard(artifact) {
                    reason = format!("{}; {}", reason, cleanup);
                }
                CompactionOutcome::Failed(FileFailure::Codec(reason))
            }
        }
    }

    fn discard(&self, artifact: &Artifact) -> Result<(), String> {
        self.remover.remove(&artifact.path).map_err(|err| {
            error!(
                "Could not remove artifact {}: {}",
                artifact.path.display(),
                err
            );
            format!("could not remove artifact {}: {}", artifact.path.display(), err)
        })
    }
}

fn log_outcome(path: &Path, outcome: &CompactionOutcome) {
    match outcome {
        CompactionOutcome::Compressed { .. } => {
            info!("compressing {} -- {}", path.display(), outcome)
        }
        CompactionOutcome::Failed(_) => warn!("skipping {} -- {}", path.display(), outcome),
        _ => info!("skipping {} -- {}", path.display(), outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_extension() {
        let candidate = FileCandidate::new("Holiday.JPG", 10);
        assert_eq!(candidate.extension, "jpg");
        assert_eq!(FileCandidate::new("README", 1).extension, "");
    }

    #[test]
    fn test_run_result_accumulates_in_order() {
        let result = RunResult::from_records(
            vec![
                FileRecord {
                    name: "b.txt".into(),
                    outcome: CompactionOutcome::Compressed { saved_bytes: 10 },
                },
                FileRecord {
                    name: "a.jpg".into(),
                    outcome: CompactionOutcome::SkippedIncompressibleFormat,
                },
                FileRecord {
                    name: "a.txt".into(),
                    outcome: CompactionOutcome::Compressed { saved_bytes: 32 },
                },
                FileRecord {
                    name: "gone.txt".into(),
                    outcome: CompactionOutcome::Failed(FileFailure::Probe("missing".into())),
                },
            ],
            false,
        );

        assert_eq!(result.compressed_names(), ["b.txt", "a.txt"]);
        assert_eq!(result.uncompressed_names(), ["a.jpg", "gone.txt"]);
        assert_eq!(result.total_savings_bytes(), 42);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.records().len(), 4);
    }
}
