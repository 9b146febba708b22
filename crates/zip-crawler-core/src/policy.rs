//! Per-file compaction decision.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. files under the size threshold are left alone,
//! 2. files whose extension marks them as already compressed are left alone,
//! 3. otherwise the file is compressed and the artifact is kept only if it
//!    saves at least [`MIN_SAVINGS_PERCENT`] of the original size.
//!
//! Rules 1 and 2 are exposed separately as [`CompactionPolicy::prefilter`] so
//! the caller can skip the compression work entirely.

use crate::config::DEFAULT_INCOMPRESSIBLE_EXTENSIONS;
use std::collections::HashSet;
use std::fmt;

pub const MIN_SAVINGS_PERCENT: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionOutcome {
    Compressed { saved_bytes: u64 },
    SkippedBelowThreshold,
    SkippedIncompressibleFormat,
    SkippedLowRatio,
    Failed(FileFailure),
}

/// Why a file could not be processed. The original is always left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFailure {
    Probe(String),
    Codec(String),
    ArtifactCollision(String),
}

impl CompactionOutcome {
    pub fn is_compressed(&self) -> bool {
        matches!(self, CompactionOutcome::Compressed { .. })
    }

    pub fn saved_bytes(&self) -> u64 {
        match self {
            CompactionOutcome::Compressed { saved_bytes } => *saved_bytes,
            _ => 0,
        }
    }
}

impl fmt::Display for CompactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompactionOutcome::Compressed { saved_bytes } => {
                write!(f, "compressed, saved {} bytes", saved_bytes)
            }
            CompactionOutcome::SkippedBelowThreshold => f.write_str("smaller than threshold"),
            CompactionOutcome::SkippedIncompressibleFormat => {
                f.write_str("file is already highly compressed")
            }
            CompactionOutcome::SkippedLowRatio => write!(
                f,
                "less than {}% compression",
                MIN_SAVINGS_PERCENT
            ),
            CompactionOutcome::Failed(failure) => write!(f, "failed: {}", failure),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFailure::Probe(msg) => write!(f, "could not stat file: {}", msg),
            FileFailure::Codec(msg) => write!(f, "compression failed: {}", msg),
            FileFailure::ArtifactCollision(path) => {
                write!(f, "artifact '{}' already exists", path)
            }
        }
    }
}

/// Lowercased substring after the final `.` of the file name, empty when the
/// name has no dot.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Savings as a percentage of the original size. Negative when the artifact
/// grew. Callers must not pass `uncompressed == 0`.
pub fn compression_ratio(uncompressed: u64, compressed: u64) -> f64 {
    (1.0 - (compressed as f64 / uncompressed as f64)) * 100.0
}

#[derive(Debug, Clone)]
pub struct CompactionPolicy {
    incompressible: HashSet<String>,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INCOMPRESSIBLE_EXTENSIONS)
    }
}

impl CompactionPolicy {
    pub fn new<I, S>(incompressible_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let incompressible = incompressible_extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        Self { incompressible }
    }

    pub fn is_incompressible(&self, extension: &str) -> bool {
        self.incompressible.contains(&extension.to_lowercase())
    }

    /// Rules 1 and 2. `None` means the file has to be compressed before a
    /// decision can be made.
    pub fn prefilter(
        &self,
        uncompressed_size: u64,
        threshold: u64,
        extension: &str,
    ) -> Option<CompactionOutcome> {
        if uncompressed_size < threshold {
            Some(CompactionOutcome::SkippedBelowThreshold)
        } else if self.is_incompressible(extension) {
            Some(CompactionOutcome::SkippedIncompressibleFormat)
        } else {
            None
        }
    }

    /// Rule 3, the ratio gate.
    pub fn evaluate(&self, uncompressed_size: u64, compressed_size: u64) -> CompactionOutcome {
        // An empty file has nothing to gain and would divide by zero.
        if uncompressed_size == 0 {
            return CompactionOutcome::SkippedLowRatio;
        }
        let Some(saved_bytes) = uncompressed_size.checked_sub(compressed_size) else {
            return CompactionOutcome::SkippedLowRatio;
        };
        // saved / uncompressed < 10%, kept in integers so 10% exactly is not
        // lost to float rounding.
        if u128::from(saved_bytes) * 100
            < u128::from(uncompressed_size) * u128::from(MIN_SAVINGS_PERCENT)
        {
            CompactionOutcome::SkippedLowRatio
        } else {
            CompactionOutcome::Compressed { saved_bytes }
        }
    }

    pub fn decide(
        &self,
        uncompressed_size: u64,
        compressed_size: u64,
        threshold: u64,
        extension: &str,
    ) -> CompactionOutcome {
        self.prefilter(uncompressed_size, threshold, extension)
            .unwrap_or_else(|| self.evaluate(uncompressed_size, compressed_size))
    }
}
