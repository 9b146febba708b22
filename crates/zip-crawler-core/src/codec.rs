use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{trace, warn};

use crate::config::{DEFAULT_ARTIFACT_SUFFIX, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("artifact '{}' already exists", .0.display())]
    ArtifactCollision(PathBuf),

    #[error("compressing '{}' failed: {source}", .path.display())]
    Failure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A fully written, closed compressed file sitting next to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub compressed_size: u64,
}

pub trait CompressionCodec {
    /// Suffix appended to the source file name to name the artifact.
    fn suffix(&self) -> &str;

    fn compress(&self, source: &Path) -> Result<Artifact, CodecError>;

    fn artifact_path(&self, source: &Path) -> PathBuf {
        let mut name: OsString = source.as_os_str().to_os_string();
        name.push(self.suffix());
        PathBuf::from(name)
    }
}

pub struct GzipCodec {
    suffix: String,
    level: Compression,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_SUFFIX, DEFAULT_COMPRESSION_LEVEL)
    }
}

impl GzipCodec {
    /// `level` is expected in `0..=MAX_COMPRESSION_LEVEL`, settings are
    /// validated against it on load.
    pub fn new(suffix: &str, level: u32) -> Self {
        debug_assert!(level <= MAX_COMPRESSION_LEVEL);
        Self {
            suffix: suffix.to_string(),
            level: Compression::new(level.min(MAX_COMPRESSION_LEVEL)),
        }
    }

    fn write_artifact(&self, source: &Path, output: File) -> io::Result<()> {
        let mut reader = BufReader::new(File::open(source)?);
        let mut encoder = GzEncoder::new(BufWriter::new(output), self.level);
        io::copy(&mut reader, &mut encoder)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()
    }
}

impl CompressionCodec for GzipCodec {
    fn suffix(&self) -> &str {
        &self.suffix
    }

    fn compress(&self, source: &Path) -> Result<Artifact, CodecError> {
        let artifact_path = self.artifact_path(source);

        // create_new makes the collision check and the create one step.
        let output = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&artifact_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(CodecError::ArtifactCollision(artifact_path));
            }
            Err(err) => {
                return Err(CodecError::Failure {
                    path: source.to_path_buf(),
                    source: err,
                });
            }
        };

        let written = self
            .write_artifact(source, output)
            .and_then(|_| fs::metadata(&artifact_path).map(|m| m.len()));

        match written {
            Ok(compressed_size) => {
                trace!(
                    "Wrote {} ({} bytes)",
                    artifact_path.display(),
                    compressed_size
                );
                Ok(Artifact {
                    path: artifact_path,
                    compressed_size,
                })
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&artifact_path) {
                    warn!(
                        "Could not remove partial artifact {}: {}",
                        artifact_path.display(),
                        cleanup
                    );
                }
                Err(CodecError::Failure {
                    path: source.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}
