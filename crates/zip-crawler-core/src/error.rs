use std::path::PathBuf;
use thiserror::Error;

/// Problems with the invocation itself. Always fatal and always raised
/// before the directory is touched.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid threshold '{0}': expected a whole number of bytes with no units")]
    InvalidThreshold(String),

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
