use super::NotifyError;
use crate::config::{SecretSettings, SecretSource};
use secrecy::SecretString;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Resolves the credential used by the notification transport.
pub trait SecretStore {
    fn api_key(&self) -> Result<SecretString, NotifyError>;
}

/// Reads the key from an environment variable. `.env` files are loaded into
/// the environment by the binary before this is consulted.
pub struct EnvSecretStore {
    var: String,
}

impl EnvSecretStore {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl SecretStore for EnvSecretStore {
    fn api_key(&self) -> Result<SecretString, NotifyError> {
        match env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => {
                debug!("Using API key from {} environment variable", self.var);
                Ok(SecretString::from(key.trim().to_string()))
            }
            _ => Err(NotifyError::Credential(format!(
                "environment variable {} is not set",
                self.var
            ))),
        }
    }
}

/// Reads the key from the first non-empty line of a plaintext file.
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretStore for FileSecretStore {
    fn api_key(&self) -> Result<SecretString, NotifyError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            NotifyError::Credential(format!("reading {}: {}", self.path.display(), e))
        })?;
        contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| SecretString::from(line.to_string()))
            .ok_or_else(|| {
                NotifyError::Credential(format!("{} contains no key", self.path.display()))
            })
    }
}

pub fn secret_store_from_settings(settings: &SecretSettings) -> Box<dyn SecretStore> {
    match settings.source {
        SecretSource::Env => Box::new(EnvSecretStore::new(&settings.env_var)),
        SecretSource::File => Box::new(FileSecretStore::new(&settings.file_path)),
    }
}
