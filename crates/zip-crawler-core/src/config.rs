use crate::error::ConfigurationError;
use config::{Config, Environment, File as ConfigFile};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_SETTINGS_FILE: &str = "ZipCrawler";
pub const DEFAULT_ARTIFACT_SUFFIX: &str = ".gz";
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
pub const MAX_COMPRESSION_LEVEL: u32 = 9;
pub const DEFAULT_INCOMPRESSIBLE_EXTENSIONS: [&str; 9] =
    ["jpg", "pdf", "wma", "mp3", "avi", "mp4", "gz", "zip", "iso"];

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z]{2,5}$").unwrap();
}

/// An email address that has passed the shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        if EMAIL_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ConfigurationError::InvalidEmail(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated per-invocation options. Construction is the only place the
/// invariants are checked, so a `RunConfig` in hand is always usable.
#[derive(Debug, Clone)]
pub struct RunConfig {
    directory: PathBuf,
    size_threshold: u64,
    notify_address: Option<EmailAddress>,
    dry_run: bool,
}

impl RunConfig {
    pub fn new(
        directory: impl Into<PathBuf>,
        threshold: &str,
        notify_address: Option<&str>,
        dry_run: bool,
    ) -> Result<Self, ConfigurationError> {
        let directory = directory.into();
        validate_directory(&directory)?;
        let size_threshold = parse_threshold(threshold)?;
        let notify_address = notify_address.map(EmailAddress::parse).transpose()?;

        Ok(Self {
            directory,
            size_threshold,
            notify_address,
            dry_run,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn size_threshold(&self) -> u64 {
        self.size_threshold
    }

    pub fn notify_address(&self) -> Option<&EmailAddress> {
        self.notify_address.as_ref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

fn validate_directory(directory: &Path) -> Result<(), ConfigurationError> {
    if !directory.exists() {
        return Err(ConfigurationError::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(ConfigurationError::NotADirectory(directory.to_path_buf()));
    }
    Ok(())
}

/// Digits only: signs, whitespace and unit suffixes such as `10k` are rejected.
pub fn parse_threshold(raw: &str) -> Result<u64, ConfigurationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigurationError::InvalidThreshold(raw.to_string()));
    }
    raw.parse::<u64>()
        .map_err(|_| ConfigurationError::InvalidThreshold(raw.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub artifact_suffix: String,
    pub compression_level: u32,
    pub incompressible_extensions: Vec<String>,
    pub notification: NotificationSettings,
    pub secrets: SecretSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            incompressible_extensions: DEFAULT_INCOMPRESSIBLE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            notification: NotificationSettings::default(),
            secrets: SecretSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub api_url: String,
    pub from_address: String,
    pub reply_to: String,
    pub subject: String,
    pub timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.sendgrid.com/v3/mail/send".to_string(),
            from_address: "zip-crawler@localhost.localdomain".to_string(),
            reply_to: "zip-crawler@localhost.localdomain".to_string(),
            subject: "Zip Crawler Compression Results".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    Env,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    pub source: SecretSource,
    pub env_var: String,
    pub file_path: PathBuf,
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            source: SecretSource::Env,
            env_var: "SENDGRID_API_KEY".to_string(),
            file_path: PathBuf::from("secrets.key"),
        }
    }
}

/// Load settings from `ZipCrawler.{toml,yaml,json}` in the working directory
/// (or from `path` when given, which must then exist), overlaid by
/// `ZIP_CRAWLER_*` environment variables.
pub fn load_settings(path: Option<&Path>) -> Result<AppSettings, ConfigurationError> {
    let file_source = match path {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name(DEFAULT_SETTINGS_FILE).required(false),
    };

    let builder = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix("ZIP_CRAWLER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("incompressible_extensions"),
        )
        .build()?;

    let settings = builder.try_deserialize::<AppSettings>()?;
    settings.validate()?;
    Ok(settings)
}

impl AppSettings {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(ConfigurationError::InvalidSetting {
                key: "compression_level",
                reason: format!(
                    "{} is out of range 0-{}",
                    self.compression_level, MAX_COMPRESSION_LEVEL
                ),
            });
        }
        if self.artifact_suffix.trim().is_empty() {
            // The artifact would be the original file.
            return Err(ConfigurationError::InvalidSetting {
                key: "artifact_suffix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_email_accepts_standard_shape() {
        let email = EmailAddress::parse("ops.team-1@example.co.uk").unwrap();
        assert_eq!(email.as_str(), "ops.team-1@example.co.uk");
    }

    #[test]
    fn test_email_rejects_malformed() {
        for raw in ["not-an-email", "a@b", "a@b.toolongtld", "with space@x.com", ""] {
            assert!(
                matches!(EmailAddress::parse(raw), Err(ConfigurationError::InvalidEmail(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_threshold_digits_only() {
        assert_eq!(parse_threshold("0").unwrap(), 0);
        assert_eq!(parse_threshold("10000").unwrap(), 10000);
        for raw in ["", "-1", "10k", " 10", "1.5", "99999999999999999999999"] {
            assert!(parse_threshold(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_run_config_rejects_missing_directory() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = RunConfig::new(&missing, "10", None, false).unwrap_err();
        assert!(matches!(err, ConfigurationError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_run_config_rejects_file_as_directory() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = RunConfig::new(&file, "10", None, false).unwrap_err();
        assert!(matches!(err, ConfigurationError::NotADirectory(_)));
    }

    #[test]
    fn test_run_config_valid() {
        let tmp = tempdir().unwrap();
        let config = RunConfig::new(tmp.path(), "1024", Some("me@example.com"), true).unwrap();
        assert_eq!(config.size_threshold(), 1024);
        assert_eq!(config.notify_address().unwrap().as_str(), "me@example.com");
        assert!(config.dry_run());
        assert_eq!(config.directory(), tmp.path());
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(
            &path,
            r#"
artifact_suffix = ".z"
incompressible_extensions = ["png"]

[notification]
subject = "Nightly compaction"
"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.artifact_suffix, ".z");
        assert_eq!(settings.incompressible_extensions, vec!["png".to_string()]);
        assert_eq!(settings.notification.subject, "Nightly compaction");
        assert_eq!(settings.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(settings.secrets.source, SecretSource::Env);
    }

    #[test]
    fn test_settings_missing_explicit_file_is_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("absent.toml");
        assert!(load_settings(Some(&path)).is_err());
    }

    #[test]
    fn test_settings_reject_out_of_range_level() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "compression_level = 12\n").unwrap();

        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidSetting {
                key: "compression_level",
                ..
            }
        ));
    }

    #[test]
    fn test_settings_reject_empty_suffix() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "artifact_suffix = \"\"\n").unwrap();

        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidSetting {
                key: "artifact_suffix",
                ..
            }
        ));
    }
}
