use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "zip-crawler")]
#[command(about = "Compress the large, compressible files in a directory", long_about = None)]
pub struct Cli {
    /// The directory to crawl (top level only)
    #[arg(short, long)]
    pub directory: PathBuf,

    /// Files smaller than this many bytes are left alone, no units
    #[arg(short, long, allow_hyphen_values = true)]
    pub threshold: String,

    /// Email address to send the results to
    #[arg(short, long)]
    pub email: Option<String>,

    /// Show what would be compressed without changing files or sending email
    #[arg(long)]
    pub dry_run: bool,

    /// Run detached in the background
    #[arg(short, long)]
    pub background: bool,

    /// Settings file, defaults to ZipCrawler.toml in the working directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Arguments for the detached child, rebuilt from the parsed values so
    /// the background flag is gone however it was spelled.
    pub fn foreground_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--directory".into(),
            self.directory.clone().into_os_string(),
            format!("--threshold={}", self.threshold).into(),
        ];
        if let Some(email) = &self.email {
            args.push("--email".into());
            args.push(email.into());
        }
        if self.dry_run {
            args.push("--dry-run".into());
        }
        if let Some(config) = &self.config {
            args.push("--config".into());
            args.push(config.clone().into_os_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "zip-crawler",
            "-d",
            "/var/log",
            "-t",
            "10000",
            "-e",
            "ops@example.com",
            "--dry-run",
            "-b",
        ])
        .unwrap();

        assert_eq!(cli.directory, PathBuf::from("/var/log"));
        assert_eq!(cli.threshold, "10000");
        assert_eq!(cli.email.as_deref(), Some("ops@example.com"));
        assert!(cli.dry_run);
        assert!(cli.background);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_threshold_is_validated_later() {
        let cli =
            Cli::try_parse_from(["zip-crawler", "--directory", ".", "--threshold", "-5"]).unwrap();
        assert_eq!(cli.threshold, "-5");
        assert!(!cli.dry_run);
        assert!(cli.email.is_none());
    }

    #[test]
    fn test_directory_and_threshold_required() {
        assert!(Cli::try_parse_from(["zip-crawler", "-t", "10"]).is_err());
        assert!(Cli::try_parse_from(["zip-crawler", "-d", "."]).is_err());
    }

    fn reparse(cli: &Cli) -> Cli {
        let mut argv = vec![OsString::from("zip-crawler")];
        argv.extend(cli.foreground_args());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_foreground_args_drop_clustered_background_flag() {
        let cli = Cli::try_parse_from(["zip-crawler", "-bt", "100", "-d", "."]).unwrap();
        assert!(cli.background);
        assert_eq!(cli.threshold, "100");

        let child = reparse(&cli);
        assert!(!child.background);
        assert_eq!(child.threshold, "100");
        assert_eq!(child.directory, PathBuf::from("."));
    }

    #[test]
    fn test_foreground_args_keep_every_other_option() {
        let cli = Cli::try_parse_from([
            "zip-crawler",
            "--background",
            "-d",
            "/srv/data",
            "-t",
            "-5",
            "-e",
            "ops@example.com",
            "--dry-run",
            "-c",
            "/etc/zip.toml",
        ])
        .unwrap();

        let child = reparse(&cli);
        assert!(!child.background);
        assert_eq!(child.directory, PathBuf::from("/srv/data"));
        assert_eq!(child.threshold, "-5");
        assert_eq!(child.email.as_deref(), Some("ops@example.com"));
        assert!(child.dry_run);
        assert_eq!(child.config, Some(PathBuf::from("/etc/zip.toml")));
    }
}
