//! Delivery of the run report.
//!
//! The core only knows two narrow seams: a [`SecretStore`] that hands out the
//! API credential and a [`Notifier`] that sends text to an address. Both are
//! touched only when a report is actually going out.

pub mod secrets;
pub mod sendgrid;

use crate::config::{EmailAddress, RunConfig};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{error, info};

pub use secrets::{secret_store_from_settings, EnvSecretStore, FileSecretStore, SecretStore};
pub use sendgrid::SendGridNotifier;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("could not obtain API credential: {0}")]
    Credential(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub trait Notifier {
    fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    SkippedDryRun,
    SkippedNoAddress,
    Sent,
    Failed(String),
}

/// Send `report` to the run's notify address, at most once.
///
/// Never fails the run: by the time this is called the compaction work is
/// done and cannot be undone, so problems are logged and returned as
/// [`DispatchStatus::Failed`]. The credential is only requested when a
/// message will really be sent.
pub fn dispatch<F, N>(
    config: &RunConfig,
    subject: &str,
    report: &str,
    secrets: &dyn SecretStore,
    connect: F,
) -> DispatchStatus
where
    F: FnOnce(SecretString) -> Result<N, NotifyError>,
    N: Notifier,
{
    if config.dry_run() {
        info!("Dry run, not sending results email");
        return DispatchStatus::SkippedDryRun;
    }
    let Some(to) = config.notify_address() else {
        return DispatchStatus::SkippedNoAddress;
    };

    let sent = secrets
        .api_key()
        .and_then(connect)
        .and_then(|notifier| notifier.send(to, subject, report));

    match sent {
        Ok(()) => {
            info!("Results emailed to {}", to);
            DispatchStatus::Sent
        }
        Err(err) => {
            error!("Could not email results to {}: {}", to, err);
            DispatchStatus::Failed(err.to_string())
        }
    }
}
