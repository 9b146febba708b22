mod background;
mod commands;
mod logging;
mod progress;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use background::{ProcessRunner, SelfRespawn};
use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{debug, error, info, warn};
use zip_crawler_core::config::{self, AppSettings};
use zip_crawler_core::notify::{self, secret_store_from_settings, SendGridNotifier};
use zip_crawler_core::{report, DirectoryCompactor, RunConfig};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();

    let _guard = logging::init_logger();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let settings =
        config::load_settings(args.config.as_deref()).context("Error loading settings")?;

    // Everything is validated before anything is scanned or detached.
    let run_config = RunConfig::new(
        &args.directory,
        &args.threshold,
        args.email.as_deref(),
        args.dry_run,
    )
    .context("Invalid arguments")?;

    // The child gets a marker too, so it crawls even if a flag slipped through.
    if args.background && !background::is_detached() {
        let child_args = args.foreground_args();
        let pid = SelfRespawn
            .detach(child_args)
            .context("Could not start background process")?;
        info!("Running in the background as process {}", pid);
        return Ok(());
    }

    run_crawl(&run_config, &settings)
}

fn run_crawl(run_config: &RunConfig, settings: &AppSettings) -> anyhow::Result<()> {
    let start = Instant::now();
    let compactor = DirectoryCompactor::from_settings(run_config.clone(), settings);
    let reporter = CliReporter::new();
    let result = compactor.run(&reporter)?;

    let report = report::render(&result);
    println!();
    print!("{}", report);
    println!();

    info!(
        "Crawl: {}, {} compressed, {} not compressed, {} bytes saved",
        format!("{:.2}s", start.elapsed().as_secs_f64()).green(),
        format!("{}", result.compressed_names().len()).green(),
        format!("{}", result.uncompressed_names().len()).yellow(),
        format!("{}", result.total_savings_bytes()).cyan(),
    );
    if result.failed_count() > 0 {
        warn!(
            "{} files could not be processed, see the log for details",
            format!("{}", result.failed_count()).red()
        );
    }

    let secrets = secret_store_from_settings(&settings.secrets);
    let status = notify::dispatch(
        run_config,
        &settings.notification.subject,
        &report,
        secrets.as_ref(),
        |api_key| SendGridNotifier::new(&settings.notification, api_key),
    );
    debug!("Notification: {:?}", status);

    Ok(())
}
