//! fb-event-scrape CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use fb_event_scrape::cli::Cli;
use fb_event_scrape::config::AppConfig;
use fb_event_scrape::facebook::Credentials;
use fb_event_scrape::scraping::http::HttpRenderer;
use fb_event_scrape::{RunOptions, RunSummary};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Quiet mode: no subscriber, nothing on stdout or stderr.
    if !cli.quiet {
        let filter = if cli.debug {
            EnvFilter::new(Level::DEBUG.to_string())
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match run(&cli) {
        Ok(summary) => {
            if !cli.quiet {
                println!(
                    "{} events written to {} ({} links, {} timed out, {} discarded)",
                    summary.exported,
                    summary.output.display(),
                    summary.report.links_found,
                    summary.report.timeouts,
                    summary.report.discarded,
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    // Validate every input before a session is opened.
    let seeds = cli.seeds()?;
    let credentials = if cli.credentials {
        Some(Credentials::from_file(&cli.credentials_file)?)
    } else {
        None
    };

    if !cli.headless {
        debug!("HTTP session has no window; running headless");
    }
    let renderer =
        HttpRenderer::new(&config.user_agent).context("failed to start browser session")?;

    fb_event_scrape::run(
        renderer,
        &config,
        RunOptions {
            seeds,
            output: config.output.clone(),
            format: cli.format,
            credentials,
        },
    )
}
