pub mod cli;
pub mod config;
pub mod dedup;
pub mod export;
pub mod facebook;
pub mod models;
pub mod scraping;
pub mod seeds;
pub mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use config::AppConfig;
use export::{CalendarExporter, ExportFormat};
use facebook::Credentials;
use scraping::collector::{CollectReport, CollectorSettings, EventCollector};
use scraping::{Authenticate, PageRenderer};

#[derive(Debug)]
pub struct RunOptions {
    pub seeds: Vec<String>,
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Sign in before collecting when set.
    pub credentials: Option<Credentials>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: CollectReport,
    pub exported: usize,
    pub output: PathBuf,
}

/// One batch pass: optional login, collection over every seed, export.
/// Only configuration, login and output failures end the run with an error.
pub fn run<R>(mut renderer: R, config: &AppConfig, options: RunOptions) -> Result<RunSummary>
where
    R: PageRenderer + Authenticate,
{
    let settings = CollectorSettings::from_config(config).context("invalid configuration")?;

    if let Some(credentials) = &options.credentials {
        info!(email = %credentials.email, "logging in");
        if let Err(err) = renderer.login(credentials) {
            if let Err(close_err) = renderer.close() {
                warn!(error = %close_err, "failed to close browser session");
            }
            return Err(err).context("There's some error in log in");
        }
    }

    let outcome = EventCollector::new(renderer, settings).collect(options.seeds.as_slice());

    CalendarExporter::new(config.calendar_name.as_str(), options.format)
        .write(&outcome.events, &options.output)
        .with_context(|| format!("failed to export to {}", options.output.display()))?;

    Ok(RunSummary {
        exported: outcome.events.len(),
        report: outcome.report,
        output: options.output,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::scraping::fake::{FakePage, FakeRenderer};
    use crate::scraping::Element;

    const SEED: &str = "https://www.facebook.com/oxfess/events/";

    fn config() -> AppConfig {
        AppConfig {
            delay_secs: 0,
            ..AppConfig::default()
        }
    }

    fn renderer() -> FakeRenderer {
        FakeRenderer::default()
            .with_page(
                SEED,
                FakePage::default()
                    .with("#upcoming_events_card", Element::new(""))
                    .with(
                        "#upcoming_events_card a",
                        Element::new("Social").with_attr("href", "/events/123/"),
                    ),
            )
            .with_page(
                "https://www.facebook.com/events/123/",
                FakePage::default()
                    .with("#title_subtitle", Element::new("Social"))
                    .with("#seo_h1_tag", Element::new("Social"))
                    .with("div._b9- a", Element::new("Oxfess"))
                    .with(
                        "._2ycp",
                        Element::new("").with_attr("content", "2020-03-05T19:00:00+00:00"),
                    ),
            )
    }

    fn options(output: PathBuf, credentials: Option<Credentials>) -> RunOptions {
        RunOptions {
            seeds: vec![SEED.to_string()],
            output,
            format: ExportFormat::Ical,
            credentials,
        }
    }

    #[test]
    fn run_writes_calendar() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("output.ical");
        let summary = run(renderer(), &config(), options(output.clone(), None)).expect("run");

        assert_eq!(summary.exported, 1);
        assert_eq!(summary.report.links_found, 1);
        let ics = fs::read_to_string(&output).expect("read calendar");
        assert!(ics.contains("UID:123@facebook.com"));
        assert!(ics.contains("DTEND:20200305T200000Z"));
    }

    #[test]
    fn failed_login_aborts_before_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("output.ical");
        let credentials = Credentials {
            email: "me@example.com".to_string(),
            password: "wrong".to_string(),
        };
        let renderer = renderer();
        let flags = renderer.flags();
        let err = run(renderer, &config(), options(output.clone(), Some(credentials)))
            .unwrap_err();
        assert!(err.to_string().contains("log in"));
        assert!(!output.exists());
        assert!(!flags.is_logged_in());
        assert!(flags.is_closed());
    }

    #[test]
    fn successful_login_then_collects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("output.ical");
        let credentials = Credentials {
            email: "me@example.com".to_string(),
            password: "secret".to_string(),
        };
        let renderer = renderer();
        let flags = renderer.flags();
        let summary = run(renderer, &config(), options(output, Some(credentials)))
            .expect("run with login");
        assert_eq!(summary.exported, 1);
        assert!(flags.is_logged_in());
        assert!(flags.is_closed());
    }

    #[test]
    fn bad_timezone_fails_before_login() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            timezone: "Nowhere/Special".to_string(),
            ..config()
        };
        let err = run(renderer(), &config, options(dir.path().join("o.ical"), None)).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }
}
