//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;
use crate::export::ExportFormat;
use crate::facebook::DEFAULT_CREDENTIALS_FILE;
use crate::seeds::{self, InputError};

/// Non API public FB event miner
#[derive(Debug, Parser)]
#[command(name = "fb-event-scrape")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pages to scrape for events (URLs or page names)
    #[arg(short, long, num_args = 1..)]
    pub events: Vec<String>,

    /// File with a list of FB events pages, one per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Where to write the calendar (overrides the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output document format
    #[arg(long, value_enum, default_value_t = ExportFormat::Ical)]
    pub format: ExportFormat,

    /// Log in with the credentials file before scraping
    #[arg(short, long)]
    pub credentials: bool,

    /// Credentials file: email and password, each quoted on its own line
    #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE)]
    pub credentials_file: PathBuf,

    /// Run the session without a visible window (the HTTP session always is)
    #[arg(long)]
    pub headless: bool,

    /// Silence all output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, env = "FB_EVENT_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for page elements (overrides the config file)
    #[arg(long)]
    pub delay: Option<u64>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,
}

impl Cli {
    /// Seeds from `--events` followed by those read from `--file`.
    pub fn seeds(&self) -> Result<Vec<String>, InputError> {
        let mut urls = self.events.clone();
        if let Some(file) = &self.file {
            urls.extend(seeds::parse_file(file)?);
        }
        if urls.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(urls)
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(delay) = self.delay {
            config.delay_secs = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fb-event-scrape").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn events_take_multiple_values() {
        let cli = parse(&["-e", "oxfess", "https://www.facebook.com/bar/events/", "-q"]);
        assert_eq!(cli.events.len(), 2);
        assert!(cli.quiet);
        assert_eq!(cli.format, ExportFormat::Ical);
        assert_eq!(cli.credentials_file, PathBuf::from("credentials.txt"));
        assert_eq!(cli.seeds().expect("seeds"), cli.events);
    }

    #[test]
    fn file_seeds_follow_direct_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pages.txt");
        std::fs::write(&path, "https://www.facebook.com/bar/events/\njunk\n").expect("write");

        let cli = parse(&["-e", "oxfess", "-f", path.to_str().expect("utf8 path")]);
        assert_eq!(
            cli.seeds().expect("seeds"),
            vec![
                "oxfess".to_string(),
                "https://www.facebook.com/bar/events/".to_string()
            ]
        );
    }

    #[test]
    fn no_input_is_an_error() {
        assert!(matches!(parse(&[]).seeds(), Err(InputError::Empty)));
    }

    #[test]
    fn bad_seed_file_is_an_error_even_with_direct_seeds() {
        let cli = parse(&["-e", "oxfess", "-f", "/definitely/not/here.txt"]);
        assert!(matches!(cli.seeds(), Err(InputError::NotFound(_))));
    }

    #[test]
    fn overrides_apply_to_config() {
        let cli = parse(&["-e", "x", "-o", "cal/fb.ics", "--delay", "9", "--format", "json"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.output, PathBuf::from("cal/fb.ics"));
        assert_eq!(config.delay_secs, 9);
        assert_eq!(cli.format, ExportFormat::Json);
    }
}
