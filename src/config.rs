use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils;

const DEFAULT_DELAY_SECS: u64 = 5;
const DEFAULT_SCROLL_ITERATIONS: u32 = 5;
const DEFAULT_OUTPUT: &str = "output.ical";
const DEFAULT_EVENT_HOST: &str = "www.facebook.com";
const DEFAULT_CALENDAR_NAME: &str = "Facebook events";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown timezone: {0}")]
    Timezone(String),
}

/// CSS locators for the pieces of a Facebook page the collector reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Selectors {
    /// Container listing upcoming events on a page's events tab.
    pub upcoming_events: String,
    /// Substring an anchor's absolute URL must contain to count as an event link.
    pub event_link_marker: String,
    /// Rendered once the event page header is on screen.
    pub title_marker: String,
    pub summary: String,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub dates: String,
    pub dates_attribute: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            upcoming_events: "#upcoming_events_card".to_string(),
            event_link_marker: "facebook.com/events".to_string(),
            title_marker: "#title_subtitle".to_string(),
            summary: "#seo_h1_tag".to_string(),
            location: "._4dpf._phw".to_string(),
            description: "._63ew".to_string(),
            organizer: "div._b9- a".to_string(),
            dates: "._2ycp".to_string(),
            dates_attribute: "content".to_string(),
        }
    }
}

impl Selectors {
    pub fn event_anchors(&self) -> String {
        format!("{} a", self.upcoming_events)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Upper bound for every element wait; half of it is the scroll pause.
    pub delay_secs: u64,
    pub scroll_iterations: u32,
    /// IANA zone applied to timestamps that carry no offset.
    pub timezone: String,
    pub event_host: String,
    pub user_agent: String,
    pub calendar_name: String,
    pub output: PathBuf,
    pub selectors: Selectors,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_DELAY_SECS,
            scroll_iterations: DEFAULT_SCROLL_ITERATIONS,
            timezone: "UTC".to_string(),
            event_host: DEFAULT_EVENT_HOST.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            selectors: Selectors::default(),
        }
    }
}

impl AppConfig {
    /// Loads an explicit config file, or the default one when `path` is
    /// `None`. Only the default location may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => read_config(path),
            None => {
                let path = utils::config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                read_config(&path)
            }
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
