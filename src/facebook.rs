use std::{
    fs,
    path::{Path, PathBuf},
};

use reqwest::Url;
use thiserror::Error;

use crate::scraping::RenderError;

pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.txt";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("No such file or directory: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("email or password missing in {}", .0.display())]
    Incomplete(PathBuf),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("login page error: {0}")]
    Render(#[from] RenderError),
    #[error("http error: {0}")]
    Http(String),
    #[error("login rejected, check the credentials")]
    Rejected,
    #[error("account requires a verification checkpoint (MFA)")]
    CheckpointRequired,
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads a two-line file where each line carries its value between the
    /// first pair of double quotes, e.g. `email = "me@example.com"`.
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        if !path.is_file() {
            return Err(CredentialsError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).ok_or_else(|| CredentialsError::Incomplete(path.to_path_buf()))
    }

    pub fn parse(contents: &str) -> Option<Self> {
        let mut lines = contents.lines();
        let email = quoted_value(lines.next()?)?;
        let password = quoted_value(lines.next()?)?;
        Some(Self { email, password })
    }
}

fn quoted_value(line: &str) -> Option<String> {
    let value = line.split('"').nth(1)?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Returns the path segment that follows `events` in an event link.
pub fn event_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?;
    segments.by_ref().find(|segment| *segment == "events")?;
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

pub fn canonical_url(host: &str, id: &str) -> String {
    format!("https://{host}/events/{id}")
}
