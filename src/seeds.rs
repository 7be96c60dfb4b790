use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EVENTS_PAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https://)?(www\.)?facebook\.com/\S+/events/$").expect("valid events page regex")
});

#[derive(Debug, Error)]
pub enum InputError {
    #[error("No such file or directory: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Error no facebook url found in {}", .0.display())]
    NoSeeds(PathBuf),
    #[error("No input provided")]
    Empty,
}

/// Keeps only the lines that look like a page's events tab, in file order.
pub fn filter_seed_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| EVENTS_PAGE_RE.is_match(line))
        .map(str::to_string)
        .collect()
}

pub fn parse_file(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = filter_seed_lines(&contents);
    if urls.is_empty() {
        return Err(InputError::NoSeeds(path.to_path_buf()));
    }
    Ok(urls)
}

/// Builds the URL to open for a seed: full URLs pass through, scheme-less
/// facebook URLs gain `https://`, bare page names point at their events tab.
pub fn navigation_target(seed: &str) -> String {
    let seed = seed.trim();
    if seed.starts_with("http://") || seed.starts_with("https://") {
        seed.to_string()
    } else if seed.starts_with("facebook.com/") || seed.starts_with("www.facebook.com/") {
        format!("https://{seed}")
    } else {
        format!("https://www.facebook.com/{}/events/", seed.trim_matches('/'))
    }
}
