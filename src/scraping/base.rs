use std::time::Duration;

use reqwest::{blocking::Client, Url};
use scraper::ElementRef;

use super::RenderError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Like [`clean_text`] but keeps line structure: every line is cleaned and
/// blank lines are dropped.
pub fn clean_block(input: &str) -> String {
    input
        .lines()
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rendered text of a node, trimmed at the ends only.
pub fn inner_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn absolute_url(base: &str, href: Option<&str>) -> Option<String> {
    let href = href?.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base_url = Url::parse(base).ok()?;
    base_url.join(href).ok().map(|u| u.to_string())
}

pub fn build_client(user_agent: &str) -> Result<Client, RenderError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent)
        .cookie_store(true)
        .build()
        .map_err(|err| RenderError::Session(err.to_string()))
}

pub fn fetch_html(client: &Client, url: &str) -> Result<(String, String), RenderError> {
    let navigation = |reason: String| RenderError::Navigation {
        url: url.to_string(),
        reason,
    };
    let response = client
        .get(url)
        .send()
        .map_err(|err| navigation(format!("request failed: {err}")))?;
    let response = response
        .error_for_status()
        .map_err(|err| navigation(format!("non-success status: {err}")))?;
    // Redirects (e.g. to a login wall) change the effective base for links.
    let final_url = response.url().to_string();
    let body = response
        .text()
        .map_err(|err| navigation(format!("unable to read response body: {err}")))?;
    Ok((final_url, body))
}
