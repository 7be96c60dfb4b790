pub mod base;
pub mod collector;
pub mod dates;
pub mod fields;
pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use std::{collections::HashMap, time::Duration};

use thiserror::Error;

use crate::facebook::{Credentials, LoginError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("timed out after {timeout:?} waiting for {selector}")]
    Timeout { selector: String, timeout: Duration },
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("invalid selector {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("no page loaded")]
    NoPage,
    #[error("session error: {0}")]
    Session(String),
}

impl RenderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RenderError::Timeout { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    Present,
    Visible,
}

/// Owned snapshot of a DOM element taken at query time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    text: String,
    attributes: HashMap<String, String>,
    visible: bool,
}

impl Element {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
            visible: true,
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A controllable browser-like session. The collector only ever talks to
/// pages through this trait.
pub trait PageRenderer {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    fn current_url(&self) -> Option<&str>;

    /// Blocks until `selector` satisfies `condition` or `timeout` elapses,
    /// in which case [`RenderError::Timeout`] is returned.
    fn wait_for(
        &mut self,
        selector: &str,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), RenderError>;

    fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, RenderError>;

    fn query(&self, selector: &str) -> Result<Option<Element>, RenderError> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    fn close(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Sessions that can sign in before collection starts.
pub trait Authenticate {
    fn login(&mut self, credentials: &Credentials) -> Result<(), LoginError>;
}
