use thiserror::Error;
use tracing::{debug, warn};

use super::base;
use super::dates::{DateNormalizer, DateParseError, TimeRange};
use super::{PageRenderer, RenderError};

/// Outcome of looking up one field on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Found(T),
    Absent,
}

impl<T> Field<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Field::Found(value) => Some(value),
            Field::Absent => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Found(value) => Field::Found(f(value)),
            Field::Absent => Field::Absent,
        }
    }

    pub fn required(self, field: &'static str, selector: &str) -> Result<T, FieldError> {
        self.found().ok_or_else(|| FieldError::Missing {
            field,
            selector: selector.to_string(),
        })
    }
}

impl Field<String> {
    pub fn or_empty(self) -> String {
        self.found().unwrap_or_default()
    }

    fn from_text(text: String) -> Self {
        if text.is_empty() {
            Field::Absent
        } else {
            Field::Found(text)
        }
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("{field} not found ({selector})")]
    Missing {
        field: &'static str,
        selector: String,
    },
    #[error("{field} lookup failed: {source}")]
    Render {
        field: &'static str,
        source: RenderError,
    },
    #[error("bad dates: {0}")]
    Date(#[from] DateParseError),
}

/// Reads single fields off whatever page the renderer currently shows.
pub struct FieldExtractor<'a, R: PageRenderer + ?Sized> {
    renderer: &'a R,
}

impl<'a, R: PageRenderer + ?Sized> FieldExtractor<'a, R> {
    pub fn new(renderer: &'a R) -> Self {
        Self { renderer }
    }

    /// Text of the first match; elements with only whitespace count as absent.
    pub fn text(&self, selector: &str) -> Result<Field<String>, RenderError> {
        Ok(self
            .raw_text(selector)?
            .map(|text| base::clean_block(&text)))
    }

    /// Text of the first match as rendered, only trimmed at the ends.
    pub fn raw_text(&self, selector: &str) -> Result<Field<String>, RenderError> {
        Ok(match self.renderer.query(selector)? {
            Some(element) => Field::from_text(element.text().trim().to_string()),
            None => Field::Absent,
        })
    }

    pub fn attr(&self, selector: &str, attr: &str) -> Result<Field<String>, RenderError> {
        Ok(self
            .renderer
            .query(selector)?
            .and_then(|element| element.attr(attr).map(str::trim).map(str::to_string))
            .map(Field::from_text)
            .unwrap_or(Field::Absent))
    }

    /// Never fails: a missing element or a broken lookup yields `""`.
    pub fn best_effort(&self, field: &'static str, selector: &str) -> String {
        degrade(field, selector, self.text(selector)).or_empty()
    }

    pub fn required_text(&self, field: &'static str, selector: &str) -> Result<String, FieldError> {
        self.text(selector)
            .map_err(|source| FieldError::Render { field, source })?
            .required(field, selector)
    }

    /// Best-effort description with the canonical link appended.
    pub fn description(&self, selector: &str, canonical_url: &str) -> String {
        degrade("description", selector, self.raw_text(selector))
            .map(|text| compose_description(&text, canonical_url))
            .or_empty()
    }

    /// The first listed organizer; co-hosts are not represented.
    pub fn organizer(&self, selector: &str) -> Result<String, FieldError> {
        self.required_text("organizer", selector)
    }

    pub fn dates(
        &self,
        normalizer: &DateNormalizer,
        selector: &str,
        attr: &str,
    ) -> Result<TimeRange, FieldError> {
        let raw = self
            .attr(selector, attr)
            .map_err(|source| FieldError::Render {
                field: "dates",
                source,
            })?
            .required("dates", selector)?;
        Ok(normalizer.normalize(&raw)?)
    }
}

fn degrade(
    field: &'static str,
    selector: &str,
    lookup: Result<Field<String>, RenderError>,
) -> Field<String> {
    match lookup {
        Ok(Field::Absent) => {
            debug!(field, selector, "field absent, defaulting to empty");
            Field::Absent
        }
        Ok(found) => found,
        Err(err) => {
            warn!(field, selector, error = %err, "field lookup failed, defaulting to empty");
            Field::Absent
        }
    }
}

pub fn compose_description(text: &str, canonical_url: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{text}\n\n{canonical_url}")
    }
}
