use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Class, Component, Event, EventLike, Property};
use thiserror::Error;
use tracing::info;

use crate::models::EventRecord;
use crate::utils;

/// Facebook does not expose organizer addresses; every event carries this
/// placeholder with the organizer's name as `CN`.
pub const ORGANIZER_ADDRESS: &str = "MAILTO:noreply@facebook.com";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Ical,
    /// Pretty-printed records, for debugging extraction.
    Json,
}

pub struct CalendarExporter {
    calendar_name: String,
    format: ExportFormat,
}

impl CalendarExporter {
    pub fn new(calendar_name: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            calendar_name: calendar_name.into(),
            format,
        }
    }

    pub fn to_calendar(&self, records: &[EventRecord], dtstamp: DateTime<Utc>) -> Calendar {
        let mut calendar = Calendar::new();
        calendar.name(&self.calendar_name);
        for record in records {
            calendar.push(to_event(record, dtstamp));
        }
        calendar.done()
    }

    pub fn render(
        &self,
        records: &[EventRecord],
        dtstamp: DateTime<Utc>,
    ) -> Result<String, ExportError> {
        match self.format {
            ExportFormat::Ical => Ok(self.to_calendar(records, dtstamp).to_string()),
            ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        }
    }

    /// Replaces `path` with the rendered document.
    pub fn write(&self, records: &[EventRecord], path: &Path) -> Result<(), ExportError> {
        let io_error = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let contents = self.render(records, Utc::now())?;
        utils::ensure_parent(path).map_err(io_error)?;
        fs::write(path, contents).map_err(io_error)?;
        info!(path = %path.display(), events = records.len(), format = ?self.format, "calendar written");
        Ok(())
    }
}

fn to_event(record: &EventRecord, dtstamp: DateTime<Utc>) -> Event {
    let organizer = Property::new("ORGANIZER", ORGANIZER_ADDRESS)
        .add_parameter("CN", &record.organizer)
        .done();

    Event::new()
        .uid(&record.calendar_uid())
        .summary(&record.summary)
        .starts(record.start.with_timezone(&Utc))
        .ends(record.end.with_timezone(&Utc))
        .timestamp(dtstamp)
        .location(&record.location)
        .description(&record.description)
        .class(Class::Public)
        .append_property(organizer)
        .done()
}
