use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Suffix appended to an event id to build its calendar UID.
pub const UID_SUFFIX: &str = "@facebook.com";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventRecord {
    pub id: String, // numeric path segment after /events/
    pub url: String,
    pub summary: String,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl EventRecord {
    /// Stable across runs for the same source event, so calendar clients
    /// update the entry in place on re-import.
    pub fn calendar_uid(&self) -> String {
        format!("{}{UID_SUFFIX}", self.id)
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str) -> EventRecord {
    let start = DateTime::parse_from_rfc3339("2020-03-05T19:00:00+01:00").expect("valid start");
    EventRecord {
        id: id.to_string(),
        url: format!("https://www.facebook.com/events/{id}"),
        summary: "Spring social".to_string(),
        location: "The Old Bank".to_string(),
        description: format!("Drinks and music\n\nhttps://www.facebook.com/events/{id}"),
        organizer: "Oxfess".to_string(),
        start,
        end: start + chrono::Duration::hours(1),
    }
}
