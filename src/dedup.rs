use std::collections::HashSet;

use tracing::info;

use crate::models::EventRecord;

/// Drops records that are equal in every field, keeping the first of each.
pub fn dedupe(records: Vec<EventRecord>) -> Vec<EventRecord> {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<EventRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect();
    info!(before, after = unique.len(), "deduplicated events");
    unique
}
