use std::{thread, time::Duration};

use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::base;
use super::dates::{DateNormalizer, TimeRange};
use super::fields::{FieldError, FieldExtractor};
use super::{PageRenderer, RenderError, WaitCondition};
use crate::config::{AppConfig, ConfigError, Selectors};
use crate::dedup;
use crate::facebook;
use crate::models::EventRecord;
use crate::seeds;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page did not render: {0}")]
    Timeout(RenderError),
    #[error(transparent)]
    Render(RenderError),
    #[error("no event id in {0}")]
    MissingId(String),
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl From<RenderError> for ExtractError {
    fn from(err: RenderError) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout(err)
        } else {
            ExtractError::Render(err)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub delay: Duration,
    pub scroll_iterations: u32,
    pub event_host: String,
    pub timezone: Tz,
    pub selectors: Selectors,
}

impl CollectorSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            delay: config.delay(),
            scroll_iterations: config.scroll_iterations,
            event_host: config.event_host.clone(),
            timezone: config.tz()?,
            selectors: config.selectors.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub seeds: usize,
    pub seeds_without_events: usize,
    pub seeds_failed: usize,
    pub links_found: usize,
    pub extracted: usize,
    pub timeouts: usize,
    pub discarded: usize,
    pub before_dedup: usize,
    pub after_dedup: usize,
}

#[derive(Debug)]
pub struct CollectOutcome {
    pub events: Vec<EventRecord>,
    pub report: CollectReport,
}

/// Drives one renderer session through discovery and extraction.
///
/// The session is closed when [`EventCollector::collect`] finishes, or when
/// the collector is dropped without having collected.
pub struct EventCollector<R: PageRenderer> {
    renderer: R,
    settings: CollectorSettings,
    normalizer: DateNormalizer,
    events: Vec<EventRecord>,
    report: CollectReport,
    closed: bool,
}

impl<R: PageRenderer> EventCollector<R> {
    pub fn new(renderer: R, settings: CollectorSettings) -> Self {
        let normalizer = DateNormalizer::new(settings.timezone);
        Self {
            renderer,
            settings,
            normalizer,
            events: Vec::new(),
            report: CollectReport::default(),
            closed: false,
        }
    }

    pub fn report(&self) -> &CollectReport {
        &self.report
    }

    /// Event links listed under the seed's upcoming-events container, in
    /// page order. A seed without upcoming events yields no links.
    pub fn discover(&mut self, seed: &str) -> Vec<String> {
        let target = seeds::navigation_target(seed);
        match self.try_discover(&target) {
            Ok(links) => {
                info!(page = %target, count = links.len(), "events found on page");
                links
            }
            Err(err) if err.is_timeout() => {
                info!(page = %target, "time out on page, no upcoming events");
                self.report.seeds_without_events += 1;
                Vec::new()
            }
            Err(err) => {
                warn!(page = %target, error = %err, "skipping page");
                self.report.seeds_failed += 1;
                Vec::new()
            }
        }
    }

    fn try_discover(&mut self, target: &str) -> Result<Vec<String>, RenderError> {
        self.renderer.navigate(target)?;
        self.renderer.wait_for(
            &self.settings.selectors.upcoming_events,
            WaitCondition::Present,
            self.settings.delay,
        )?;

        let anchors = self.settings.selectors.event_anchors();
        self.load_lazy_links(&anchors)?;

        let page_url = self.renderer.current_url().unwrap_or(target).to_string();
        let marker = &self.settings.selectors.event_link_marker;
        Ok(self
            .renderer
            .query_all(&anchors)?
            .iter()
            .filter_map(|anchor| base::absolute_url(&page_url, anchor.attr("href")))
            .filter(|href| href.contains(marker.as_str()))
            .collect())
    }

    /// Scrolls until the anchor count stops growing, at most
    /// `scroll_iterations` times, pausing half the delay after each scroll.
    fn load_lazy_links(&mut self, anchors: &str) -> Result<(), RenderError> {
        let pause = self.settings.delay / 2;
        let mut seen = self.renderer.query_all(anchors)?.len();
        for _ in 0..self.settings.scroll_iterations {
            self.renderer.scroll_to_bottom()?;
            thread::sleep(pause);
            let count = self.renderer.query_all(anchors)?.len();
            if count == seen {
                debug!(count, "link count settled");
                break;
            }
            seen = count;
        }
        Ok(())
    }

    /// Builds one record from an event page. Summary, location and
    /// description degrade to `""`; a render timeout, a missing organizer or
    /// missing dates reject the record.
    pub fn extract(&mut self, link: &str) -> Result<EventRecord, ExtractError> {
        let selectors = &self.settings.selectors;
        self.renderer.navigate(link)?;
        self.renderer.wait_for(
            &selectors.title_marker,
            WaitCondition::Visible,
            self.settings.delay,
        )?;

        let id = facebook::event_id(link).ok_or_else(|| ExtractError::MissingId(link.to_string()))?;
        let url = facebook::canonical_url(&self.settings.event_host, &id);

        let fields = FieldExtractor::new(&self.renderer);
        let summary = fields.best_effort("summary", &selectors.summary);
        let location = fields.best_effort("location", &selectors.location);
        let description = fields.description(&selectors.description, &url);
        let organizer = fields.organizer(&selectors.organizer)?;
        let TimeRange { start, end } =
            fields.dates(&self.normalizer, &selectors.dates, &selectors.dates_attribute)?;

        Ok(EventRecord {
            id,
            url,
            summary,
            location,
            description,
            organizer,
            start,
            end,
        })
    }

    fn extract_into_list(&mut self, link: &str) {
        match self.extract(link) {
            Ok(record) => {
                debug!(id = %record.id, summary = %record.summary, "extracted event");
                self.report.extracted += 1;
                self.events.push(record);
            }
            Err(ExtractError::Timeout(err)) => {
                warn!(url = %link, error = %err, "time out on event page, skipping");
                self.report.timeouts += 1;
            }
            Err(err) => {
                warn!(url = %link, error = %err, "discarding event");
                self.report.discarded += 1;
            }
        }
    }

    /// Runs every seed in order, deduplicates the records and releases the
    /// session.
    pub fn collect<S: AsRef<str>>(mut self, seeds: &[S]) -> CollectOutcome {
        for seed in seeds {
            self.report.seeds += 1;
            let links = self.discover(seed.as_ref());
            self.report.links_found += links.len();
            for link in &links {
                self.extract_into_list(link);
            }
        }
        self.release();

        let events = std::mem::take(&mut self.events);
        self.report.before_dedup = events.len();
        let events = dedup::dedupe(events);
        self.report.after_dedup = events.len();

        CollectOutcome {
            events,
            report: std::mem::take(&mut self.report),
        }
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.renderer.close() {
            warn!(error = %err, "failed to close browser session");
        }
    }
}

impl<R: PageRenderer> Drop for EventCollector<R> {
    fn drop(&mut self) {
        self.release();
    }
}
