//! Feed pipeline orchestration.
//!
//! [`FeedPipeline`] retrieves feed text through an injected [`FeedFetcher`],
//! rejects HTML login/redirect pages, and runs the text through unfolding,
//! extraction, normalization, expansion and range filtering.
//!
//! Each call is independent: state lives only for the duration of one
//! invocation, so one pipeline can serve many feeds concurrently.

use chrono::{DateTime, Utc};
use guildcal_core::{EventWindow, NormalizedEvent, ReferenceZone};
use tracing::{debug, warn};

use crate::error::{FeedError, FeedErrorCode, FeedResult};
use crate::fetch::FeedFetcher;
use crate::ics::{ExpansionLimits, ExtractOptions, parse_events};

/// Markers of an HTML page served in place of feed data.
const HTML_MARKERS: [&str; 2] = ["<!DOCTYPE html>", "<html"];

/// Settings for one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Zone UTC timestamps are normalized into.
    pub zone: ReferenceZone,
    /// Radius of the output window around "now", in years.
    pub window_years: u32,
    /// Recurrence expansion counts.
    pub limits: ExpansionLimits,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            zone: ReferenceZone::default(),
            window_years: EventWindow::DEFAULT_YEARS,
            limits: ExpansionLimits::default(),
        }
    }
}

impl PipelineOptions {
    /// Sets the reference zone.
    pub fn with_zone(mut self, zone: ReferenceZone) -> Self {
        self.zone = zone;
        self
    }

    /// Sets the window radius in years.
    pub fn with_window_years(mut self, years: u32) -> Self {
        self.window_years = years;
        self
    }

    /// Sets the recurrence expansion limits.
    pub fn with_limits(mut self, limits: ExpansionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the window around `now` (evaluated in the reference zone).
    pub fn window_at(&self, now: DateTime<Utc>) -> EventWindow {
        EventWindow::around(self.zone.civil_now(now), self.window_years)
    }

    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            zone: self.zone,
            limits: self.limits,
        }
    }
}

/// Returns true if `body` looks like an HTML page rather than feed data.
pub fn looks_like_html(body: &str) -> bool {
    HTML_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Runs already-retrieved feed text through the pipeline.
///
/// Returns the events inside the window around `now`, sorted by start.
pub fn normalize_feed(
    text: &str,
    options: &PipelineOptions,
    now: DateTime<Utc>,
) -> Vec<NormalizedEvent> {
    let events = parse_events(text, &options.extract_options());
    let extracted = events.len();
    let window = options.window_at(now);
    let selected = window.select(events);

    debug!(
        extracted,
        selected = selected.len(),
        window_start = %window.start,
        window_end = %window.end,
        "Normalized feed"
    );

    selected
}

/// Fetches and normalizes calendar feeds.
#[derive(Debug)]
pub struct FeedPipeline<F> {
    fetcher: F,
    options: PipelineOptions,
}

impl<F: FeedFetcher> FeedPipeline<F> {
    /// Creates a pipeline with default options.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            options: PipelineOptions::default(),
        }
    }

    /// Builder method to set options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches a feed and returns its events, windowed around the current time.
    ///
    /// A blank URL yields an empty list without fetching.
    ///
    /// # Errors
    ///
    /// - `AuthenticationOrAccess` if the response is an HTML page
    /// - `FeedRetrieval` for any other failure
    pub async fn fetch_events(&self, url: &str) -> FeedResult<Vec<NormalizedEvent>> {
        self.fetch_events_at(url, Utc::now()).await
    }

    /// Like [`Self::fetch_events`], with "now" supplied by the caller.
    pub async fn fetch_events_at(
        &self,
        url: &str,
        now: DateTime<Utc>,
    ) -> FeedResult<Vec<NormalizedEvent>> {
        let url = url.trim();
        if url.is_empty() {
            debug!("No feed URL configured, skipping fetch");
            return Ok(Vec::new());
        }

        let body = self.fetcher.fetch_text(url).await.map_err(|e| {
            warn!(fetcher = self.fetcher.name(), error = %e, "Feed fetch failed");
            match e.code() {
                FeedErrorCode::AuthenticationOrAccess => e,
                FeedErrorCode::FeedRetrieval => {
                    FeedError::retrieval(format!("Failed to fetch feed: {}", e.message()))
                        .with_source(e)
                }
            }
        })?;

        if looks_like_html(&body) {
            warn!(bytes = body.len(), "Feed URL returned an HTML page");
            return Err(FeedError::access(
                "Link is a login page; check the calendar's sharing permissions",
            ));
        }

        debug!(bytes = body.len(), "Fetched feed");
        Ok(normalize_feed(&body, &self.options, now))
    }
}
