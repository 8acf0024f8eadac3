//! Event listing.
//!
//! Every selected feed goes through its own pipeline invocation on a
//! separate task; the results are merged into one chronological list.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use guildcal_core::{NormalizedEvent, ReferenceZone};
use guildcal_feed::{
    FeedError, FeedFetcher, FeedPipeline, FeedStatus, HttpFetcher, PipelineOptions,
};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::{ClientConfig, FeedSettings};
use crate::error::{ClientError, ClientResult};

/// Outcome of loading one feed.
#[derive(Debug)]
pub struct FeedReport {
    /// Configured feed name.
    pub name: String,
    /// Summary of the outcome.
    pub status: FeedStatus,
    /// Events in range; empty on failure.
    pub events: Vec<NormalizedEvent>,
    /// The failure, if any.
    pub error: Option<FeedError>,
}

/// An event tagged with the feed it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEvent {
    /// Name of the feed the event was loaded from.
    pub feed: String,
    /// The event itself, flattened into the same JSON object.
    #[serde(flatten)]
    pub event: NormalizedEvent,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    feeds: Vec<JsonFeed<'a>>,
    events: Vec<FeedEvent>,
}

#[derive(Debug, Serialize)]
struct JsonFeed<'a> {
    name: &'a str,
    status: String,
}

/// Lists events from the selected feeds.
///
/// `config_path` is the file `config` was read from; it is only used in
/// messages.
pub async fn run(
    config: &ClientConfig,
    config_path: &Path,
    feed: Option<&str>,
    url: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    let (options, feeds) = prepare(config, config_path, feed, url)?;

    let fetcher = HttpFetcher::new(&config.fetch_config())?;
    let pipeline = Arc::new(FeedPipeline::new(fetcher).with_options(options));
    let mut reports = load_feeds(pipeline, feeds, Utc::now()).await;

    if json {
        let output = render_json(&reports).map_err(|e| {
            ClientError::Config(format!("failed to serialize events: {}", e))
        })?;
        println!("{}", output);
    } else {
        print!("{}", render_text(&reports, options.zone, &Local));
    }

    // Only fail the command when nothing could be loaded.
    if reports.iter().all(|r| r.status.is_error()) {
        if let Some(err) = reports.iter_mut().find_map(|r| r.error.take()) {
            return Err(err.into());
        }
    }

    Ok(())
}

/// Validates the configuration and resolves the pipeline options and the
/// feeds to load.
pub fn prepare(
    config: &ClientConfig,
    config_path: &Path,
    feed: Option<&str>,
    url: Option<&str>,
) -> ClientResult<(PipelineOptions, Vec<FeedSettings>)> {
    config.validate().map_err(|e| {
        ClientError::Config(format!("{} ({})", e, config_path.display()))
    })?;
    let options = config.pipeline_options().map_err(ClientError::Config)?;

    let feeds = select_feeds(config, feed, url)?;
    if feeds.is_empty() {
        return Err(ClientError::Config(format!(
            "no visible feeds configured; add [[feeds]] entries to {}",
            config_path.display()
        )));
    }

    Ok((options, feeds))
}

/// Picks the feeds to load.
///
/// An ad hoc `url` wins over everything; a named `feed` is loaded even if
/// hidden; otherwise all visible feeds are loaded in configuration order.
pub fn select_feeds(
    config: &ClientConfig,
    feed: Option<&str>,
    url: Option<&str>,
) -> ClientResult<Vec<FeedSettings>> {
    if let Some(url) = url {
        return Ok(vec![FeedSettings::new(url.trim(), url)]);
    }

    match feed {
        Some(name) => config
            .find_feed(name)
            .cloned()
            .map(|f| vec![f])
            .ok_or_else(|| ClientError::Config(format!("no feed named {}", name))),
        None => Ok(config.visible_feeds()),
    }
}

/// Loads every feed concurrently and returns the reports in input order.
pub async fn load_feeds<F>(
    pipeline: Arc<FeedPipeline<F>>,
    feeds: Vec<FeedSettings>,
    now: DateTime<Utc>,
) -> Vec<FeedReport>
where
    F: FeedFetcher + 'static,
{
    let mut tasks = JoinSet::new();

    for (index, feed) in feeds.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        tasks.spawn(async move {
            let outcome = pipeline
                .fetch_events_at(&feed.url, now)
                .await
                .map_err(|e| e.with_feed(feed.name.clone()));
            let status = FeedStatus::from_outcome(&feed.url, &outcome);
            debug!(feed = %feed.name, %status, "Feed loaded");

            let (events, error) = match outcome {
                Ok(events) => (events, None),
                Err(e) => (Vec::new(), Some(e)),
            };
            let report = FeedReport {
                name: feed.name,
                status,
                events,
                error,
            };
            (index, report)
        });
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(entry) => reports.push(entry),
            Err(e) => warn!(error = %e, "Feed task did not complete"),
        }
    }

    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

/// Merges the events of all reports into one list sorted by start.
///
/// Events starting at the same time keep feed order.
pub fn merge_events(reports: &[FeedReport]) -> Vec<FeedEvent> {
    let mut events: Vec<FeedEvent> = reports
        .iter()
        .flat_map(|report| {
            report.events.iter().map(|event| FeedEvent {
                feed: report.name.clone(),
                event: event.clone(),
            })
        })
        .collect();
    events.sort_by_key(|e| e.event.start);
    events
}

/// Renders feed statuses followed by the merged events grouped by day.
///
/// Times are shown in the reference zone, followed by the same instant in
/// `local`.
pub fn render_text<Z>(reports: &[FeedReport], zone: ReferenceZone, local: &Z) -> String
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!("{}: {}\n", report.name, report.status));
    }

    let events = merge_events(reports);
    if events.is_empty() {
        out.push_str("\nNo events.\n");
        return out;
    }

    let mut current_day: Option<NaiveDate> = None;
    for item in &events {
        let day = item.event.date();
        if current_day != Some(day) {
            out.push_str(&format!("\n{}\n", day.format("%A, %B %-d %Y")));
            current_day = Some(day);
        }
        out.push_str(&format!(
            "  {}  {}  [{}]\n",
            format_time(&item.event, zone, local),
            item.event.title,
            item.feed
        ));
    }

    out
}

fn format_time<Z>(event: &NormalizedEvent, zone: ReferenceZone, local: &Z) -> String
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    match zone.localize(event.start) {
        Some(at) => format!(
            "{} ({} local)",
            at.format("%H:%M %Z"),
            at.with_timezone(local).format("%H:%M")
        ),
        // Spring-forward gap: the civil time has no instant.
        None => event.start.format("%H:%M").to_string(),
    }
}

/// Renders statuses and merged events as pretty JSON.
pub fn render_json(reports: &[FeedReport]) -> serde_json::Result<String> {
    let output = JsonOutput {
        feeds: reports
            .iter()
            .map(|r| JsonFeed {
                name: &r.name,
                status: r.status.to_string(),
            })
            .collect(),
        events: merge_events(reports),
    };
    serde_json::to_string_pretty(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::NaiveDateTime;
    use guildcal_feed::{BoxFuture, FeedResult};

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn report(name: &str, events: Vec<NormalizedEvent>) -> FeedReport {
        let status = if events.is_empty() {
            FeedStatus::NoLink
        } else {
            FeedStatus::Loaded(events.len())
        };
        FeedReport {
            name: name.to_string(),
            status,
            events,
            error: None,
        }
    }

    fn sample_reports() -> Vec<FeedReport> {
        vec![
            report(
                "Guild 1",
                vec![
                    NormalizedEvent::new("Raid Night", dt(2024, 1, 1, 15, 0)),
                    NormalizedEvent::new("Guild Missions", dt(2024, 1, 2, 20, 0)),
                ],
            ),
            report("Guild 2", Vec::new()),
            report(
                "Guild 3",
                vec![NormalizedEvent::new("Crafting", dt(2024, 1, 1, 19, 30))],
            ),
        ]
    }

    /// Serves a fixed body per URL.
    struct MapFetcher(HashMap<&'static str, String>);

    impl FeedFetcher for MapFetcher {
        fn name(&self) -> &str {
            "map"
        }

        fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
            let result = self
                .0
                .get(url)
                .cloned()
                .ok_or_else(|| FeedError::retrieval(format!("no route for {}", url)));
            Box::pin(async move { result })
        }
    }

    mod selection {
        use super::*;

        fn config() -> ClientConfig {
            ClientConfig {
                feeds: vec![
                    FeedSettings::new("Guild 1", "https://example.com/1.ics"),
                    FeedSettings {
                        visible: false,
                        ..FeedSettings::new("Guild 2", "https://example.com/2.ics")
                    },
                ],
                ..Default::default()
            }
        }

        #[test]
        fn defaults_to_visible_feeds() {
            let feeds = select_feeds(&config(), None, None).unwrap();
            assert_eq!(feeds.len(), 1);
            assert_eq!(feeds[0].name, "Guild 1");
        }

        #[test]
        fn named_feed_may_be_hidden() {
            let feeds = select_feeds(&config(), Some("guild 2"), None).unwrap();
            assert_eq!(feeds[0].url, "https://example.com/2.ics");
        }

        #[test]
        fn unknown_name_errors() {
            let err = select_feeds(&config(), Some("Guild 9"), None).unwrap_err();
            assert!(err.to_string().contains("Guild 9"));
        }

        #[test]
        fn prepare_rejects_zero_window() {
            let config = ClientConfig {
                window_years: 0,
                ..config()
            };
            let err = prepare(&config, Path::new("/etc/guildcal.toml"), None, None).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)));
            assert!(err.to_string().contains("window_years"));
            assert!(err.to_string().contains("/etc/guildcal.toml"));
        }

        #[test]
        fn prepare_names_the_config_file_when_nothing_is_visible() {
            let config = ClientConfig::default();
            let err = prepare(&config, Path::new("/tmp/custom.toml"), None, None).unwrap_err();
            assert_eq!(
                err.to_string(),
                "configuration error: no visible feeds configured; add [[feeds]] entries to /tmp/custom.toml"
            );
        }

        #[test]
        fn prepare_resolves_options_and_feeds() {
            let config = ClientConfig {
                window_years: 1,
                ..config()
            };
            let (options, feeds) =
                prepare(&config, Path::new("config.toml"), Some("Guild 2"), None).unwrap();
            assert_eq!(options.window_years, 1);
            assert_eq!(feeds[0].name, "Guild 2");
        }

        #[test]
        fn ad_hoc_url() {
            let feeds = select_feeds(&config(), None, Some("https://example.com/x.ics")).unwrap();
            assert_eq!(
                feeds,
                vec![FeedSettings::new(
                    "https://example.com/x.ics",
                    "https://example.com/x.ics"
                )]
            );
        }
    }

    #[tokio::test]
    async fn load_feeds_keeps_order_and_reports_status() {
        let raid = "BEGIN:VEVENT\r\nSUMMARY:Raid Night\r\nDTSTART:20240101T200000Z\r\nEND:VEVENT\r\n";
        let fetcher = MapFetcher(HashMap::from([
            ("https://example.com/1.ics", raid.to_string()),
            ("https://example.com/3.ics", "<!DOCTYPE html><html></html>".to_string()),
            ("https://example.com/4.ics", "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n".to_string()),
        ]));
        let pipeline = Arc::new(FeedPipeline::new(fetcher));
        let feeds = vec![
            FeedSettings::new("Guild 1", "https://example.com/1.ics"),
            FeedSettings::new("Guild 2", ""),
            FeedSettings::new("Guild 3", "https://example.com/3.ics"),
            FeedSettings::new("Guild 4", "https://example.com/4.ics"),
            FeedSettings::new("Guild 5", "https://example.com/5.ics"),
        ];
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let reports = load_feeds(pipeline, feeds, now).await;

        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Guild 1", "Guild 2", "Guild 3", "Guild 4", "Guild 5"]);

        assert_eq!(reports[0].status, FeedStatus::Loaded(1));
        assert_eq!(reports[0].events[0].start, dt(2024, 1, 1, 15, 0));
        assert_eq!(reports[1].status, FeedStatus::NoLink);
        assert_eq!(reports[3].status, FeedStatus::NoEvents);

        let access = reports[2].error.as_ref().unwrap();
        assert!(access.is_access_denied());
        assert_eq!(access.feed(), Some("Guild 3"));
        assert!(reports[2].status.is_error());

        let retrieval = reports[4].error.as_ref().unwrap();
        assert!(!retrieval.is_access_denied());
        assert!(retrieval.message().contains("no route"));
    }

    #[test]
    fn merge_sorts_across_feeds() {
        let merged = merge_events(&sample_reports());
        let titles: Vec<_> = merged.iter().map(|e| e.event.title.as_str()).collect();
        assert_eq!(titles, ["Raid Night", "Crafting", "Guild Missions"]);
        assert_eq!(merged[1].feed, "Guild 3");
    }

    #[test]
    fn text_output() {
        let text = render_text(&sample_reports(), ReferenceZone::default(), &Utc);
        insta::assert_snapshot!(text, @r"
        Guild 1: Loaded 2
        Guild 2: No Link
        Guild 3: Loaded 1

        Monday, January 1 2024
          15:00 EST (20:00 local)  Raid Night  [Guild 1]
          19:30 EST (00:30 local)  Crafting  [Guild 3]

        Tuesday, January 2 2024
          20:00 EST (01:00 local)  Guild Missions  [Guild 1]
        ");
    }

    #[test]
    fn text_output_without_events() {
        let text = render_text(&[report("Guild 2", Vec::new())], ReferenceZone::default(), &Utc);
        assert_eq!(text, "Guild 2: No Link\n\nNo events.\n");
    }

    #[test]
    fn json_output() {
        let json = render_json(&sample_reports()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["feeds"][1]["name"], "Guild 2");
        assert_eq!(value["feeds"][1]["status"], "No Link");
        assert_eq!(value["events"].as_array().unwrap().len(), 3);
        assert_eq!(value["events"][0]["feed"], "Guild 1");
        assert_eq!(value["events"][0]["title"], "Raid Night");
        assert_eq!(value["events"][0]["start"], "2024-01-01T15:00:00");
        assert_eq!(value["events"][0]["description"], "");
    }
}
