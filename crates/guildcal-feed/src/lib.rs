//! Calendar feed ingestion.
//!
//! This crate turns a remote line-oriented calendar feed into a sorted list
//! of [`NormalizedEvent`]s:
//!
//! ```text
//!        URL
//!         │  FeedFetcher (injected)
//!         ▼
//!     raw text ── HTML page? ──▶ FeedError (AuthenticationOrAccess)
//!         │
//!         ▼ ics::unfold_lines
//!   logical lines
//!         │
//!         ▼ ics::extract_events (fields, datetime, recurrence)
//!  base + expanded events
//!         │
//!         ▼ EventWindow::select
//! ┌──────────────────┐
//! │ NormalizedEvent  │  sorted, within ±2 years of now
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use guildcal_feed::{FeedPipeline, FetchConfig, HttpFetcher};
//!
//! let pipeline = FeedPipeline::new(HttpFetcher::new(&FetchConfig::default())?);
//! let events = pipeline.fetch_events("https://example.com/guild.ics").await?;
//! ```

pub mod error;
pub mod fetch;
pub mod ics;
pub mod pipeline;
pub mod status;

pub use guildcal_core::NormalizedEvent;

// Re-export main types at crate root
pub use error::{FeedError, FeedErrorCode, FeedResult};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{BoxFuture, FeedFetcher, FetchConfig, StaticFetcher};
pub use ics::{DateTimeError, ExpansionLimits, Frequency, RecurrenceRule};
pub use pipeline::{FeedPipeline, PipelineOptions, looks_like_html, normalize_feed};
pub use status::FeedStatus;
