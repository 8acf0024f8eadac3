//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/guildcal/config.toml` by default:
//!
//! ```toml
//! reference_zone = "America/New_York"
//! window_years = 2
//!
//! [fetch]
//! timeout = 30
//!
//! [recurrence]
//! weekly_occurrences = 52
//! daily_occurrences = 60
//!
//! [[feeds]]
//! name = "Guild 1"
//! url = "https://calendar.example.com/guild-1/basic.ics"
//!
//! [[feeds]]
//! name = "Guild 2"
//! url = ""
//! visible = false
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use guildcal_core::{EventWindow, ReferenceZone};
use guildcal_feed::{ExpansionLimits, FetchConfig, PipelineOptions};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the guildcal client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// IANA zone that UTC timestamps are converted into.
    pub reference_zone: String,

    /// Years either side of "now" that events are kept for.
    pub window_years: u32,

    /// HTTP settings.
    pub fetch: FetchSettings,

    /// Recurrence expansion settings.
    pub recurrence: RecurrenceSettings,

    /// Configured feeds, in display order.
    pub feeds: Vec<FeedSettings>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reference_zone: ReferenceZone::DEFAULT_NAME.to_string(),
            window_years: EventWindow::DEFAULT_YEARS,
            fetch: FetchSettings::default(),
            recurrence: RecurrenceSettings::default(),
            feeds: Vec::new(),
        }
    }
}

/// HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Request timeout in seconds.
    pub timeout: u64,

    /// User-Agent header override.
    pub user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: FetchConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Recurrence expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceSettings {
    /// Extra occurrences generated for a weekly rule.
    pub weekly_occurrences: usize,

    /// Extra occurrences generated for a daily rule.
    pub daily_occurrences: usize,
}

impl Default for RecurrenceSettings {
    fn default() -> Self {
        Self {
            weekly_occurrences: ExpansionLimits::DEFAULT_WEEKLY,
            daily_occurrences: ExpansionLimits::DEFAULT_DAILY,
        }
    }
}

/// One named calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Display name, unique within the file.
    pub name: String,

    /// Feed URL; blank means "not linked yet".
    #[serde(default)]
    pub url: String,

    /// Whether the feed is loaded by default.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl FeedSettings {
    /// Creates a visible feed.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            visible: true,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guildcal")
    }

    /// Checks the configuration for problems that would only show up at fetch time.
    pub fn validate(&self) -> Result<(), String> {
        self.zone()?;

        if self.window_years == 0 {
            return Err("window_years must be at least 1".to_string());
        }

        if self.fetch.timeout == 0 {
            return Err("fetch.timeout must be at least 1 second".to_string());
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            let name = feed.name.trim();
            if name.is_empty() {
                return Err("feed names must not be empty".to_string());
            }
            if !seen.insert(name) {
                return Err(format!("duplicate feed name: {}", name));
            }
        }

        Ok(())
    }

    /// Resolves the configured reference zone.
    pub fn zone(&self) -> Result<ReferenceZone, String> {
        self.reference_zone
            .parse()
            .map_err(|e| format!("invalid reference_zone: {}", e))
    }

    /// Builds pipeline options from the configuration.
    pub fn pipeline_options(&self) -> Result<PipelineOptions, String> {
        let limits = ExpansionLimits::default()
            .with_weekly(self.recurrence.weekly_occurrences)
            .with_daily(self.recurrence.daily_occurrences);

        Ok(PipelineOptions::default()
            .with_zone(self.zone()?)
            .with_window_years(self.window_years)
            .with_limits(limits))
    }

    /// Builds the HTTP fetch configuration.
    pub fn fetch_config(&self) -> FetchConfig {
        let config = FetchConfig::default().with_timeout(Duration::from_secs(self.fetch.timeout));
        match self.fetch.user_agent {
            Some(ref agent) => config.with_user_agent(agent.clone()),
            None => config,
        }
    }

    /// Returns the feeds loaded by default.
    pub fn visible_feeds(&self) -> Vec<FeedSettings> {
        self.feeds.iter().filter(|f| f.visible).cloned().collect()
    }

    /// Finds a feed by name, ignoring case and surrounding whitespace.
    pub fn find_feed(&self, name: &str) -> Option<&FeedSettings> {
        let name = name.trim();
        self.feeds
            .iter()
            .find(|f| f.name.trim().eq_ignore_ascii_case(name))
    }
}
