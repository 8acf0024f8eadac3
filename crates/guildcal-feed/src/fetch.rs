//! Text-fetch capability.
//!
//! The pipeline never talks to the network itself: it is handed a
//! [`FeedFetcher`] that turns a URL into a response body. [`HttpFetcher`]
//! is the production implementation; [`StaticFetcher`] serves canned
//! bodies for tests and offline use.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[cfg(feature = "http")]
use tracing::trace;

use crate::error::{FeedError, FeedErrorCode, FeedResult};

/// A boxed future for async trait methods.
///
/// Boxing keeps [`FeedFetcher`] object safe so callers can hold a
/// `dyn FeedFetcher`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves the raw text of a feed.
///
/// Implementations should not retry; a failure is reported to the caller
/// as-is.
pub trait FeedFetcher: Send + Sync {
    /// Returns a short name for logs (e.g. "http").
    fn name(&self) -> &str;

    /// Fetches the body at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns a `FeedRetrieval` error on transport failures or non-success
    /// responses.
    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>>;
}

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl FetchConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default user agent.
    ///
    /// Some calendar hosts answer unknown agents with a login page, so a
    /// desktop browser string is sent unless configured otherwise.
    pub const DEFAULT_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches feeds over HTTP(S) with a plain GET.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> FeedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                FeedError::retrieval(format!("Failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> FeedResult<String> {
        let parsed = url::Url::parse(url).map_err(|e| {
            FeedError::retrieval(format!("Invalid feed URL {}: {}", url, e)).with_source(e)
        })?;

        trace!(url = %parsed, "Sending request");

        let response = self.client.get(parsed).send().await.map_err(|e| {
            FeedError::retrieval(format!("Request failed: {}", e)).with_source(e)
        })?;

        let status = response.status();
        trace!(status = %status, "Received response");

        if !status.is_success() {
            return Err(FeedError::retrieval(format!(
                "Unexpected status {}",
                status
            )));
        }

        response.text().await.map_err(|e| {
            FeedError::retrieval(format!("Failed to read response: {}", e)).with_source(e)
        })
    }
}

#[cfg(feature = "http")]
impl FeedFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
        Box::pin(self.get(url))
    }
}

/// A fetcher that always returns the same outcome.
///
/// Counts calls so callers can check whether a fetch was attempted.
#[derive(Debug)]
pub struct StaticFetcher {
    outcome: Result<String, (FeedErrorCode, String)>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    /// Creates a fetcher that returns `body` for every URL.
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            outcome: Ok(body.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a fetcher that fails every request with `error`.
    pub fn failing(error: &FeedError) -> Self {
        Self {
            outcome: Err((error.code(), error.message().to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many times [`FeedFetcher::fetch_text`] was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedFetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_text<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match &self.outcome {
            Ok(body) => Ok(body.clone()),
            Err((code, message)) => Err(FeedError::new(*code, message.clone())),
        };
        Box::pin(async move { result })
    }
}
