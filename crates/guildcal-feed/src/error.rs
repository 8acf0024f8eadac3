//! Error types for feed operations.
//!
//! A feed invocation either yields a (possibly empty) event list or fails
//! with one of two kinds of [`FeedError`]. Problems with individual fields
//! never surface here; see [`crate::ics::datetime::DateTimeError`].

use std::fmt;
use thiserror::Error;

/// The category of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorCode {
    /// The response was an HTML page (login or redirect) instead of feed data.
    AuthenticationOrAccess,
    /// Any other failure while fetching or reading the feed.
    FeedRetrieval,
}

impl FeedErrorCode {
    /// Returns a machine-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationOrAccess => "authentication_or_access",
            Self::FeedRetrieval => "feed_retrieval",
        }
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that ended a feed invocation.
#[derive(Debug, Error)]
pub struct FeedError {
    /// The error code categorizing this error.
    code: FeedErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The configured feed name, when known.
    feed: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeedError {
    /// Creates a new feed error with the given code and message.
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            feed: None,
            source: None,
        }
    }

    /// Creates an authentication/access error.
    pub fn access(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::AuthenticationOrAccess, message)
    }

    /// Creates a retrieval error.
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::FeedRetrieval, message)
    }

    /// Sets the feed name for this error.
    pub fn with_feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = Some(feed.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FeedErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the feed name, if set.
    pub fn feed(&self) -> Option<&str> {
        self.feed.as_deref()
    }

    /// Returns true if the response was rejected as a login/redirect page.
    pub fn is_access_denied(&self) -> bool {
        self.code == FeedErrorCode::AuthenticationOrAccess
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref feed) = self.feed {
            write!(f, "[{}] ", feed)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
