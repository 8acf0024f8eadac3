//! Client error types.

use std::fmt;

use guildcal_feed::FeedError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Feed error.
    Feed(FeedError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Feed(err) => write!(f, "feed error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Feed(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<FeedError> for ClientError {
    fn from(err: FeedError) -> Self {
        Self::Feed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_prefixes() {
        let err = ClientError::Config("window_years must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "configuration error: window_years must be at least 1"
        );

        let err = ClientError::from(FeedError::access("login page").with_feed("Guild 2"));
        assert_eq!(
            err.to_string(),
            "feed error: [Guild 2] authentication_or_access: login page"
        );
        assert!(err.source().is_some());
    }
}
