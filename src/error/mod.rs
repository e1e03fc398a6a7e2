//! Error types for pipeline-studio.

use thiserror::Error;

/// Primary error type for all pipeline-studio operations.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Stream idle for {0}ms")]
    Timeout(u64),

    #[error("Connection closed before the pipeline finished")]
    ConnectionClosed,

    #[error("Malformed event: {reason}")]
    MalformedEvent { data: String, reason: String },

    #[error("Pipeline reported an error: {0}")]
    Backend(String),

    #[error("Pipeline ended before the directory stage completed")]
    Incomplete,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error category, used to decide whether a run must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection failed, dropped, timed out, or returned a non-success status.
    Transport,
    /// A single frame could not be decoded; recovered locally.
    MalformedEvent,
    /// The backend reported a failure inside the stream.
    Backend,
    /// The stream finished without a complete pipeline result.
    Incomplete,
    Configuration,
    InvalidInput,
    Io,
}

impl StudioError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(data: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            data: data.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api { .. } | Self::Network(_) | Self::Timeout(_) | Self::ConnectionClosed => {
                ErrorCategory::Transport
            }
            Self::MalformedEvent { .. } => ErrorCategory::MalformedEvent,
            Self::Backend(_) => ErrorCategory::Backend,
            Self::Incomplete => ErrorCategory::Incomplete,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    /// Whether a fresh run might succeed where this one failed.
    ///
    /// Runs are never retried automatically; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Network(_) | Self::Timeout(_) | Self::ConnectionClosed => true,
            _ => false,
        }
    }
}

impl From<toml::de::Error> for StudioError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StudioError>;
