/// Errors returned by a search provider before the pipeline degrades them to
/// an empty source list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The search endpoint could not be reached or the request failed.
    #[error("search transport error: {message}")]
    Transport { message: String },
    /// The search endpoint answered with a payload we could not decode.
    #[error("search payload malformed: {message}")]
    Malformed { message: String },
}

impl SearchError {
    /// Creates a transport-level search error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a malformed-payload search error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Errors returned by a completion provider.
///
/// Only failures at stream-open time are fatal to an invocation; once the
/// answer stream is established, transport errors degrade to an early
/// end-of-answer instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// Provider returned an application-level failure (HTTP status, auth).
    #[error("completion provider error: {message}")]
    Provider {
        message: String,
        status_code: Option<u16>,
    },
    /// Transport or stream I/O failed.
    #[error("completion transport error: {message}")]
    Transport { message: String },
    /// Provider response shape was invalid.
    #[error("completion protocol error: {message}")]
    Protocol { message: String },
}

impl CompletionError {
    /// Creates a provider-level error.
    pub fn provider(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Provider {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider { message, .. }
            | Self::Transport { message }
            | Self::Protocol { message } => message,
        }
    }
}

/// Top-level error type for the pipeline API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Invalid pipeline or provider configuration.
    #[error("config error: {0}")]
    Config(String),
    /// The query was missing or empty.
    #[error("query must not be empty")]
    EmptyQuery,
    /// The answer stream could not be opened.
    #[error(transparent)]
    Generation(#[from] CompletionError),
}
