//! Error types for the data-access layer.
//!
//! All fallible operations in this crate return [`Result`]. The error space is
//! deliberately small: configuration problems, execution problems, and
//! optimistic-concurrency violations. Driver failures are wrapped as
//! [`Error::Execution`] with the original failure retained as the source.

/// Boxed driver-side error retained as a cause.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for all data-access operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required configuration is missing, malformed, or used incorrectly
    /// (unknown statement id, re-declaration of statement parameters, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A command could not be synthesized or executed: violated synthesis
    /// preconditions, unknown parameter names, transaction-scope conflicts,
    /// or a wrapped driver failure.
    #[error("execution error: {message}")]
    Execution {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying driver error, when one exists.
        #[source]
        source: Option<Cause>,
    },

    /// An optimistic write matched zero rows: the row was changed or removed
    /// concurrently since it was read.
    #[error("concurrency violation: {0}")]
    Concurrency(String),
}

impl Error {
    /// Configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Execution error from a message, with no underlying cause.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Execution error wrapping a driver failure.
    pub fn wrapped(message: impl Into<String>, source: Cause) -> Self {
        Self::Execution {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Whether this is an optimistic-concurrency violation.
    pub fn is_concurrency(&self) -> bool {
        matches!(self, Self::Concurrency(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
