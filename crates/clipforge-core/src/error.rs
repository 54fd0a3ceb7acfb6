//! Unified error type for the clipforge workspace.
//!
//! Every invocation terminates with exactly one of: a populated
//! [`TransformResult`](crate::result::TransformResult), or one of the
//! variants below. `Cancelled` is a distinct terminal outcome rather
//! than a failure in the usual sense, but it travels the same error
//! channel so callers see a single `Result` per invocation.

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors (and the cancellation outcome) of a transformation invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required request field is absent.
    ///
    /// Raised synchronously during compilation, before any engine
    /// object is built. The field path names the offending location in
    /// wire notation, e.g. `videoEffects[2].targetFrameRate`.
    #[error("missing required argument: {field}")]
    MissingArgument {
        /// Wire-notation path of the missing field.
        field: String,
    },

    /// The underlying transformation engine reported a failure.
    ///
    /// The engine's message is preserved verbatim; the cause chain (if
    /// the engine supplied one) is reachable through
    /// [`std::error::Error::source`].
    #[error("engine failure: {message}")]
    Engine {
        /// Human-readable engine error description.
        message: String,
        /// Underlying engine error, when available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller cancelled the transformation before it completed.
    #[error("transformation cancelled")]
    Cancelled,
}

impl Error {
    /// Convenience constructor for [`Error::MissingArgument`].
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingArgument {
            field: field.into(),
        }
    }

    /// Convenience constructor for [`Error::Engine`] without a cause.
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// Convenience constructor for [`Error::Engine`] with a cause.
    pub fn engine_with_cause(
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Engine {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// Whether this error is the cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
