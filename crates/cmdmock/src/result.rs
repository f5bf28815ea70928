//! Result and error types for cmdmock.

use thiserror::Error;

/// Boxed error produced by handlers and native entry points
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for cmdmock operations
pub type MockResult<T> = Result<T, MockError>;

/// Errors that can occur while dispatching or inspecting mocked commands
#[derive(Debug, Error)]
pub enum MockError {
    /// No handler is registered for the dispatched command type
    #[error("No mock for \"{client}.{command}\"")]
    UnmappedCommand {
        /// Client display name
        client: String,
        /// Command display name
        command: String,
    },

    /// Handler resolved to an absent or falsy value
    #[error("Mock for \"{client}.{command}\" returned no result")]
    EmptyResult {
        /// Client display name
        client: String,
        /// Command display name
        command: String,
    },

    /// Error raised by a handler, passed through untouched
    #[error(transparent)]
    Handler(BoxError),

    /// Handler panicked while being called or polled
    #[error("Mock for \"{client}.{command}\" panicked: {message}")]
    HandlerPanicked {
        /// Client display name
        client: String,
        /// Command display name
        command: String,
        /// Panic payload, when it was a string
        message: String,
    },

    /// Client type has no dispatch entry point to intercept
    #[error("Client \"{client}\" does not expose a dispatch entry point")]
    NoEntryPoint {
        /// Client display name
        client: String,
    },

    /// Dispatch was attempted outside a tokio runtime
    #[error("Dispatch of \"{client}.{command}\" requires a tokio runtime")]
    NoRuntime {
        /// Client display name
        client: String,
        /// Command display name
        command: String,
    },

    /// Deferred dispatch task ended without producing an outcome
    #[error("Dispatch of \"{client}.{command}\" was aborted: {message}")]
    Dispatch {
        /// Client display name
        client: String,
        /// Command display name
        command: String,
        /// Error message
        message: String,
    },

    /// Error raised by a native (non-mocked) entry point
    #[error(transparent)]
    Service(BoxError),

    /// Assertion over recorded calls failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MockError {
    /// Wrap an error raised by a native entry point
    pub fn service<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Service(error.into())
    }

    /// Borrow the original handler error as `E`, if this is one
    #[must_use]
    pub fn handler_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Handler(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Recover the original handler error as `E`
    ///
    /// Returns `self` unchanged when this is not a handler error of type `E`.
    pub fn into_handler_error<E>(self) -> Result<Box<E>, Self>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Handler(inner) => inner.downcast::<E>().map_err(Self::Handler),
            other => Err(other),
        }
    }

    /// Whether no handler was registered for the command
    #[must_use]
    pub const fn is_unmapped(&self) -> bool {
        matches!(self, Self::UnmappedCommand { .. })
    }

    /// Whether the handler produced no result
    #[must_use]
    pub const fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("throttled after {0} attempts")]
    struct Throttled(u32);

    #[test]
    fn test_unmapped_message() {
        let err = MockError::UnmappedCommand {
            client: "Z".to_string(),
            command: "Y".to_string(),
        };
        assert_eq!(err.to_string(), "No mock for \"Z.Y\"");
        assert!(err.is_unmapped());
    }

    #[test]
    fn test_empty_result_message() {
        let err = MockError::EmptyResult {
            client: "Sts".to_string(),
            command: "GetCallerIdentity".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mock for \"Sts.GetCallerIdentity\" returned no result"
        );
        assert!(err.is_empty_result());
    }

    #[test]
    fn test_handler_error_is_transparent() {
        let err = MockError::Handler(Box::new(Throttled(3)));
        assert_eq!(err.to_string(), "throttled after 3 attempts");
        assert_eq!(err.handler_error::<Throttled>().map(|t| t.0), Some(3));
        assert!(err.handler_error::<std::io::Error>().is_none());
    }

    #[test]
    fn test_into_handler_error() {
        let err = MockError::Handler(Box::new(Throttled(7)));
        let original = err.into_handler_error::<Throttled>().unwrap();
        assert_eq!(original.0, 7);

        let err = MockError::Handler(Box::new(Throttled(1)));
        let back = err.into_handler_error::<std::io::Error>().unwrap_err();
        assert!(back.handler_error::<Throttled>().is_some());
    }

    #[test]
    fn test_service_error() {
        let err = MockError::service("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert!(err.handler_error::<Throttled>().is_none());
    }
}
