//! Error types for the orchestrator pipeline.
//!
//! Parsing-level problems (an unregistered source name, an unparsable
//! score) are recovered inside the parser and never surface here; only
//! failures of the completion interface itself, or misuse of the
//! pipeline, propagate to the caller.

use thiserror::Error;

/// Errors produced by the orchestrator and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was provided via builder or environment.
    #[error("API key missing: set OPENAI_API_KEY or QUORUM_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not recognized.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// The completion API request failed.
    #[error("completion request failed: {message}")]
    Completion {
        /// Error detail from the transport or SDK.
        message: String,
        /// HTTP status code, when available.
        status: Option<u16>,
    },

    /// The completion text lacks the two-segment `---` delimiter.
    ///
    /// Fatal to the current planning cycle only; the controller recovers
    /// by emitting an empty plan.
    #[error("malformed planning response: {message}")]
    MalformedResponse {
        /// Why the response could not be split.
        message: String,
        /// The raw completion text, for diagnostics.
        content: String,
    },

    /// An individual source's runner failed.
    ///
    /// The execution layer converts this into an error-flagged outcome;
    /// it never aborts the turn. The field is `name`, not `source`:
    /// `thiserror` reserves a field called `source` for an underlying
    /// `std::error::Error` cause.
    #[error("source '{name}' failed: {message}")]
    SourceExecution {
        /// Name of the failing source.
        name: String,
        /// Failure detail.
        message: String,
    },

    /// A source with the same name is already registered.
    #[error("source '{name}' is already registered")]
    DuplicateSource {
        /// The conflicting source name.
        name: String,
    },

    /// Pipeline coordination failure (invalid input, task join, ...).
    #[error("orchestration failed: {message}")]
    Orchestration {
        /// Failure detail.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedProvider {
            name: "acme".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported provider: acme");

        let err = Error::SourceExecution {
            name: "search".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "source 'search' failed: timed out");
    }

    #[test]
    fn test_source_execution_has_no_error_cause() {
        // the failing source's name is plain data, not a nested error
        let err = Error::SourceExecution {
            name: "search".to_string(),
            message: "timed out".to_string(),
        };
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_malformed_response_keeps_content() {
        let err = Error::MalformedResponse {
            message: "missing delimiter".to_string(),
            content: "raw text".to_string(),
        };
        if let Error::MalformedResponse { content, .. } = &err {
            assert_eq!(content, "raw text");
        }
        assert!(err.to_string().contains("missing delimiter"));
    }
}
