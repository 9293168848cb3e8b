//! Error taxonomy for the request runner.
//!
//! Every failure in a `run_request` call is signaled exactly once through
//! [`RunnerError`]. Nothing is retried and nothing is smuggled back inside a
//! response value.

use thiserror::Error;

/// Boxed cause carried by the variants that wrap a collaborator failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// A caller-supplied argument was rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A non-empty body was given without a content type, either as an
    /// argument or as a `Content-Type` header param.
    #[error("invalid argument: no content type given for body")]
    MissingContentType,

    #[error("authentication requested but auth_url, username or password is empty")]
    MissingCredentials,

    #[error("authenticator returned an empty token")]
    EmptyAuthToken,

    /// The authentication handshake itself failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[source] BoxError),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("failed to encode body as {content_type}: {source}")]
    Encoding {
        content_type: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to decode {content_type} response: {source}")]
    Decoding {
        content_type: String,
        #[source]
        source: BoxError,
    },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("protocol {0} not supported")]
    UnsupportedProtocol(String),

    #[error("invalid request template: {0}")]
    InvalidTemplate(String),
}

impl RunnerError {
    /// Stable snake_case name of the variant, for logs and run records.
    pub fn kind(&self) -> &'static str {
        match self {
            RunnerError::InvalidArgument(_) => "invalid_argument",
            RunnerError::MissingContentType => "missing_content_type",
            RunnerError::MissingCredentials => "missing_credentials",
            RunnerError::EmptyAuthToken => "empty_auth_token",
            RunnerError::AuthenticationFailed(_) => "authentication_failed",
            RunnerError::UnsupportedContentType(_) => "unsupported_content_type",
            RunnerError::Encoding { .. } => "encoding_error",
            RunnerError::Decoding { .. } => "decoding_error",
            RunnerError::Transport { .. } => "transport_error",
            RunnerError::UnsupportedProtocol(_) => "unsupported_protocol",
            RunnerError::InvalidTemplate(_) => "invalid_template",
        }
    }

    /// `true` for argument validation failures, including a missing content
    /// type.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            RunnerError::InvalidArgument(_) | RunnerError::MissingContentType
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_content_type_counts_as_invalid_argument() {
        assert!(RunnerError::MissingContentType.is_invalid_argument());
        assert!(RunnerError::InvalidArgument("method".into()).is_invalid_argument());
        assert!(!RunnerError::EmptyAuthToken.is_invalid_argument());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RunnerError::EmptyAuthToken.kind(), "empty_auth_token");
        assert_eq!(
            RunnerError::UnsupportedProtocol("x".into()).kind(),
            "unsupported_protocol"
        );
    }

    #[test]
    fn test_transport_error_keeps_cause() {
        let err = RunnerError::Transport {
            url: "http://localhost:1/x".to_string(),
            source: anyhow::anyhow!("connection refused").into(),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "connection refused");
        assert!(err.to_string().contains("http://localhost:1/x"));
    }
}
