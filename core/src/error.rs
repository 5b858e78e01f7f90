//! Error types for the paste service client.
//!
//! # Design
//! Every failure a caller can observe is one `ApiError`. Remote failures
//! (`NotAuthorized`, `NotFound`, `Remote`) are produced only by the response
//! normalizer and carry the best available message, the HTTP status and the
//! request path. `Aborted` and `Transport` come from the transport layer and
//! are passed through untouched. The remaining variants are raised locally
//! before a request is ever sent.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the identifier resolver, the response normalizer and
/// the `PasteClient` build/parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No id was supplied, or a URL did not yield a usable id.
    #[error("no document id could be resolved from the input")]
    MissingIdentifier,

    /// The input was neither a string id nor a URL.
    #[error("document id must be a string or a URL")]
    InvalidIdentifierType,

    /// The server answered 401.
    #[error("{message}{}", describe_location(*status, path.as_deref()))]
    NotAuthorized {
        message: String,
        status: Option<u16>,
        path: Option<String>,
    },

    /// The server answered 404.
    #[error("{message}{}", describe_location(*status, path.as_deref()))]
    NotFound {
        message: String,
        status: Option<u16>,
        path: Option<String>,
    },

    /// Any other unsuccessful status/body combination.
    #[error("{message}{}", describe_location(*status, path.as_deref()))]
    Remote {
        message: String,
        status: Option<u16>,
        path: Option<String>,
    },

    /// The transport cancelled the call or it timed out.
    #[error("request aborted: {message}")]
    Aborted {
        message: String,
        path: Option<String>,
    },

    /// The transport could not complete the call (DNS, connect, TLS, ...).
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        path: Option<String>,
    },

    /// The operation needs an API token and none is configured.
    #[error("{operation} requires an API token, but none is configured")]
    MissingToken { operation: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid host pattern: {0}")]
    InvalidHostPattern(#[from] regex::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A successful payload did not match the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

/// Coarse classification of an `ApiError`, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingIdentifier,
    InvalidIdentifierType,
    NotAuthorized,
    NotFound,
    RemoteError,
    Aborted,
    TransportFailure,
    MissingToken,
    Configuration,
    Serialization,
    Deserialization,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingIdentifier => ErrorKind::MissingIdentifier,
            ApiError::InvalidIdentifierType => ErrorKind::InvalidIdentifierType,
            ApiError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Remote { .. } => ErrorKind::RemoteError,
            ApiError::Aborted { .. } => ErrorKind::Aborted,
            ApiError::Transport { .. } => ErrorKind::TransportFailure,
            ApiError::MissingToken { .. } => ErrorKind::MissingToken,
            ApiError::InvalidConfig(_) | ApiError::InvalidHostPattern(_) => {
                ErrorKind::Configuration
            }
            ApiError::SerializationError(_) => ErrorKind::Serialization,
            ApiError::DeserializationError(_) => ErrorKind::Deserialization,
        }
    }

    /// HTTP status attached to a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotAuthorized { status, .. }
            | ApiError::NotFound { status, .. }
            | ApiError::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Request path the failure belongs to, when it is known.
    pub fn path(&self) -> Option<&str> {
        match self {
            ApiError::NotAuthorized { path, .. }
            | ApiError::NotFound { path, .. }
            | ApiError::Remote { path, .. }
            | ApiError::Aborted { path, .. }
            | ApiError::Transport { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// Human-readable message without the status/path suffix.
    pub fn message(&self) -> String {
        match self {
            ApiError::NotAuthorized { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Remote { message, .. }
            | ApiError::Aborted { message, .. }
            | ApiError::Transport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn describe_location(status: Option<u16>, path: Option<&str>) -> String {
    match (status, path) {
        (Some(status), Some(path)) => format!(" (HTTP {status}, {path})"),
        (Some(status), None) => format!(" (HTTP {status})"),
        (None, Some(path)) => format!(" ({path})"),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_display_includes_status_and_path() {
        let err = ApiError::Remote {
            message: "Internal Server Error".to_string(),
            status: Some(500),
            path: Some("/api/pastes".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Internal Server Error (HTTP 500, /api/pastes)"
        );
        assert_eq!(err.message(), "Internal Server Error");
    }

    #[test]
    fn display_omits_missing_location() {
        let err = ApiError::NotFound {
            message: "Not found".to_string(),
            status: None,
            path: None,
        };
        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn accessors_expose_classification() {
        let err = ApiError::NotAuthorized {
            message: "Not authorized".to_string(),
            status: Some(401),
            path: Some("/api/verify".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.path(), Some("/api/verify"));

        let aborted = ApiError::Aborted {
            message: "timed out".to_string(),
            path: Some("/api/pastes/abc".to_string()),
        };
        assert_eq!(aborted.kind(), ErrorKind::Aborted);
        assert_eq!(aborted.status(), None);
        assert_eq!(aborted.path(), Some("/api/pastes/abc"));
    }

    #[test]
    fn missing_token_names_operation() {
        let err = ApiError::MissingToken { operation: "delete" };
        assert_eq!(err.kind(), ErrorKind::MissingToken);
        assert_eq!(
            err.to_string(),
            "delete requires an API token, but none is configured"
        );
    }
}
