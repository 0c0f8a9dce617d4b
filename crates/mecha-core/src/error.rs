//! Error types for the mecha client.
//!
//! Every failure the client can produce is an [`Error`]. Regardless of the
//! variant, callers can ask for the numeric status code, a human-readable
//! message, optional field-level validation errors, and a coarse
//! [`ErrorKind`] for deciding what to show the user.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Status code reported for failures where no response was received.
pub const NETWORK_ERROR_STATUS: u16 = 0;

/// Status code reported when the client gave up waiting for a response.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status code reported for terminal authentication failures.
pub const UNAUTHORIZED_STATUS: u16 = 401;

/// Field name to validation messages, as returned by the backend.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The unified error type for client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No response arrived before the configured timeout elapsed.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The session could not be (re)authenticated.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The backend answered with a non-success status.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A success response could not be decoded into the requested type.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// The request could not be built from the given input.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Persisted session state could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received (status 0).
    Transport,
    /// Client-side timeout (status 408).
    Timeout,
    /// Terminal authentication failure (401).
    Authentication,
    /// The caller is authenticated but not allowed (403).
    Authorization,
    /// A 4xx carrying field-level validation errors.
    Validation,
    /// Any other 4xx.
    Client,
    /// 5xx.
    Server,
    /// A success body that did not match the expected shape.
    Decode,
    /// Rejected before sending.
    InvalidInput,
    /// Local persistence failed.
    Storage,
}

impl Error {
    /// The status code carried by this error.
    ///
    /// [`NETWORK_ERROR_STATUS`] means no HTTP status applies. Transport
    /// failures report it, and so do local failures (decode, invalid input,
    /// storage); use [`kind`](Self::kind) to tell them apart.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Timeout { .. } => TIMEOUT_STATUS,
            Error::Auth(_) => UNAUTHORIZED_STATUS,
            Error::Api(err) => err.status,
            Error::Transport(_)
            | Error::Decode { .. }
            | Error::InvalidInput(_)
            | Error::Storage(_) => NETWORK_ERROR_STATUS,
        }
    }

    /// A message suitable for showing to a user.
    pub fn message(&self) -> String {
        match self {
            Error::Api(err) => err.message.clone(),
            Error::Timeout { .. } => "Request timeout".to_string(),
            other => other.to_string(),
        }
    }

    /// Field-level validation errors, if the backend sent any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::Api(err) => err.field_errors.as_ref(),
            _ => None,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Auth(_) => ErrorKind::Authentication,
            Error::Api(err) => err.kind(),
            Error::Decode { .. } => ErrorKind::Decode,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns true for terminal authentication failures.
    ///
    /// A failed or impossible refresh also tears the session down; a
    /// rejection after a successful refresh leaves the new tokens stored.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The connection could not be established (refused, DNS, TLS).
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Any other failure while sending or reading the body.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Terminal authentication failures.
///
/// Cloneable so a single refresh outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// There was no refresh token to renew the session with.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The refresh call failed; the session has been torn down.
    #[error("session expired: {reason}")]
    RefreshFailed { reason: String },

    /// The request was rejected again after a successful refresh.
    #[error("request rejected after token refresh: {message}")]
    RejectedAfterRefresh { message: String },
}

/// A non-success response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the server, or `HTTP <status>` when it sent none.
    pub message: String,
    /// Field-level validation errors (if present).
    pub field_errors: Option<FieldErrors>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        Self {
            status,
            message: message.into(),
            field_errors,
        }
    }

    /// An error with the generic `HTTP <status>` message.
    pub fn from_status(status: u16) -> Self {
        Self::new(status, format!("HTTP {status}"), None)
    }

    /// Classify by status and payload.
    pub fn kind(&self) -> ErrorKind {
        match self.status {
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            400..=499 if self.field_errors.as_ref().is_some_and(|f| !f.is_empty()) => {
                ErrorKind::Validation
            }
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.message.contains(&self.status.to_string()) {
            write!(f, " (HTTP {})", self.status)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base API URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// The request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },

    /// A configuration value was rejected.
    #[error("invalid configuration {key}: {reason}")]
    Config { key: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Key-value persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The persisted data could not be parsed.
    #[error("corrupt session data: {message}")]
    Corrupt { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_report_status_zero() {
        let err = Error::from(TransportError::Connection {
            message: "refused".into(),
        });
        assert_eq!(err.status_code(), NETWORK_ERROR_STATUS);
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn timeout_is_distinct_from_server_errors() {
        let err = Error::Timeout { duration_ms: 30000 };
        assert_eq!(err.status_code(), 408);
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.message(), "Request timeout");

        let server = Error::from(ApiError::from_status(504));
        assert_eq!(server.kind(), ErrorKind::Server);
    }

    #[test]
    fn auth_errors_are_terminal_401s() {
        let err = Error::from(AuthError::MissingRefreshToken);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.is_auth_error());
    }

    #[test]
    fn local_failures_share_status_zero_but_not_kind() {
        let decode = Error::Decode {
            message: "missing field `id`".into(),
        };
        let storage = Error::from(StorageError::Io {
            message: "read-only file system".into(),
        });
        let transport = Error::from(TransportError::Http {
            message: "body read failed".into(),
        });

        for err in [&decode, &storage, &transport] {
            assert_eq!(err.status_code(), NETWORK_ERROR_STATUS);
        }
        assert_eq!(decode.kind(), ErrorKind::Decode);
        assert_eq!(storage.kind(), ErrorKind::Storage);
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert!(!decode.is_auth_error());
    }

    #[test]
    fn rejection_after_refresh_is_an_auth_error() {
        let err = Error::from(AuthError::RejectedAfterRefresh {
            message: "Forbidden resource".into(),
        });
        assert!(err.is_auth_error());
        assert_eq!(err.status_code(), UNAUTHORIZED_STATUS);
        assert!(err.to_string().contains("Forbidden resource"));
    }

    #[test]
    fn api_error_classification() {
        let mut fields = FieldErrors::new();
        fields.insert("email".into(), vec!["must not be blank".into()]);

        assert_eq!(
            ApiError::new(400, "Validation failed", Some(fields)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(ApiError::new(400, "bad", None).kind(), ErrorKind::Client);
        assert_eq!(ApiError::from_status(403).kind(), ErrorKind::Authorization);
        assert_eq!(ApiError::from_status(404).kind(), ErrorKind::Client);
        assert_eq!(ApiError::from_status(500).kind(), ErrorKind::Server);
    }

    #[test]
    fn field_errors_exposed_through_error() {
        let mut fields = FieldErrors::new();
        fields.insert("phone".into(), vec!["invalid".into(), "too short".into()]);
        let err = Error::from(ApiError::new(422, "Invalid data", Some(fields)));

        let errors = err.field_errors().unwrap();
        assert_eq!(errors["phone"].len(), 2);
        assert_eq!(err.message(), "Invalid data");
    }

    #[test]
    fn api_error_display_mentions_status_once() {
        assert_eq!(ApiError::from_status(502).to_string(), "HTTP 502");
        assert_eq!(
            ApiError::new(404, "Product not found", None).to_string(),
            "Product not found (HTTP 404)"
        );
    }
}
