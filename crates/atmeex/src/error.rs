//! Error types for the atmeex library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, and input validation errors.

use thiserror::Error;

/// The unified error type for atmeex operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (missing credentials, rejected sign-in, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Input validation errors (invalid base URL, malformed token).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error (including response body decode failures).
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No configured credential can satisfy the requested operation.
    ///
    /// Fatal for the current call; the caller must supply more credential
    /// material before retrying.
    #[error("no usable credential for {operation}")]
    MissingCredentials { operation: &'static str },

    /// The cloud rejected a sign-in or refresh attempt with a non-401 failure
    /// status.
    #[error("sign-in rejected with HTTP {status}{}", rejection_detail(.message))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The refresh token was rejected and no email/password fallback is
    /// configured. The caller must collect fresh credentials out-of-band.
    #[error("session expired: refresh token rejected and no fallback credential configured")]
    SessionExpired,
}

fn rejection_detail(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A token contains characters that cannot appear in an HTTP header.
    #[error("token is not a valid header value")]
    Token,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_includes_status_and_message() {
        let err = AuthError::Rejected {
            status: 403,
            message: Some("account locked".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("account locked"));
    }

    #[test]
    fn rejected_display_without_message() {
        let err = AuthError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "sign-in rejected with HTTP 500");
    }

    #[test]
    fn missing_credentials_names_the_operation() {
        let err = AuthError::MissingCredentials {
            operation: "sign-in",
        };
        assert!(err.to_string().contains("sign-in"));
    }
}
