// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent classification of backend responses.

use reqwest::StatusCode;

/// Error type returned by every client and service operation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Backend unreachable: {0}")]
    NetworkUnavailable(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl ClientError {
    /// True when the caller has to (re)authenticate before retrying.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::InvalidCredentials
        )
    }

    /// Classify a transport-level failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::ServerError(format!("JSON parse error: {}", err));
        }
        ClientError::NetworkUnavailable(err.to_string())
    }

    /// Classify a non-success status (401 is handled by the caller first).
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => ClientError::Unauthenticated,
            403 => ClientError::NotAuthorized(if body.is_empty() {
                "forbidden".to_string()
            } else {
                body
            }),
            404 => ClientError::NotFound(body),
            400..=499 => ClientError::Rejected {
                status: status.as_u16(),
                message: body,
            },
            _ => ClientError::ServerError(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
