// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types.
//!
//! Every failure path leaves the session in its previous, valid state, so
//! none of these are fatal to the process.

/// Error type surfaced by the session manager and API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Non-2xx response or transport failure. Transport failures carry no status.
    #[error("Request failed{}: {body}", status_suffix(.status))]
    Request { status: Option<u16>, body: String },

    #[error("Profile completion failed: {0}")]
    ProfileCompletion(String),

    #[error("Malformed credential token: {0}")]
    MalformedToken(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("No credential token held")]
    NotAuthenticated,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// Build a transport-level request error (no HTTP status).
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ClientError::Request {
            status: None,
            body: err.to_string(),
        }
    }

    /// HTTP status code carried by a request error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if this is a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
