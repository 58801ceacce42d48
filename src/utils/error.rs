//! Error types for the V2EX client
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

use crate::session::SessionError;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (connection, DNS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status on the final response
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Proxy URL rejected when building the client
    #[error("Invalid proxy URL: {0}")]
    InvalidProxy(String),
}

/// Outcomes of a redirected page load that stop extraction
///
/// These are produced by [`crate::crawler::access::AccessOutcome`] and carry no
/// partial data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Credential absent or rejected; the user should sign in again
    #[error("Login required")]
    LoginRequired,

    /// Authenticated, but the account is limited by the site
    #[error("Account restricted")]
    AccountRestricted,

    /// Authenticated, but forbidden for this resource
    #[error("Access denied")]
    AccessDenied,

    /// Redirected somewhere unrecognized
    #[error("Unknown error (redirected to {path})")]
    UnknownError { path: String },
}

/// Errors that can occur during parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    /// Topic link or id could not be understood
    #[error("Invalid topic link: {0}")]
    InvalidTopicLink(String),

    /// Required element missing from a page
    #[error("Element not found: {0}")]
    MissingElement(&'static str),
}

/// General client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Access classification error
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Session persistence error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// JSON response could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Typed access failure, if this is one
    pub fn access(&self) -> Option<&AccessError> {
        match self {
            Self::Access(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the caller should prompt for a new credential
    pub fn is_login_required(&self) -> bool {
        matches!(self, Self::Access(AccessError::LoginRequired))
    }
}
