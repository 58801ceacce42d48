//! Unified error handling for the v2ex-explore crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`V2exErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use v2ex_explore::error::{Error, V2exErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Try again later: {}", err.user_message());
//!     } else {
//!         eprintln!("Fatal error: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::session::SessionError;
pub use crate::utils::error::{AccessError, ClientError, FetchError, ParseError};

/// Common trait for all v2ex-explore error types
pub trait V2exErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the same call may succeed later)
    fn is_recoverable(&self) -> bool;

    /// Short message suitable for showing to the user
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, proxy)
    Network,
    /// Sign-in, restriction and permission outcomes
    Auth,
    /// Parsing and data extraction errors
    Parsing,
    /// Session state persistence and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl V2exErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => *status >= 500 || *status == 429,
            Self::InvalidUrl(_) | Self::InvalidProxy(_) => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Timeout => "The request timed out".to_string(),
            Self::ServerError(status) => format!("The site answered with status {status}"),
            Self::InvalidProxy(url) => format!("Proxy URL is not valid: {url}"),
            other => other.to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidProxy(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}

impl V2exErrorTrait for AccessError {
    fn is_recoverable(&self) -> bool {
        // Signing in again fixes a missing credential, nothing else here.
        matches!(self, Self::LoginRequired)
    }

    fn user_message(&self) -> String {
        match self {
            Self::LoginRequired => "This page requires signing in".to_string(),
            Self::AccountRestricted => "Your account is restricted".to_string(),
            Self::AccessDenied => "You are not allowed to view this page".to_string(),
            Self::UnknownError { path } => format!("Unexpected redirect to {path}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Auth
    }
}

impl V2exErrorTrait for ClientError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Access(e) => e.is_recoverable(),
            Self::Parse(_) | Self::Json(_) => false,
            Self::Session(_) => true,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => e.user_message(),
            Self::Access(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Access(_) => ErrorCategory::Auth,
            Self::Parse(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Session(_) => ErrorCategory::Storage,
        }
    }
}

/// Unified error type for the v2ex-explore crate
#[derive(Error, Debug)]
pub enum Error {
    /// Client errors (fetch, access, parse)
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl V2exErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Client(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            Self::Io(e) => format!("I/O error: {e}"),
            Self::Config(msg) => format!("Configuration error: {msg}"),
            Self::Other { context, .. } => context.clone(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Client(e) => e.category(),
            Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Self::Client(ClientError::Access(err))
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Self::Client(ClientError::Fetch(err))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
