//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Each variant maps to a distinct process exit code so the binary can report
//! what kind of failure ended the run.

use std::fmt;
use thiserror::Error;

/// Classification of a failed vision service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    Network,
    Unauthorized,
    RateLimited,
    UnsupportedFormat,
    PayloadTooLarge,
    InvalidRequest,
    Unavailable,
    InvalidResponse,
}

impl ServiceErrorKind {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Unauthorized,
            413 => Self::PayloadTooLarge,
            415 => Self::UnsupportedFormat,
            429 => Self::RateLimited,
            400..=499 => Self::InvalidRequest,
            _ => Self::Unavailable,
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network failure",
            Self::Unauthorized => "authentication failed",
            Self::RateLimited => "rate limited",
            Self::UnsupportedFormat => "unsupported image format",
            Self::PayloadTooLarge => "image too large",
            Self::InvalidRequest => "invalid request",
            Self::Unavailable => "service unavailable",
            Self::InvalidResponse => "invalid response",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Input(String),

    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Vision service error ({kind}): {message}")]
    Service {
        kind: ServiceErrorKind,
        message: String,
    },

    #[error("Error generating thumbnail: {0}")]
    Thumbnail(Box<Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn service(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self::Service {
            kind,
            message: message.into(),
        }
    }

    /// Wraps any failure in the thumbnail step, without double-wrapping.
    pub fn thumbnail(inner: Error) -> Self {
        match inner {
            Self::Thumbnail(_) => inner,
            other => Self::Thumbnail(Box::new(other)),
        }
    }

    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::Input(_) => 3,
            Self::Fetch(_) => 4,
            Self::Service { .. } => 5,
            Self::Thumbnail(_) => 6,
            Self::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
