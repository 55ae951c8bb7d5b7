// shared/src/lib.rs

use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("upstream responded with {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("codec: {0}")]
    Codec(String),
    #[error("cache tier: {0}")]
    Tier(String),
    #[error("configuration: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::Unauthorized => 401,
            Error::Forbidden => 403,
            Error::NotFound => 404,
            Error::Upstream { status, .. } => *status,
            Error::Unavailable(_) => 503,
            Error::Codec(_) | Error::Tier(_) | Error::Config(_) | Error::Internal(_) => 500,
        }
    }

    /// True for failures the caller caused (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Time-to-live expressed in whole seconds, the unit both tiers work in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TtlSecs(pub u64);

impl TtlSecs {
    pub const fn minutes(m: u64) -> Self {
        TtlSecs(m * 60)
    }

    pub const fn hours(h: u64) -> Self {
        TtlSecs(h * 3600)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

pub mod config;
