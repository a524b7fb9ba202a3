//! Sync error types.

use crate::service::quote_store::QuoteStoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failures inside one sync cycle.
#[derive(Debug)]
pub enum SyncError {
    /// Transport failure or client setup failure.
    Network(reqwest::Error),
    /// Remote answered with a non-success status.
    Status { stage: &'static str, status: u16 },
    /// Remote body was not an object with a string `title`.
    MalformedResponse(String),
    /// Merging into the local store failed.
    Store(QuoteStoreError),
    /// Store mutex was poisoned by a panicking holder.
    StoreUnavailable,
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(err) => write!(f, "network error: {err}"),
            Self::Status { stage, status } => {
                write!(f, "{stage} request returned HTTP {status}")
            }
            Self::MalformedResponse(message) => write!(f, "malformed remote response: {message}"),
            Self::Store(err) => write!(f, "local merge failed: {err}"),
            Self::StoreUnavailable => write!(f, "quote store is unavailable"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value)
    }
}

impl From<QuoteStoreError> for SyncError {
    fn from(value: QuoteStoreError) -> Self {
        Self::Store(value)
    }
}

impl SyncError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status { .. } => "http_status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Store(_) => "store_merge_failed",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}
