use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by a UI surface adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("stale element reference: {0}")]
    Stale(String),
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("surface timed out: {0}")]
    Timeout(String),
    #[error("session lost: {0}")]
    SessionLost(String),
    #[error("surface error: {0}")]
    Other(String),
}

impl SurfaceError {
    /// Only a lost session ends the run; everything else is retried or skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SurfaceError::SessionLost(_))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("download directory missing or not writable: {0}")]
    DownloadDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Reasons an enumeration run stops before the list is exhausted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnumerationError {
    #[error("list did not render within {0:?}")]
    ReadyTimeout(Duration),
    #[error("list disappeared and did not render again within {0:?}")]
    ListTimeout(Duration),
    #[error("session lost: {0}")]
    SessionLost(String),
}
