// File: ./src/error.rs
use crate::model::RowPosition;

/// Failure talking to the row store (network, auth, quota, timeout, bad payload).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("task name is empty")]
    EmptyTaskName,
    #[error("task {0} no longer exists, refresh and try again")]
    NotFound(RowPosition),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The write reached the store but the re-read after it did not.
    #[error("change saved, but the list could not be reloaded ({0})")]
    Unsynced(StoreError),
}

impl SyncError {
    /// Validation failures are dropped quietly; everything else is shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, SyncError::EmptyTaskName)
    }

    /// True when the mutation itself landed, so retrying it would repeat it.
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncError::Unsynced(_))
    }
}
