//! Result shapes returned by the hybrid facade.
//!
//! Every call reports `{ data, error }` plus how far the write or read got
//! on each side. `error` stays `None` for writes no matter what the remote
//! did; the remote outcome is carried in `sync` instead.

use crate::error::Error;
use crate::model::Record;
use crate::storage::LocalStatus;
use serde::Serialize;

/// What happened on the remote side of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SyncStatus {
    /// The remote call succeeded.
    Synced,
    /// No remote is configured; nothing was attempted.
    Skipped,
    /// The remote call was attempted and failed.
    Failed(String),
}

impl SyncStatus {
    #[must_use]
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Read (or insert) result.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub data: T,
    pub error: Option<Error>,
    pub sync: SyncStatus,
}

impl<T> QueryResult<T> {
    /// Drop the status fields and turn `error` into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the populated `error`, if any.
    pub fn into_result(self) -> crate::Result<T> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }
}

/// Single-row read result.
pub type SingleResult = QueryResult<Option<Record>>;

/// Upsert / update result.
#[derive(Debug)]
pub struct WriteResult {
    /// Always `None`; kept for parity with the remote client's shape.
    pub error: Option<Error>,
    pub local: LocalStatus,
    pub sync: SyncStatus,
}

/// Insert result: the written rows plus both outcomes.
#[derive(Debug)]
pub struct InsertResult {
    pub data: crate::model::Rows,
    pub error: Option<Error>,
    pub local: LocalStatus,
    pub sync: SyncStatus,
}
