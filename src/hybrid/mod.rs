//! Hybrid record store: reconciliation engine and query facade.
//!
//! # Read path
//!
//! 1. Ask the remote (if configured); a failure reads as "no rows"
//! 2. Read the local cache and apply the equality filter to it
//! 3. Union both, keyed on the identifying field, local rows winning
//! 4. Sort the union, then project columns
//!
//! # Write path
//!
//! 1. Assign identifiers (insert only)
//! 2. Write the local cache synchronously
//! 3. Attempt the remote write; report the outcome in `sync`

pub mod merge;
pub mod query;
pub mod store;
pub mod types;

pub use merge::{filter_rows, merge_rows, sort_rows};
pub use query::{SelectBuilder, TableRef, UpdateBuilder};
pub use store::{HybridStore, SelectOptions};
pub use types::{InsertResult, QueryResult, SingleResult, SyncStatus, WriteResult};
