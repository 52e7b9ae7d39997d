//! Local cache storage layer.
//!
//! This module provides the local half of the hybrid store:
//! - A synchronous key-value interface (`KeyValueStore`)
//! - A SQLite implementation with an optional byte quota
//! - The per-table record cache built on top (`LocalCache`)
//!
//! # Submodules
//!
//! - [`kv`] - Key-value trait and in-memory implementation
//! - [`local`] - Record cache (read/write/update by table)
//! - [`schema`] - SQLite schema definitions
//! - [`sqlite`] - SQLite key-value implementation

pub mod kv;
pub mod local;
pub mod schema;
pub mod sqlite;

pub use kv::{KeyValueStore, MemoryKv};
pub use local::{DEFAULT_PREFIX, LocalCache, LocalStatus};
pub use sqlite::SqliteKv;
