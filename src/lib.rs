//! govstore - local-first record store with best-effort remote sync
//!
//! Keeps a full copy of every table it touches in a local key-value cache
//! and mirrors writes to a PostgREST-style remote (Supabase) when one is
//! configured. Reads union both sides; local rows win on conflict.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Record type, filters, ordering and merge keys
//! - [`storage`] - Local cache over SQLite (or memory)
//! - [`remote`] - Remote store adapters (PostgREST, in-memory)
//! - [`hybrid`] - Reconciliation engine and query-builder facade
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```rust,ignore
//! use govstore::{HybridStore, storage::{LocalCache, SqliteKv}};
//!
//! let store = HybridStore::new(LocalCache::new(SqliteKv::open(path)?));
//! store.from("shale_batches").insert(batch).await;
//! let recent = store
//!     .from("shale_batches")
//!     .select("*")
//!     .eq("miner_id", "m1")
//!     .order("created_at", false)
//!     .fetch()
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod hybrid;
pub mod model;
pub mod remote;
pub mod storage;

pub use error::{Error, Result};
pub use hybrid::{HybridStore, InsertResult, QueryResult, SelectOptions, SingleResult, SyncStatus, WriteResult};
pub use model::{Filter, Order, Record, Rows};
