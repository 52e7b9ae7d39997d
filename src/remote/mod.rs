//! Remote store adapters.
//!
//! The remote store is advisory: the hybrid layer attempts every call
//! but never lets a failure reach its callers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   HybridStore    │
//! └────────┬─────────┘
//!          │ BoxedRemote
//!     ┌────┴─────┐
//!     ▼          ▼
//! ┌─────────┐ ┌────────┐
//! │PostgREST│ │ Memory │
//! └─────────┘ └────────┘
//!     │
//!     ▼
//!   HTTPS
//! ```
//!
//! The in-memory store is a test double, built only for tests or with the
//! `test-util` feature.

pub mod config;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgrest;
pub mod provider;
pub mod types;

pub use config::{DEFAULT_TIMEOUT, PLACEHOLDER_URL, RemoteConfig};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryRemote;
pub use postgrest::PostgrestRemote;
pub use provider::{BoxedRemote, RemoteStore};
pub use types::{RemoteInfo, RemoteQuery};
