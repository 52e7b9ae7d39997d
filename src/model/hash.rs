//! Content hashing for records.
//!
//! Un-keyed records are reconciled on a SHA256 fingerprint of their
//! serialized JSON. `serde_json::Map` keeps keys sorted, so two records
//! with the same fields hash the same regardless of insertion order.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA256 hash of a serializable value.
///
/// The value is first serialized to JSON, then hashed. Values that fail to
/// serialize (non-string map keys) hash as the empty string.
#[must_use]
pub fn content_hash<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}
