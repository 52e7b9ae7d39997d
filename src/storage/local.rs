//! Local cache adapter.
//!
//! Holds one serialized record collection per table under
//! `<prefix><table>`. Every mutation reads the whole collection, changes it,
//! and writes the whole collection back.
//!
//! The adapter never fails outward:
//! - a missing or corrupted entry reads as an empty collection
//! - a medium read error fails the write instead of overwriting the entry
//! - a rejected write (quota, I/O) is logged and reported as
//!   [`LocalStatus::Failed`], leaving the previous value in place
//! - a detached cache (no persistent medium) reads empty and ignores writes

use crate::model::{Filter, Record, key_value, shallow_merge};
use crate::storage::kv::KeyValueStore;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Default key prefix for cached tables.
pub const DEFAULT_PREFIX: &str = "govchain_db_";

/// Outcome of a local cache write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LocalStatus {
    /// The collection was rewritten.
    Written,
    /// Nothing matched; the stored collection was left as is.
    Unchanged,
    /// No persistent medium is attached.
    Unavailable,
    /// The medium rejected the write.
    Failed(String),
}

impl LocalStatus {
    /// True when subsequent local reads will observe the write.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Written | Self::Unchanged)
    }
}

/// Per-table record cache over a [`KeyValueStore`].
pub struct LocalCache {
    kv: Option<Box<dyn KeyValueStore>>,
    prefix: String,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("attached", &self.kv.is_some())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl LocalCache {
    /// Cache over `kv` with the default prefix.
    pub fn new<K: KeyValueStore + 'static>(kv: K) -> Self {
        Self {
            kv: Some(Box::new(kv)),
            prefix: DEFAULT_PREFIX.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Cache with no persistent medium.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            kv: None,
            prefix: DEFAULT_PREFIX.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.kv.is_some()
    }

    fn entry_key(&self, table: &str) -> String {
        format!("{}{}", self.prefix, table)
    }

    /// The cached collection for `table`; empty when absent or unreadable.
    #[must_use]
    pub fn read_local(&self, table: &str) -> Vec<Record> {
        match self.load(table) {
            Ok(records) => records,
            Err(e) => {
                warn!(table, error = %e, "Local cache read failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Read for a read-modify-write cycle.
    ///
    /// Medium errors propagate so the caller never writes back a partial
    /// collection; a corrupted entry still reads as empty.
    fn load(&self, table: &str) -> crate::Result<Vec<Record>> {
        let Some(kv) = &self.kv else {
            return Ok(Vec::new());
        };

        let Some(raw) = kv.get(&self.entry_key(table))? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Record>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(table, error = %e, "Corrupted local cache entry, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Merge `rows` into the cached collection.
    ///
    /// A row whose `unique_key` matches a cached row is shallow-merged into
    /// it; anything else (including rows lacking the key, or no key at all)
    /// is appended.
    pub fn write_local(&self, table: &str, rows: &[Record], unique_key: Option<&str>) -> LocalStatus {
        if self.kv.is_none() {
            return LocalStatus::Unavailable;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut updated = match self.load(table) {
            Ok(records) => records,
            Err(e) => return Self::read_failed(table, &e),
        };
        for row in rows {
            let existing = unique_key.and_then(|field| {
                let wanted = key_value(row, field)?;
                updated.iter().position(|item| item.get(field) == Some(wanted))
            });
            match existing {
                Some(index) => shallow_merge(&mut updated[index], row),
                None => updated.push(row.clone()),
            }
        }

        self.persist(table, &updated)
    }

    /// Shallow-merge `patch` into every cached row matching `filter`.
    ///
    /// Zero matches leaves the stored collection untouched.
    pub fn update_local(&self, table: &str, patch: &Record, filter: &Filter) -> LocalStatus {
        if self.kv.is_none() {
            return LocalStatus::Unavailable;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut current = match self.load(table) {
            Ok(records) => records,
            Err(e) => return Self::read_failed(table, &e),
        };
        let mut matched = 0usize;
        for item in current.iter_mut().filter(|item| filter.matches(item)) {
            shallow_merge(item, patch);
            matched += 1;
        }

        if matched == 0 {
            debug!(table, column = %filter.column, "Local update matched no rows");
            return LocalStatus::Unchanged;
        }
        self.persist(table, &current)
    }

    /// Cache rows fetched from the remote store, keyed by `id`.
    pub fn sync_to_local(&self, table: &str, rows: &[Record]) -> LocalStatus {
        self.write_local(table, rows, Some(crate::model::DEFAULT_ID_FIELD))
    }

    /// Cached table names with their record counts.
    #[must_use]
    pub fn tables(&self) -> Vec<(String, usize)> {
        let Some(kv) = &self.kv else {
            return Vec::new();
        };
        let keys = match kv.keys_with_prefix(&self.prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list local cache entries");
                return Vec::new();
            }
        };
        keys.into_iter()
            .filter_map(|key| key.strip_prefix(&self.prefix).map(String::from))
            .map(|table| {
                let count = self.read_local(&table).len();
                (table, count)
            })
            .collect()
    }

    /// Drop the cached collection for `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    pub fn clear(&self, table: &str) -> crate::Result<bool> {
        let Some(kv) = &self.kv else {
            return Ok(false);
        };
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        kv.remove(&self.entry_key(table))
    }

    fn read_failed(table: &str, error: &crate::Error) -> LocalStatus {
        warn!(table, error = %error, "Local cache read failed, write skipped");
        LocalStatus::Failed(error.to_string())
    }

    fn persist(&self, table: &str, records: &[Record]) -> LocalStatus {
        let Some(kv) = &self.kv else {
            return LocalStatus::Unavailable;
        };
        let serialized = match serde_json::to_string(records) {
            Ok(s) => s,
            Err(e) => return LocalStatus::Failed(e.to_string()),
        };
        match kv.set(&self.entry_key(table), &serialized) {
            Ok(()) => LocalStatus::Written,
            Err(e) => {
                warn!(table, error = %e, "Local cache disabled for this write");
                LocalStatus::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryKv;
    use crate::storage::sqlite::SqliteKv;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

    fn rec(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    /// Memory store whose next `get` fails when armed.
    #[derive(Default)]
    struct UnreliableKv {
        inner: MemoryKv,
        fail_next_get: Arc<AtomicBool>,
    }

    impl KeyValueStore for UnreliableKv {
        fn get(&self, key: &str) -> crate::Result<Option<String>> {
            if self.fail_next_get.swap(false, AtomicOrdering::SeqCst) {
                return Err(crate::Error::Cache("database is locked".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> crate::Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> crate::Result<bool> {
            self.inner.remove(key)
        }

        fn keys_with_prefix(&self, prefix: &str) -> crate::Result<Vec<String>> {
            self.inner.keys_with_prefix(prefix)
        }
    }

    fn cache() -> LocalCache {
        LocalCache::new(MemoryKv::new())
    }

    #[test]
    fn test_read_local_empty_table() {
        assert!(cache().read_local("profiles").is_empty());
    }

    #[test]
    fn test_detached_cache_reads_empty_and_ignores_writes() {
        let local = LocalCache::detached();
        let status = local.write_local("profiles", &[rec(json!({"id": "u1"}))], Some("id"));
        assert_eq!(status, LocalStatus::Unavailable);
        assert!(local.read_local("profiles").is_empty());
        assert!(local.tables().is_empty());
    }

    #[test]
    fn test_write_local_merges_on_unique_key() {
        let local = cache();
        local.write_local(
            "profiles",
            &[rec(json!({"id": "u1", "role": "miner", "name": "Ana"}))],
            Some("id"),
        );
        local.write_local("profiles", &[rec(json!({"id": "u1", "role": "council"}))], Some("id"));

        let rows = local.read_local("profiles");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"id": "u1", "role": "council", "name": "Ana"})
        );
    }

    #[test]
    fn test_write_local_alternate_key() {
        let local = cache();
        local.write_local("profiles", &[rec(json!({"wallet": "0xA", "v": 1}))], Some("wallet"));
        local.write_local("profiles", &[rec(json!({"wallet": "0xA", "v": 2}))], Some("wallet"));
        local.write_local("profiles", &[rec(json!({"wallet": "0xB", "v": 1}))], Some("wallet"));

        let rows = local.read_local("profiles");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["v"], json!(2));
    }

    #[test]
    fn test_write_local_appends_unkeyed_rows() {
        let local = cache();
        let row = rec(json!({"note": "same"}));
        local.write_local("notes", &[row.clone()], Some("id"));
        local.write_local("notes", &[row.clone()], Some("id"));
        local.write_local("notes", &[row], None);
        assert_eq!(local.read_local("notes").len(), 3);
    }

    #[test]
    fn test_update_local_patches_matches_only() {
        let local = cache();
        local.write_local(
            "cpr_requests",
            &[
                rec(json!({"id": "r1", "status": "pending"})),
                rec(json!({"id": "r2", "status": "pending"})),
                rec(json!({"id": "r3", "status": "approved"})),
            ],
            Some("id"),
        );

        let status = local.update_local(
            "cpr_requests",
            &rec(json!({"status": "approved", "reviewer": "c1"})),
            &Filter::eq("id", "r2"),
        );
        assert_eq!(status, LocalStatus::Written);

        let rows = local.read_local("cpr_requests");
        assert_eq!(rows[0]["status"], json!("pending"));
        assert_eq!(rows[1]["status"], json!("approved"));
        assert_eq!(rows[1]["reviewer"], json!("c1"));
        assert!(rows[2].get("reviewer").is_none());
    }

    #[test]
    fn test_update_local_no_match_is_noop() {
        let local = cache();
        local.write_local("t", &[rec(json!({"id": "a", "v": 1}))], Some("id"));
        let before = local.read_local("t");

        let status = local.update_local("t", &rec(json!({"v": 9})), &Filter::eq("id", "missing"));
        assert_eq!(status, LocalStatus::Unchanged);
        assert_eq!(local.read_local("t"), before);
    }

    #[test]
    fn test_corrupted_entry_reads_empty() {
        let kv = MemoryKv::new();
        kv.set("govchain_db_broken", "{not json").unwrap();
        let local = LocalCache::new(kv);
        assert!(local.read_local("broken").is_empty());

        // A subsequent write replaces the corrupted value
        local.write_local("broken", &[rec(json!({"id": "x"}))], Some("id"));
        assert_eq!(local.read_local("broken").len(), 1);
    }

    #[test]
    fn test_quota_failure_is_reported_not_thrown() {
        let kv = SqliteKv::open_memory().unwrap().with_quota(Some(64));
        let local = LocalCache::new(kv);

        let small = local.write_local("t", &[rec(json!({"id": "a"}))], Some("id"));
        assert_eq!(small, LocalStatus::Written);

        let big = rec(json!({"id": "b", "blob": "x".repeat(200)}));
        let status = local.write_local("t", &[big], Some("id"));
        assert!(matches!(status, LocalStatus::Failed(_)));

        // Previous value survives
        assert_eq!(local.read_local("t").len(), 1);
    }

    #[test]
    fn test_tables_and_clear() {
        let local = cache().with_prefix("test_");
        local.write_local("a", &[rec(json!({"id": "1"})), rec(json!({"id": "2"}))], Some("id"));
        local.write_local("b", &[rec(json!({"id": "1"}))], Some("id"));

        assert_eq!(
            local.tables(),
            vec![("a".to_string(), 2), ("b".to_string(), 1)]
        );

        assert!(local.clear("a").unwrap());
        assert!(local.read_local("a").is_empty());
        assert_eq!(local.tables().len(), 1);
    }

    #[test]
    fn test_sync_to_local_keys_on_id() {
        let local = cache();
        local.write_local("t", &[rec(json!({"id": "a", "local": true}))], Some("id"));
        local.sync_to_local("t", &[rec(json!({"id": "a", "v": 1})), rec(json!({"id": "b"}))]);

        let rows = local.read_local("t");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["local"], json!(true));
        assert_eq!(rows[0]["v"], json!(1));
    }

    #[test]
    fn test_read_error_does_not_overwrite_collection() {
        let kv = UnreliableKv::default();
        let fail = Arc::clone(&kv.fail_next_get);
        let local = LocalCache::new(kv);
        let seed: Vec<Record> = (0..5).map(|i| rec(json!({"id": i}))).collect();
        local.write_local("t", &seed, Some("id"));

        fail.store(true, AtomicOrdering::SeqCst);
        let status = local.write_local("t", &[rec(json!({"id": "new"}))], Some("id"));
        assert!(matches!(status, LocalStatus::Failed(_)));
        assert_eq!(local.read_local("t").len(), 5);

        fail.store(true, AtomicOrdering::SeqCst);
        let status = local.update_local("t", &rec(json!({"v": 1})), &Filter::eq("id", 0));
        assert!(matches!(status, LocalStatus::Failed(_)));
        assert!(local.read_local("t").iter().all(|r| r.get("v").is_none()));

        let status = local.write_local("t", &[rec(json!({"id": "new"}))], Some("id"));
        assert_eq!(status, LocalStatus::Written);
        assert_eq!(local.read_local("t").len(), 6);
    }
}
