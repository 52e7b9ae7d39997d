//! The hybrid store: local cache first, remote best effort.
//!
//! Reads union both sides with local rows taking precedence. Writes land in
//! the local cache before the remote is even attempted, and the remote
//! outcome never changes what the caller gets back beyond the `sync` flag.
//! There is no retry and no record of unsynced rows.

use crate::error::{Error, Result};
use crate::model::{Filter, Order, Record, Rows, key_value, new_record_id, project_columns};
use crate::remote::{BoxedRemote, RemoteQuery, RemoteStore};
use crate::storage::{LocalCache, LocalStatus};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::merge::{filter_rows, merge_rows, sort_rows};
use super::query::TableRef;
use super::types::{InsertResult, QueryResult, SingleResult, SyncStatus, WriteResult};

/// Options for a read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    /// Columns to return; empty or `*` returns everything.
    pub columns: Vec<String>,
    pub filter: Option<Filter>,
    pub order: Option<Order>,
}

/// Facade over a local cache and an optional remote store.
#[derive(Debug)]
pub struct HybridStore {
    local: LocalCache,
    remote: Option<BoxedRemote>,
    id_field: String,
}

impl HybridStore {
    /// Local-only store.
    #[must_use]
    pub fn new(local: LocalCache) -> Self {
        Self {
            local,
            remote: None,
            id_field: crate::model::DEFAULT_ID_FIELD.to_string(),
        }
    }

    /// Attach a remote store.
    #[must_use]
    pub fn with_remote<R: RemoteStore + 'static>(self, remote: R) -> Self {
        self.with_boxed_remote(Some(BoxedRemote::new(remote)))
    }

    #[must_use]
    pub fn with_boxed_remote(mut self, remote: Option<BoxedRemote>) -> Self {
        self.remote = remote;
        self
    }

    /// Use a field other than `id` as the reconciliation key.
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    #[must_use]
    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    #[must_use]
    pub fn remote(&self) -> Option<&BoxedRemote> {
        self.remote.as_ref()
    }

    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The remote store, if one is attached and configured.
    fn active_remote(&self) -> Option<&BoxedRemote> {
        self.remote.as_ref().filter(|r| r.is_configured())
    }

    #[must_use]
    pub fn is_remote_configured(&self) -> bool {
        self.active_remote().is_some()
    }

    /// Per-table query handle.
    #[must_use]
    pub fn from(&self, table: &str) -> TableRef<'_> {
        TableRef::new(self, table)
    }

    /// Remote rows (or the failure), then local rows, merged and sorted.
    async fn reconcile(
        &self,
        table: &str,
        options: &SelectOptions,
        single: bool,
    ) -> (Vec<Record>, Option<Error>, SyncStatus) {
        let (remote_rows, remote_error, sync) = match self.active_remote() {
            Some(remote) => {
                let query = RemoteQuery::new(table)
                    .filter(options.filter.clone())
                    .order(options.order.clone())
                    .single(single);
                match remote.select(&query).await {
                    Ok(rows) => (rows, None, SyncStatus::Synced),
                    Err(e) => {
                        warn!(table, error = %e, "Remote fetch failed, serving local rows");
                        let reason = e.to_string();
                        (Vec::new(), Some(e), SyncStatus::Failed(reason))
                    }
                }
            }
            None => (Vec::new(), None, SyncStatus::Skipped),
        };

        let local_rows = filter_rows(self.local.read_local(table), options.filter.as_ref());
        debug!(
            table,
            remote = remote_rows.len(),
            local = local_rows.len(),
            "Reconciling read"
        );

        let mut merged = merge_rows(remote_rows, local_rows, &self.id_field);
        if let Some(order) = &options.order {
            sort_rows(&mut merged, order);
        }

        (merged, remote_error, sync)
    }

    /// Read every matching row from both stores.
    ///
    /// Never fails: a remote failure only shows in `sync`.
    pub async fn execute_select(&self, table: &str, options: &SelectOptions) -> QueryResult<Vec<Record>> {
        let (rows, _, sync) = self.reconcile(table, options, false).await;
        let data = rows
            .iter()
            .map(|row| project_columns(row, &options.columns))
            .collect();
        QueryResult {
            data,
            error: None,
            sync,
        }
    }

    /// Read the first matching row.
    ///
    /// `error` is set only when nothing was found on either side: the
    /// remote's error when it failed, otherwise [`Error::NotFound`].
    pub async fn execute_single(&self, table: &str, options: &SelectOptions) -> SingleResult {
        let (rows, remote_error, sync) = self.reconcile(table, options, true).await;
        match rows.first() {
            Some(row) => QueryResult {
                data: Some(project_columns(row, &options.columns)),
                error: None,
                sync,
            },
            None => QueryResult {
                data: None,
                error: Some(remote_error.unwrap_or_else(|| Error::NotFound {
                    table: table.to_string(),
                })),
                sync,
            },
        }
    }

    /// Insert rows, assigning a UUID to any row without an identifier.
    ///
    /// The same identifier goes to both stores so they refer to the same
    /// record when both writes land.
    pub async fn execute_insert(&self, table: &str, rows: impl Into<Rows>) -> InsertResult {
        let mut rows = rows.into();
        for row in rows.iter_mut() {
            if key_value(row, &self.id_field).is_none() {
                row.insert(self.id_field.clone(), Value::String(new_record_id()));
            }
        }

        let local = self.local.write_local(table, rows.as_slice(), Some(&self.id_field));

        let sync = match self.active_remote() {
            Some(remote) => Self::sync_outcome(table, "insert", remote.insert(table, rows.as_slice()).await),
            None => SyncStatus::Skipped,
        };

        InsertResult {
            data: rows,
            error: None,
            local,
            sync,
        }
    }

    /// Insert-or-merge rows keyed by `on_conflict`.
    pub async fn execute_upsert(&self, table: &str, rows: impl Into<Rows>, on_conflict: &str) -> WriteResult {
        let rows = rows.into();
        let local = self.local.write_local(table, rows.as_slice(), Some(on_conflict));

        let sync = match self.active_remote() {
            Some(remote) => Self::sync_outcome(
                table,
                "upsert",
                remote.upsert(table, rows.as_slice(), on_conflict).await,
            ),
            None => SyncStatus::Skipped,
        };

        WriteResult {
            error: None,
            local,
            sync,
        }
    }

    /// Patch every row matching `filter`.
    pub async fn execute_update(&self, table: &str, patch: &Record, filter: &Filter) -> WriteResult {
        let local = self.local.update_local(table, patch, filter);

        let sync = match self.active_remote() {
            Some(remote) => Self::sync_outcome(table, "update", remote.update(table, patch, filter).await),
            None => SyncStatus::Skipped,
        };

        WriteResult {
            error: None,
            local,
            sync,
        }
    }

    /// Pull every remote row of `table` into the local cache.
    ///
    /// Unlike the facade calls this surfaces remote errors, since there is
    /// nothing local to fall back on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteNotConfigured`] without a remote, the remote's
    /// error if the fetch fails, or [`Error::Cache`] if the cache write fails.
    pub async fn sync_table(&self, table: &str) -> Result<usize> {
        let remote = self.active_remote().ok_or(Error::RemoteNotConfigured)?;
        let rows = remote.select(&RemoteQuery::new(table)).await?;

        match self.local.sync_to_local(table, &rows) {
            LocalStatus::Written | LocalStatus::Unchanged => {}
            LocalStatus::Unavailable => {
                return Err(Error::Cache("local cache is not attached".to_string()));
            }
            LocalStatus::Failed(reason) => return Err(Error::Cache(reason)),
        }

        info!(table, rows = rows.len(), "Cached remote rows locally");
        Ok(rows.len())
    }

    fn sync_outcome(table: &str, op: &str, outcome: Result<()>) -> SyncStatus {
        match outcome {
            Ok(()) => SyncStatus::Synced,
            Err(e) => {
                warn!(table, op, error = %e, "Remote write failed, keeping local copy");
                SyncStatus::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use crate::storage::MemoryKv;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn local_only() -> HybridStore {
        HybridStore::new(LocalCache::new(MemoryKv::new()))
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_is_visible() {
        let store = local_only();
        let result = store
            .execute_insert("shale_batches", rec(json!({"miner_id": "m1", "weight_kg": 1000})))
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.local, LocalStatus::Written);
        assert_eq!(result.sync, SyncStatus::Skipped);

        let Rows::One(row) = &result.data else {
            panic!("expected one row");
        };
        let id = row["id"].as_str().unwrap();
        assert_eq!(id.len(), 36);

        let read = store.execute_select("shale_batches", &SelectOptions::default()).await;
        assert_eq!(read.data.len(), 1);
        assert_eq!(read.data[0]["id"], json!(id));
        assert_eq!(read.data[0]["weight_kg"], json!(1000));
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_id() {
        let store = local_only();
        let result = store
            .execute_insert("t", vec![rec(json!({"id": "given"})), rec(json!({"id": null}))])
            .await;
        let rows = result.data.into_vec();
        assert_eq!(rows[0]["id"], json!("given"));
        assert!(rows[1]["id"].as_str().is_some_and(|id| id != "given"));
    }

    #[tokio::test]
    async fn test_single_not_found_without_remote() {
        let store = local_only();
        let result = store
            .execute_single(
                "profiles",
                &SelectOptions {
                    filter: Some(Filter::eq("id", "nobody")),
                    ..SelectOptions::default()
                },
            )
            .await;
        assert!(result.data.is_none());
        assert!(matches!(result.error, Some(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_single_suppresses_remote_error_when_local_has_row() {
        let remote = MemoryRemote::new();
        remote.set_failing(true);
        let store = local_only().with_remote(remote);
        store.execute_upsert("profiles", rec(json!({"id": "u1", "role": "miner"})), "id").await;

        let options = SelectOptions {
            filter: Some(Filter::eq("id", "u1")),
            ..SelectOptions::default()
        };
        let result = store.execute_single("profiles", &options).await;
        assert_eq!(result.data.unwrap()["role"], json!("miner"));
        assert!(result.error.is_none());
        assert!(matches!(result.sync, SyncStatus::Failed(_)));

        let missing = SelectOptions {
            filter: Some(Filter::eq("id", "u2")),
            ..SelectOptions::default()
        };
        let result = store.execute_single("profiles", &missing).await;
        assert!(matches!(result.error, Some(Error::Remote { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_writes_reach_remote_when_configured() {
        let store = local_only().with_remote(MemoryRemote::new());
        let inserted = store.execute_insert("cpr_requests", rec(json!({"status": "pending"}))).await;
        assert_eq!(inserted.sync, SyncStatus::Synced);
        let id = inserted.data.as_slice()[0]["id"].clone();

        let updated = store
            .execute_update(
                "cpr_requests",
                &rec(json!({"status": "approved"})),
                &Filter::eq("id", id.clone()),
            )
            .await;
        assert_eq!(updated.sync, SyncStatus::Synced);
        assert_eq!(updated.local, LocalStatus::Written);

        let read = store.execute_select("cpr_requests", &SelectOptions::default()).await;
        assert_eq!(read.sync, SyncStatus::Synced);
        assert_eq!(read.data.len(), 1);
        assert_eq!(read.data[0]["id"], id);
        assert_eq!(read.data[0]["status"], json!("approved"));
    }

    #[tokio::test]
    async fn test_sync_table_pulls_remote_rows() {
        let remote = MemoryRemote::new()
            .with_rows("profiles", vec![rec(json!({"id": "u1"})), rec(json!({"id": "u2"}))]);
        let store = local_only().with_remote(remote);

        assert_eq!(store.sync_table("profiles").await.unwrap(), 2);
        assert_eq!(store.local().read_local("profiles").len(), 2);
    }

    #[tokio::test]
    async fn test_sync_table_requires_remote() {
        let err = local_only().sync_table("profiles").await.unwrap_err();
        assert!(matches!(err, Error::RemoteNotConfigured));
    }

    #[tokio::test]
    async fn test_sync_table_reports_cache_failure() {
        let remote = MemoryRemote::new().with_rows("profiles", vec![rec(json!({"id": "u1"}))]);
        let store = HybridStore::new(LocalCache::detached()).with_remote(remote);

        let err = store.sync_table("profiles").await.unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_projection_after_merge() {
        let store = local_only();
        store
            .execute_insert("t", rec(json!({"id": "a", "status": "pending", "n": 1})))
            .await;
        let options = SelectOptions {
            columns: crate::model::parse_columns("status"),
            ..SelectOptions::default()
        };
        let read = store.execute_select("t", &options).await;
        assert_eq!(Value::Object(read.data[0].clone()), json!({"status": "pending"}));
    }

    #[tokio::test]
    async fn test_unconfigured_postgrest_is_skipped() {
        let store = local_only().with_remote(crate::remote::PostgrestRemote::new(
            crate::remote::RemoteConfig::default(),
        ));
        assert!(!store.is_remote_configured());
        let result = store.execute_upsert("t", rec(json!({"id": "a"})), "id").await;
        assert_eq!(result.sync, SyncStatus::Skipped);
    }
}
