//! Remote store trait.
//!
//! Defines the interface every remote backend implements. Methods are
//! async because the only production backend is HTTP.

use crate::error::Result;
use crate::model::{Filter, Record};
use std::future::Future;
use std::pin::Pin;

use super::types::{RemoteInfo, RemoteQuery};

/// Trait for remote record stores.
///
/// Implemented by [`super::PostgrestRemote`] and, in tests, by the in-memory
/// store.
pub trait RemoteStore: Send + Sync {
    /// Adapter metadata.
    fn info(&self) -> RemoteInfo;

    /// Whether the adapter has enough configuration to attempt calls.
    fn is_configured(&self) -> bool;

    /// Filtered / ordered / single-row read.
    ///
    /// A single-row read that does not find exactly one row is an error.
    fn select(&self, query: &RemoteQuery) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Insert rows as given (identifiers included).
    fn insert(&self, table: &str, rows: &[Record]) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace rows keyed by `on_conflict`.
    fn upsert(
        &self,
        table: &str,
        rows: &[Record],
        on_conflict: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Patch every row matching `filter`.
    fn update(
        &self,
        table: &str,
        patch: &Record,
        filter: &Filter,
    ) -> impl Future<Output = Result<()>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`RemoteStore`] for boxing.
pub trait RemoteStoreBoxed: Send + Sync {
    fn info(&self) -> RemoteInfo;
    fn is_configured(&self) -> bool;
    fn select_boxed(&self, query: RemoteQuery) -> BoxFuture<'_, Result<Vec<Record>>>;
    fn insert_boxed(&self, table: String, rows: Vec<Record>) -> BoxFuture<'_, Result<()>>;
    fn upsert_boxed(
        &self,
        table: String,
        rows: Vec<Record>,
        on_conflict: String,
    ) -> BoxFuture<'_, Result<()>>;
    fn update_boxed(&self, table: String, patch: Record, filter: Filter) -> BoxFuture<'_, Result<()>>;
}

/// Boxed remote for runtime selection of the backend.
pub struct BoxedRemote {
    inner: Box<dyn RemoteStoreBoxed>,
}

impl std::fmt::Debug for BoxedRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedRemote").field("info", &self.inner.info()).finish()
    }
}

impl BoxedRemote {
    /// Wrap a concrete remote.
    pub fn new<R: RemoteStore + 'static>(remote: R) -> Self {
        Self {
            inner: Box::new(BoxedRemoteWrapper(remote)),
        }
    }

    #[must_use]
    pub fn info(&self) -> RemoteInfo {
        self.inner.info()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    /// See [`RemoteStore::select`].
    ///
    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn select(&self, query: &RemoteQuery) -> Result<Vec<Record>> {
        self.inner.select_boxed(query.clone()).await
    }

    /// See [`RemoteStore::insert`].
    ///
    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn insert(&self, table: &str, rows: &[Record]) -> Result<()> {
        self.inner.insert_boxed(table.to_string(), rows.to_vec()).await
    }

    /// See [`RemoteStore::upsert`].
    ///
    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn upsert(&self, table: &str, rows: &[Record], on_conflict: &str) -> Result<()> {
        self.inner
            .upsert_boxed(table.to_string(), rows.to_vec(), on_conflict.to_string())
            .await
    }

    /// See [`RemoteStore::update`].
    ///
    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn update(&self, table: &str, patch: &Record, filter: &Filter) -> Result<()> {
        self.inner
            .update_boxed(table.to_string(), patch.clone(), filter.clone())
            .await
    }
}

/// Wrapper to implement [`RemoteStoreBoxed`] for any [`RemoteStore`].
struct BoxedRemoteWrapper<R: RemoteStore + 'static>(R);

impl<R: RemoteStore + 'static> RemoteStoreBoxed for BoxedRemoteWrapper<R> {
    fn info(&self) -> RemoteInfo {
        self.0.info()
    }

    fn is_configured(&self) -> bool {
        self.0.is_configured()
    }

    // Arguments arrive owned so the returned future only borrows `self`.
    fn select_boxed(&self, query: RemoteQuery) -> BoxFuture<'_, Result<Vec<Record>>> {
        Box::pin(async move { self.0.select(&query).await })
    }

    fn insert_boxed(&self, table: String, rows: Vec<Record>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.0.insert(&table, &rows).await })
    }

    fn upsert_boxed(
        &self,
        table: String,
        rows: Vec<Record>,
        on_conflict: String,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.0.upsert(&table, &rows, &on_conflict).await })
    }

    fn update_boxed(&self, table: String, patch: Record, filter: Filter) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.0.update(&table, &patch, &filter).await })
    }
}
