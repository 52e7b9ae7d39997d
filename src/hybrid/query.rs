//! Query-builder surface.
//!
//! ```rust,ignore
//! let rows = store
//!     .from("shale_batches")
//!     .select("*")
//!     .eq("miner_id", "m1")
//!     .order("created_at", false)
//!     .fetch()
//!     .await;
//!
//! store.from("cpr_requests").update(patch).eq("id", "r1").await;
//! ```

use crate::model::{Filter, Order, Record, Rows, parse_columns};
use serde_json::Value;

use super::store::{HybridStore, SelectOptions};
use super::types::{InsertResult, QueryResult, SingleResult, WriteResult};

/// Handle on one table.
#[derive(Debug, Clone)]
pub struct TableRef<'a> {
    store: &'a HybridStore,
    table: String,
}

impl<'a> TableRef<'a> {
    pub(crate) fn new(store: &'a HybridStore, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Start a read returning `columns` (`"*"` for all).
    #[must_use]
    pub fn select(&self, columns: &str) -> SelectBuilder<'a> {
        SelectBuilder {
            store: self.store,
            table: self.table.clone(),
            options: SelectOptions {
                columns: parse_columns(columns),
                ..SelectOptions::default()
            },
        }
    }

    /// Insert one row or many.
    pub async fn insert(&self, rows: impl Into<Rows>) -> InsertResult {
        self.store.execute_insert(&self.table, rows).await
    }

    /// Insert-or-merge keyed by `on_conflict`.
    pub async fn upsert(&self, rows: impl Into<Rows>, on_conflict: &str) -> WriteResult {
        self.store.execute_upsert(&self.table, rows, on_conflict).await
    }

    /// Start a patch; it runs once a filter is given with [`UpdateBuilder::eq`].
    #[must_use]
    pub fn update(&self, patch: Record) -> UpdateBuilder<'a> {
        UpdateBuilder {
            store: self.store,
            table: self.table.clone(),
            patch,
        }
    }
}

/// Pending read.
#[derive(Debug, Clone)]
pub struct SelectBuilder<'a> {
    store: &'a HybridStore,
    table: String,
    options: SelectOptions,
}

impl SelectBuilder<'_> {
    /// Equality filter applied to both stores.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.options.filter = Some(Filter::eq(column, value));
        self
    }

    /// Sort the merged rows.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.options.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    #[must_use]
    pub fn options(&self) -> &SelectOptions {
        &self.options
    }

    /// Run the read and return every row.
    pub async fn fetch(self) -> QueryResult<Vec<Record>> {
        self.store.execute_select(&self.table, &self.options).await
    }

    /// Run the read and return the first row.
    pub async fn single(self) -> SingleResult {
        self.store.execute_single(&self.table, &self.options).await
    }
}

/// Pending patch.
#[derive(Debug, Clone)]
pub struct UpdateBuilder<'a> {
    store: &'a HybridStore,
    table: String,
    patch: Record,
}

impl UpdateBuilder<'_> {
    /// Apply the patch to rows where `column == value`.
    pub async fn eq(self, column: &str, value: impl Into<Value>) -> WriteResult {
        let filter = Filter::eq(column, value);
        self.store.execute_update(&self.table, &self.patch, &filter).await
    }
}
