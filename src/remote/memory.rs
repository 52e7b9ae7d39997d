//! In-process remote store.
//!
//! Behaves like a small PostgREST table server held in memory: primary-key
//! conflicts on insert, merge on upsert, exactly-one-row reads. A failure
//! switch makes every call error, which is how the degraded paths of the
//! hybrid store are exercised.

use crate::error::{Error, Result};
use crate::model::{DEFAULT_ID_FIELD, Filter, Record, compare_values, key_value, shallow_merge};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::provider::RemoteStore;
use super::types::{RemoteInfo, RemoteQuery};

/// Memory-backed remote store.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    tables: Mutex<BTreeMap<String, Vec<Record>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with rows, bypassing conflict checks.
    #[must_use]
    pub fn with_rows(self, table: &str, rows: Vec<Record>) -> Self {
        self.lock().insert(table.to_string(), rows);
        self
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls attempted so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Current rows of `table`.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Record>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Remote {
                status: 503,
                message: "remote unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemote {
    fn info(&self) -> RemoteInfo {
        RemoteInfo {
            name: "memory".to_string(),
            endpoint: None,
            configured: true,
        }
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn select(&self, query: &RemoteQuery) -> Result<Vec<Record>> {
        self.begin()?;
        let mut rows: Vec<Record> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| query.filter.as_ref().is_none_or(|f| f.matches(row)))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if query.single && rows.len() != 1 {
            return Err(Error::Remote {
                status: 406,
                message: format!("JSON object requested, multiple (or no) rows returned: {}", rows.len()),
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: &[Record]) -> Result<()> {
        self.begin()?;
        let mut tables = self.lock();
        let existing = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Some(id) = key_value(row, DEFAULT_ID_FIELD) {
                if existing.iter().any(|r| r.get(DEFAULT_ID_FIELD) == Some(id)) {
                    return Err(Error::Remote {
                        status: 409,
                        message: format!("duplicate key value violates unique constraint: {id}"),
                    });
                }
            }
        }
        existing.extend(rows.iter().cloned());
        Ok(())
    }

    async fn upsert(&self, table: &str, rows: &[Record], on_conflict: &str) -> Result<()> {
        self.begin()?;
        let mut tables = self.lock();
        let existing = tables.entry(table.to_string()).or_default();
        for row in rows {
            let position = key_value(row, on_conflict)
                .and_then(|v| existing.iter().position(|r| r.get(on_conflict) == Some(v)));
            match position {
                Some(index) => shallow_merge(&mut existing[index], row),
                None => existing.push(row.clone()),
            }
        }
        Ok(())
    }

    async fn update(&self, table: &str, patch: &Record, filter: &Filter) -> Result<()> {
        self.begin()?;
        let mut tables = self.lock();
        if let Some(existing) = tables.get_mut(table) {
            for row in existing.iter_mut().filter(|r| filter.matches(r)) {
                shallow_merge(row, patch);
            }
        }
        Ok(())
    }
}
