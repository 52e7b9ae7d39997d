//! Types shared by remote store adapters.

use serde::Serialize;

use crate::model::{Filter, Order};

/// Adapter metadata for status output.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteInfo {
    /// Adapter name ("postgrest", "memory").
    pub name: String,
    /// Base endpoint, if any.
    pub endpoint: Option<String>,
    /// Whether calls will be attempted at all.
    pub configured: bool,
}

/// A filtered, optionally ordered, optionally single-row read.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQuery {
    pub table: String,
    pub filter: Option<Filter>,
    pub order: Option<Order>,
    pub single: bool,
}

impl RemoteQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            order: None,
            single: false,
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn order(mut self, order: Option<Order>) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }
}
