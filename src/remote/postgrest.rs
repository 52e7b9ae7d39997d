//! PostgREST remote store.
//!
//! Talks to the hosted backend's REST interface (`/rest/v1/<table>`).
//! Authentication is the project's anon key, sent both as `apikey` and as
//! a bearer token.

use crate::error::{Error, Result};
use crate::model::{Filter, Order, Record};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use super::config::RemoteConfig;
use super::provider::RemoteStore;
use super::types::{RemoteInfo, RemoteQuery};

/// Media type asking PostgREST for exactly one row as an object.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

const PREFER: &str = "Prefer";

/// PostgREST-backed remote store.
pub struct PostgrestRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl PostgrestRemote {
    /// Create a client for `config`.
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    /// `{base}/rest/v1/{table}`, with `table` percent-encoded as one path
    /// segment.
    fn table_url(&self, table: &str) -> Result<Url> {
        let base = self
            .config
            .url
            .as_deref()
            .filter(|_| self.config.is_configured())
            .ok_or(Error::RemoteNotConfigured)?;
        let mut url = Url::parse(base.trim())
            .map_err(|e| Error::Config(format!("Invalid remote URL '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("Remote URL cannot take a path: {base}")))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let key = self.config.key_or_placeholder();
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).map_err(|e| Error::Config(format!("Invalid remote key: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| Error::Config(format!("Invalid remote key: {e}")))?,
        );
        Ok(headers)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

/// Render a value the way PostgREST expects it in a filter.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `column=eq.value` (or `is.null` for nulls).
pub(crate) fn filter_param(filter: &Filter) -> (String, String) {
    let op = match &filter.value {
        Value::Null => "is.null".to_string(),
        v => format!("eq.{}", render_value(v)),
    };
    (filter.column.clone(), op)
}

/// `order=column.asc|desc`.
pub(crate) fn order_param(order: &Order) -> (String, String) {
    let dir = if order.ascending { "asc" } else { "desc" };
    ("order".to_string(), format!("{}.{dir}", order.column))
}

/// Query-string pairs for a read. Always selects every column so the
/// reconciliation key is present.
pub(crate) fn select_params(query: &RemoteQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    if let Some(filter) = &query.filter {
        params.push(filter_param(filter));
    }
    if let Some(order) = &query.order {
        params.push(order_param(order));
    }
    params
}

/// `columns="a","b"` for multi-row bodies, so rows with differing key sets
/// are accepted (missing keys take the column default).
pub(crate) fn columns_param(rows: &[Record]) -> Option<(String, String)> {
    if rows.len() < 2 {
        return None;
    }
    let keys: BTreeSet<&str> = rows.iter().flat_map(|row| row.keys().map(String::as_str)).collect();
    let list = keys.iter().map(|k| format!("\"{k}\"")).collect::<Vec<_>>().join(",");
    Some(("columns".to_string(), list))
}

impl PostgrestRemote {
    fn select_request(&self, query: &RemoteQuery) -> Result<RequestBuilder> {
        let url = self.table_url(&query.table)?;
        let mut request = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(&select_params(query));
        if query.single {
            request = request.header(ACCEPT, SINGLE_OBJECT);
        }
        Ok(request)
    }

    fn insert_request(&self, table: &str, rows: &[Record]) -> Result<RequestBuilder> {
        let url = self.table_url(table)?;
        let params: Vec<_> = columns_param(rows).into_iter().collect();
        Ok(self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .header(PREFER, "return=minimal")
            .query(&params)
            .json(rows))
    }

    fn upsert_request(&self, table: &str, rows: &[Record], on_conflict: &str) -> Result<RequestBuilder> {
        let url = self.table_url(table)?;
        let mut params = vec![("on_conflict".to_string(), on_conflict.to_string())];
        params.extend(columns_param(rows));
        Ok(self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .header(PREFER, "resolution=merge-duplicates,return=minimal")
            .query(&params)
            .json(rows))
    }

    fn update_request(&self, table: &str, patch: &Record, filter: &Filter) -> Result<RequestBuilder> {
        let url = self.table_url(table)?;
        Ok(self
            .client
            .patch(url)
            .headers(self.auth_headers()?)
            .header(PREFER, "return=minimal")
            .query(&[filter_param(filter)])
            .json(patch))
    }
}

impl RemoteStore for PostgrestRemote {
    fn info(&self) -> RemoteInfo {
        RemoteInfo {
            name: "postgrest".to_string(),
            endpoint: self.config.url.clone(),
            configured: self.config.is_configured(),
        }
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn select(&self, query: &RemoteQuery) -> Result<Vec<Record>> {
        debug!(table = %query.table, filter = ?query.filter, single = query.single, "Remote select");
        let request = self.select_request(query)?;

        let response = Self::check(request.send().await?).await?;
        match response.json::<Value>().await? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            Value::Object(map) => Ok(vec![map]),
            _ => Ok(Vec::new()),
        }
    }

    async fn insert(&self, table: &str, rows: &[Record]) -> Result<()> {
        debug!(table, rows = rows.len(), "Remote insert");
        let request = self.insert_request(table, rows)?;
        Self::check(request.send().await?).await.map(|_| ())
    }

    async fn upsert(&self, table: &str, rows: &[Record], on_conflict: &str) -> Result<()> {
        debug!(table, rows = rows.len(), on_conflict, "Remote upsert");
        let request = self.upsert_request(table, rows, on_conflict)?;
        Self::check(request.send().await?).await.map(|_| ())
    }

    async fn update(&self, table: &str, patch: &Record, filter: &Filter) -> Result<()> {
        debug!(table, column = %filter.column, "Remote update");
        let request = self.update_request(table, patch, filter)?;
        Self::check(request.send().await?).await.map(|_| ())
    }
}
