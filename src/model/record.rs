//! Schema-less records and the small query vocabulary around them.
//!
//! A [`Record`] is one row of an application table ("profiles",
//! "shale_batches", "cpr_requests", ...). Tables carry no schema; the only
//! field the store cares about is the identifying key, `id` by default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use super::hash::content_hash;

/// One row of application data.
pub type Record = serde_json::Map<String, Value>;

/// Default identifying field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// One record or a batch, mirroring the `record | records` shape accepted
/// by insert and upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    One(Record),
    Many(Vec<Record>),
}

impl Rows {
    /// Borrow the rows as a slice regardless of shape.
    #[must_use]
    pub fn as_slice(&self) -> &[Record] {
        match self {
            Self::One(record) => std::slice::from_ref(record),
            Self::Many(records) => records,
        }
    }

    /// Mutable access to every row.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        match self {
            Self::One(record) => std::slice::from_mut(record).iter_mut(),
            Self::Many(records) => records.iter_mut(),
        }
    }

    /// Flatten into a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Record> {
        match self {
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Parse a JSON object or array of objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither an object nor an array of objects.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::One(map)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(crate::Error::InvalidArgument(format!(
                        "expected JSON object in array, got {other}"
                    ))),
                })
                .collect::<crate::Result<Vec<_>>>()
                .map(Self::Many),
            other => Err(crate::Error::InvalidArgument(format!(
                "expected JSON object or array, got {other}"
            ))),
        }
    }
}

impl From<Record> for Rows {
    fn from(record: Record) -> Self {
        Self::One(record)
    }
}

impl From<Vec<Record>> for Rows {
    fn from(records: Vec<Record>) -> Self {
        Self::Many(records)
    }
}

/// Equality filter (`column = value`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Strict equality against the record's field. A null filter matches a
    /// missing field or an explicit null, like PostgREST's `is.null`; any
    /// other value never matches a missing field.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match record.get(&self.column) {
            Some(v) => *v == self.value,
            None => self.value.is_null(),
        }
    }
}

/// Sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// The record's identifying value, if it has a usable one.
///
/// Null and empty-string values count as absent.
#[must_use]
pub fn key_value<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

/// Merge key for reconciliation.
///
/// Records with an identifying value key on its JSON encoding (so `"5"` and
/// `5` stay distinct). Records without one fall back to a structural key
/// over the whole record, which only de-duplicates exact copies.
#[must_use]
pub fn record_key(record: &Record, field: &str) -> String {
    match key_value(record, field) {
        Some(v) => format!("k:{v}"),
        None => format!("s:{}", content_hash(record)),
    }
}

/// Shallow merge: fields in `patch` overwrite, everything else is kept.
pub fn shallow_merge(target: &mut Record, patch: &Record) {
    for (field, value) in patch {
        target.insert(field.clone(), value.clone());
    }
}

/// Generate a fresh record identifier (UUID v4).
#[must_use]
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Sort rank of a value's type. Missing and null rank last.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Bool(_)) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Array(_) | Value::Object(_)) => 3,
        None | Some(Value::Null) => 4,
    }
}

/// Total order over field values used for sorting.
///
/// Values of different types order by type (booleans, numbers, strings,
/// arrays and objects, then missing or null). Within a type, numbers
/// compare numerically, strings lexicographically (which orders ISO-8601
/// timestamps correctly) and booleans false before true. Arrays, objects
/// and missing values compare equal among themselves, so a stable sort
/// keeps them in their incoming order.
///
/// Missing values sort last ascending and first descending, like
/// PostgREST's defaults.
#[must_use]
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Keep only the listed columns. `*` or an empty list keeps everything.
#[must_use]
pub fn project_columns(record: &Record, columns: &[String]) -> Record {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return record.clone();
    }
    columns
        .iter()
        .filter_map(|c| record.get(c).map(|v| (c.clone(), v.clone())))
        .collect()
}

/// Parse a PostgREST-style column list (`"id, status"`).
#[must_use]
pub fn parse_columns(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
