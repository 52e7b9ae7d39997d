//! Command implementations.

pub mod completions;
pub mod pull;
pub mod select;
pub mod status;
pub mod tables;
pub mod version;
pub mod write;

use crate::error::{Error, Result};
use crate::hybrid::SyncStatus;
use crate::model::{Filter, Rows};
use colored::{ColoredString, Colorize};
use serde_json::Value;
use std::future::Future;
use std::io::Read;

/// Run `future` to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    Ok(rt.block_on(future))
}

/// Short description of the remote outcome for human output.
pub(crate) fn sync_label(sync: &SyncStatus) -> ColoredString {
    match sync {
        SyncStatus::Synced => "synced".green(),
        SyncStatus::Skipped => "local only".yellow(),
        SyncStatus::Failed(_) => "remote failed".red(),
    }
}

/// Parse `field=value` into an equality filter.
///
/// The value is read as JSON when it parses (`42`, `true`, `"x"`, `null`)
/// and as a plain string otherwise, so `status=pending` works unquoted.
pub fn parse_filter(expr: &str) -> Result<Filter> {
    let (field, raw) = expr
        .split_once('=')
        .ok_or_else(|| Error::InvalidArgument(format!("filter must be field=value, got '{expr}'")))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(Error::InvalidArgument(format!("filter has no field name: '{expr}'")));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok(Filter::eq(field, value))
}

/// Parse a JSON object or array argument; `-` reads it from stdin.
pub fn parse_rows(arg: &str) -> Result<Rows> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        arg.to_string()
    };

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| Error::InvalidArgument(format!("invalid JSON data: {e}")))?;
    Rows::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter_plain_string() {
        let filter = parse_filter("miner_id=m1").unwrap();
        assert_eq!(filter.column, "miner_id");
        assert_eq!(filter.value, json!("m1"));
    }

    #[test]
    fn test_parse_filter_json_values() {
        assert_eq!(parse_filter("n=42").unwrap().value, json!(42));
        assert_eq!(parse_filter("ok=true").unwrap().value, json!(true));
        assert_eq!(parse_filter("s=\"42\"").unwrap().value, json!("42"));
        assert_eq!(parse_filter("note=a=b").unwrap().value, json!("a=b"));
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        assert!(matches!(parse_filter("nofield"), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_filter("=x"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_rows() {
        assert_eq!(parse_rows(r#"{"a": 1}"#).unwrap().len(), 1);
        assert_eq!(parse_rows(r#"[{"a": 1}, {"a": 2}]"#).unwrap().len(), 2);
        assert!(parse_rows("[1, 2]").is_err());
        assert!(parse_rows("{oops").is_err());
    }
}
