//! Read reconciliation: union of remote and local rows, local wins.

use crate::model::{Filter, Order, Record, compare_values, record_key};
use std::collections::HashMap;

/// Keep rows matching `filter` (all rows when there is none).
#[must_use]
pub fn filter_rows(rows: Vec<Record>, filter: Option<&Filter>) -> Vec<Record> {
    match filter {
        Some(f) => rows.into_iter().filter(|row| f.matches(row)).collect(),
        None => rows,
    }
}

/// Union `remote` and `local` keyed on `id_field`.
///
/// Remote rows go in first, then local rows overlay them: on a key
/// collision the local row replaces the remote one in place. Output order
/// is first-seen order of each key. Rows without an identifying value use
/// a structural key, so only exact duplicates collapse.
#[must_use]
pub fn merge_rows(remote: Vec<Record>, local: Vec<Record>, id_field: &str) -> Vec<Record> {
    let mut merged: Vec<Record> = Vec::with_capacity(remote.len() + local.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in remote.into_iter().chain(local) {
        let key = record_key(&row, id_field);
        match index.get(&key) {
            Some(&position) => merged[position] = row,
            None => {
                index.insert(key, merged.len());
                merged.push(row);
            }
        }
    }

    merged
}

/// Stable sort by `order.column`. Incomparable pairs keep their order.
pub fn sort_rows(rows: &mut [Record], order: &Order) {
    rows.sort_by(|a, b| {
        let ord = compare_values(a.get(&order.column), b.get(&order.column));
        if order.ascending { ord } else { ord.reverse() }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rec(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn ids(rows: &[Record]) -> Vec<Value> {
        rows.iter().map(|r| r["id"].clone()).collect()
    }

    #[test]
    fn test_local_wins_on_collision() {
        let merged = merge_rows(
            vec![rec(json!({"id": "A", "value": 1}))],
            vec![rec(json!({"id": "A", "value": 2}))],
            "id",
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["value"], json!(2));
    }

    #[test]
    fn test_union_keeps_local_only_rows() {
        let merged = merge_rows(
            vec![rec(json!({"id": "A"}))],
            vec![rec(json!({"id": "A"})), rec(json!({"id": "B"}))],
            "id",
        );
        assert_eq!(ids(&merged), vec![json!("A"), json!("B")]);
    }

    #[test]
    fn test_remote_only_rows_survive() {
        let merged = merge_rows(
            vec![rec(json!({"id": "R"})), rec(json!({"id": "A", "v": 1}))],
            vec![rec(json!({"id": "A", "v": 2}))],
            "id",
        );
        assert_eq!(ids(&merged), vec![json!("R"), json!("A")]);
        assert_eq!(merged[1]["v"], json!(2));
    }

    #[test]
    fn test_unkeyed_rows_dedupe_only_exact_copies() {
        let merged = merge_rows(
            vec![rec(json!({"note": "x"}))],
            vec![rec(json!({"note": "x"})), rec(json!({"note": "y"}))],
            "id",
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_sort_rows_numeric() {
        let mut rows = vec![
            rec(json!({"id": "c", "n": 3})),
            rec(json!({"id": "a", "n": 1})),
            rec(json!({"id": "b", "n": 2})),
        ];
        sort_rows(&mut rows, &Order::asc("n"));
        assert_eq!(ids(&rows), vec![json!("a"), json!("b"), json!("c")]);

        sort_rows(&mut rows, &Order::desc("n"));
        assert_eq!(ids(&rows), vec![json!("c"), json!("b"), json!("a")]);
    }

    #[test]
    fn test_sort_rows_missing_field_is_stable() {
        let mut rows = vec![
            rec(json!({"id": "x"})),
            rec(json!({"id": "y"})),
        ];
        sort_rows(&mut rows, &Order::desc("created_at"));
        assert_eq!(ids(&rows), vec![json!("x"), json!("y")]);
    }

    #[test]
    fn test_sort_rows_with_missing_values_in_large_set() {
        // Large enough to go past the small-slice insertion sort.
        let mut rows: Vec<Record> = (0..200)
            .map(|i| {
                if i % 3 == 0 {
                    rec(json!({"id": i}))
                } else {
                    rec(json!({"id": i, "created_at": format!("2024-01-{:02}", i % 28 + 1)}))
                }
            })
            .collect();

        sort_rows(&mut rows, &Order::desc("created_at"));

        let missing = rows.iter().take_while(|r| !r.contains_key("created_at")).count();
        assert_eq!(missing, 67);
        let missing_ids: Vec<_> = rows[..missing].iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert!(missing_ids.windows(2).all(|w| w[0] < w[1]));

        let present: Vec<&str> = rows[missing..]
            .iter()
            .map(|r| r["created_at"].as_str().unwrap())
            .collect();
        assert_eq!(present.len(), 133);
        assert!(present.windows(2).all(|w| w[0] >= w[1]));

        sort_rows(&mut rows, &Order::asc("created_at"));
        assert!(rows[..133].iter().all(|r| r.contains_key("created_at")));
        assert!(rows[133..].iter().all(|r| !r.contains_key("created_at")));
    }

    #[test]
    fn test_filter_rows() {
        let rows = vec![
            rec(json!({"id": "1", "status": "pending"})),
            rec(json!({"id": "2", "status": "approved"})),
        ];
        let filter = Filter::eq("status", "pending");
        assert_eq!(ids(&filter_rows(rows.clone(), Some(&filter))), vec![json!("1")]);
        assert_eq!(filter_rows(rows, None).len(), 2);
    }
}
