//! Data model for the hybrid store.
//!
//! - Record (schema-less row) and Rows (one or many)
//! - Filter / Order query vocabulary
//! - Content hashing for structural keys

pub mod hash;
pub mod record;

pub use hash::content_hash;
pub use record::{
    DEFAULT_ID_FIELD, Filter, Order, Record, Rows, compare_values, key_value, new_record_id,
    parse_columns, project_columns, record_key, shallow_merge,
};
