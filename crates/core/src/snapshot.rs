//! Navigation of arbitrarily shaped metric snapshots.
//!
//! Producers wrap the interesting record under differing keys (`machine`,
//! `data`, `shift`, ...) and sometimes inside arrays. [`resolve_record`] digs
//! the first plain record out; [`lookup_alias`] then finds a field under any
//! of its historical names.

use serde_json::{Map, Value};

use crate::percent::parse_number;

/// Nesting keys probed in order when locating the record of a snapshot.
pub const NESTING_KEYS: &[&str] = &[
    "machine", "macchina", "data", "result", "results", "shift", "turno", "rows", "items",
];

/// Maximum depth followed through nesting keys.
pub const MAX_NESTING_DEPTH: usize = 8;

/// A JSON object record.
pub type Record = Map<String, Value>;

// ---------------------------------------------------------------------------
// Record resolution
// ---------------------------------------------------------------------------

/// Locate the plain record inside a snapshot using [`NESTING_KEYS`].
pub fn resolve_record(snapshot: &Value) -> Option<&Record> {
    resolve_record_with(snapshot, NESTING_KEYS)
}

/// Locate the plain record inside a snapshot, probing `nesting_keys` in order.
///
/// Sequences yield their first resolvable element. An object containing one
/// of the nesting keys is descended into depth-first; if that branch does
/// not resolve, the next key is tried, and an object with no resolvable
/// nested branch is itself the record.
pub fn resolve_record_with<'a>(snapshot: &'a Value, nesting_keys: &[&str]) -> Option<&'a Record> {
    resolve_at_depth(snapshot, nesting_keys, 0)
}

fn resolve_at_depth<'a>(
    value: &'a Value,
    nesting_keys: &[&str],
    depth: usize,
) -> Option<&'a Record> {
    if depth > MAX_NESTING_DEPTH {
        return None;
    }
    match value {
        Value::Array(items) => items
            .iter()
            .find_map(|item| resolve_at_depth(item, nesting_keys, depth + 1)),
        Value::Object(record) => {
            let nested = nesting_keys.iter().find_map(|key| {
                get_ignore_case(record, key)
                    .filter(|child| child.is_object() || child.is_array())
                    .and_then(|child| resolve_at_depth(child, nesting_keys, depth + 1))
            });
            Some(nested.unwrap_or(record))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Field lookup
// ---------------------------------------------------------------------------

/// Case-insensitive key lookup. An exact match wins over a case-folded one.
pub fn get_ignore_case<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    record.get(key).or_else(|| {
        record
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// The first alias present on `record` with a non-null value.
pub fn lookup_alias<'a>(record: &'a Record, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| get_ignore_case(record, alias).filter(|v| !v.is_null()))
}

/// The first non-null alias, parsed as a finite number.
pub fn lookup_number(record: &Record, aliases: &[&str]) -> Option<f64> {
    lookup_alias(record, aliases).and_then(parse_number)
}

/// The first non-null alias rendered as a non-empty trimmed string.
///
/// Numbers are rendered in their JSON form so numeric codes survive.
pub fn lookup_text(record: &Record, aliases: &[&str]) -> Option<String> {
    match lookup_alias(record, aliases)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
