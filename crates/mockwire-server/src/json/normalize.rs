//! Canonical JSON serialization and array normalization.

use serde_json::{Map, Number, Value};

/// Largest integer an f64 represents exactly (2^53).
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Serialize a JSON value in canonical form.
///
/// Object keys are written in lexicographic order regardless of how the
/// value stores them, output is compact, and floats with no fractional part
/// are written as integers so `1.0` and `1` compare equal.
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, member)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(member, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(n) => out.push_str(&canonical_number(n)),
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn canonical_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT_INT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Recursively sort every array by the canonical form of its elements.
///
/// Works bottom-up: nested arrays are sorted before the array containing
/// them, so the sort key of an outer element is already stable. The sort is
/// stable and object members keep their keys. Applying it twice yields the
/// same value as applying it once.
pub fn normalize_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, member)| (key, normalize_arrays(member)))
                .collect(),
        ),
        Value::Array(items) => {
            let mut keyed: Vec<(String, Value)> = items
                .into_iter()
                .map(normalize_arrays)
                .map(|item| (canonical_string(&item), item))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Array(keyed.into_iter().map(|(_, item)| item).collect())
        }
        scalar => scalar,
    }
}

/// Recursively rebuild every object with its keys in lexicographic order.
pub fn sort_object_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, member) in entries {
                sorted.insert(key, sort_object_keys(member));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_object_keys).collect()),
        scalar => scalar,
    }
}
