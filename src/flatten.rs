//! Flattening of nested configuration tables.

use std::collections::BTreeMap;

use toml::Value;
use toml::value::Table;

/// Flatten nested tables into a single map whose keys are the paths of the
/// leaves, joined with `sep`.
///
/// Non-table values are carried through unchanged; a nested empty table
/// contributes nothing. Arrays are leaves, their elements are not descended
/// into.
pub fn flatten_table(table: &Table, sep: &str) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    flatten_into(table, "", sep, &mut flat);
    flat
}

fn flatten_into(table: &Table, prefix: &str, sep: &str, out: &mut BTreeMap<String, Value>) {
    for (key, value) in table {
        let path = if prefix.is_empty() { key.clone() }
                   else                 { format!("{prefix}{sep}{key}") };
        match value {
            Value::Table(inner) => flatten_into(inner, &path, sep, out),
            leaf => { out.insert(path, leaf.clone()); }
        }
    }
}
