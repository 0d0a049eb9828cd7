//! Tokens Studio exports: `value`/`$value` leaves with tool-specific type
//! labels, optionally split into named sets ordered by
//! `$metadata.tokenSetOrder`.

use super::{child_path, leaf_token, string_field};
use crate::token::Token;
use serde_json::{Map, Value};

pub fn flatten(document: &Value) -> Vec<Token> {
    let mut tokens = Vec::new();
    let Value::Object(root) = document else {
        return tokens;
    };

    let set_order: Vec<&str> = root
        .get("$metadata")
        .and_then(|meta| meta.get("tokenSetOrder"))
        .and_then(Value::as_array)
        .map(|sets| sets.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if set_order.is_empty() {
        walk(root, &[], &mut tokens);
        return tokens;
    }

    for set in &set_order {
        if let Some(Value::Object(entries)) = root.get(*set) {
            walk(entries, &[], &mut tokens);
        }
    }
    // Sets present in the file but missing from the order follow in file order.
    for (key, value) in root {
        if key.starts_with('$') || set_order.contains(&key.as_str()) {
            continue;
        }
        if let Value::Object(entries) = value {
            walk(entries, &[], &mut tokens);
        }
    }
    tokens
}

fn leaf_value(map: &Map<String, Value>) -> Option<&Value> {
    map.get("$value").or_else(|| map.get("value"))
}

fn walk(map: &Map<String, Value>, path: &[String], out: &mut Vec<Token>) {
    for (key, child) in map {
        if key.starts_with('$') {
            continue;
        }
        let Value::Object(entry) = child else {
            continue;
        };
        let next = child_path(path, key);
        match leaf_value(entry) {
            Some(value) => {
                let label = string_field(entry, "$type").or_else(|| string_field(entry, "type"));
                let description = string_field(entry, "$description")
                    .or_else(|| string_field(entry, "description"))
                    .map(str::to_string);
                out.push(leaf_token(next, value, label, description));
            }
            None => walk(entry, &next, out),
        }
    }
}
