//! W3C design-tokens community group shape: `$value` leaves, `$type`
//! inherited from enclosing groups.
//!
//! Documents detected through reference strings alone are often older
//! exports with bare `value`/`type` keys, so those are accepted as fallbacks.

use super::{child_path, leaf_token, string_field};
use crate::token::Token;
use serde_json::{Map, Value};

pub fn flatten(document: &Value) -> Vec<Token> {
    let mut tokens = Vec::new();
    if let Value::Object(root) = document {
        walk(root, &[], None, &mut tokens);
    }
    tokens
}

/// Any node carrying a value marker is a token, whatever shape the value
/// has; composite shadow and typography objects stay whole.
fn is_leaf(map: &Map<String, Value>) -> bool {
    map.contains_key("$value") || map.contains_key("value")
}

fn walk(map: &Map<String, Value>, path: &[String], inherited: Option<&str>, out: &mut Vec<Token>) {
    let group_type = string_field(map, "$type").or(inherited);
    for (key, child) in map {
        if key.starts_with('$') {
            continue;
        }
        let next = child_path(path, key);
        match child {
            Value::Object(entry) if is_leaf(entry) => {
                let value = entry.get("$value").or_else(|| entry.get("value"));
                let Some(value) = value else { continue };
                let declared = string_field(entry, "$type")
                    .or_else(|| string_field(entry, "type"))
                    .or(group_type);
                let description = ["$description", "description", "comment"]
                    .into_iter()
                    .find_map(|key| string_field(entry, key))
                    .map(str::to_string);
                out.push(leaf_token(next, value, declared, description));
            }
            Value::Object(entry) => walk(entry, &next, group_type, out),
            Value::Null => {}
            // bare reference strings in reference-only documents
            scalar => out.push(leaf_token(next, scalar, group_type, None)),
        }
    }
}
