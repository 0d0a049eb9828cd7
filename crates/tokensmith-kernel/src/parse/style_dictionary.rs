//! Style Dictionary source trees: `value` leaves, type from `type` or
//! `attributes.category`, `comment` as description.

use super::{child_path, leaf_token, string_field};
use crate::token::Token;
use serde_json::{Map, Value};

pub fn flatten(document: &Value) -> Vec<Token> {
    let mut tokens = Vec::new();
    if let Value::Object(root) = document {
        walk(root, &[], &mut tokens);
    }
    tokens
}

fn walk(map: &Map<String, Value>, path: &[String], out: &mut Vec<Token>) {
    for (key, child) in map {
        let Value::Object(entry) = child else {
            continue;
        };
        let next = child_path(path, key);
        match entry.get("value") {
            Some(value) => {
                let label = string_field(entry, "type").or_else(|| {
                    entry
                        .get("attributes")
                        .and_then(|attributes| attributes.get("category"))
                        .and_then(Value::as_str)
                });
                let description = string_field(entry, "comment")
                    .or_else(|| string_field(entry, "description"))
                    .map(str::to_string);
                out.push(leaf_token(next, value, label, description));
            }
            None => walk(entry, &next, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;
    use serde_json::json;

    #[test]
    fn reads_type_from_attributes_and_comment() {
        let doc = json!({
            "size": {
                "padding": {
                    "small": {"value": "4px", "attributes": {"category": "size"}, "comment": "tight"}
                }
            },
            "primary": {"value": "{color.base.red.value}", "type": "color"}
        });
        let tokens = flatten(&doc);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "size-padding-small");
        assert_eq!(tokens[0].token_type, TokenType::Dimension);
        assert_eq!(tokens[0].metadata.description.as_deref(), Some("tight"));
        assert_eq!(tokens[1].reference.as_deref(), Some("color-base-red"));
        assert_eq!(tokens[1].token_type, TokenType::Color);
    }
}
