//! Plain nested objects: every scalar or array leaf is a token.

use super::{child_path, leaf_token};
use crate::detect::SimpleCategory;
use crate::token::{Token, TokenType};
use serde_json::{Map, Value};

pub fn flatten(document: &Value, category: SimpleCategory) -> Vec<Token> {
    let mut tokens = Vec::new();
    if let Value::Object(root) = document {
        walk(root, &[], category, &mut tokens);
    }
    tokens
}

fn default_type(category: SimpleCategory) -> Option<TokenType> {
    match category {
        SimpleCategory::Color => Some(TokenType::Color),
        SimpleCategory::Spacing | SimpleCategory::Radius => Some(TokenType::Dimension),
        SimpleCategory::Shadow => Some(TokenType::Shadow),
        SimpleCategory::Typography | SimpleCategory::Unknown => None,
    }
}

fn walk(map: &Map<String, Value>, path: &[String], category: SimpleCategory, out: &mut Vec<Token>) {
    for (key, child) in map {
        let next = child_path(path, key);
        match child {
            Value::Object(entries) => walk(entries, &next, category, out),
            Value::Null => {}
            leaf => {
                let mut token = leaf_token(next, leaf, None, None);
                if token.token_type == TokenType::Unknown && token.reference.is_none() {
                    if let Some(token_type) = default_type(category) {
                        token.token_type = token_type;
                        token.regroup();
                    }
                }
                out.push(token);
            }
        }
    }
}
