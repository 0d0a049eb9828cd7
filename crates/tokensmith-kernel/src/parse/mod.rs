//! Shape parsers, one per [`Format`](crate::detect::Format).
//!
//! Every parser is a pure function of one document. Recursion stops at the
//! first node carrying the format's value marker; otherwise it descends and
//! accumulates path segments. Leaves are turned into tokens by [`leaf_token`]
//! so naming, annotation and reference rules are identical across shapes.

pub mod simple;
pub mod style_dictionary;
pub mod tokens_studio;
pub mod w3c;

use crate::naming::{parse_reference, strip_annotations};
use crate::token::{Token, TokenMetadata, TokenType};
use serde_json::Value;

/// Build one token from a leaf.
///
/// `type_label` is the tool's own type string, if any. Literal values with
/// no usable label infer their type from shape; references stay untyped
/// until resolution supplies the terminal type.
pub(crate) fn leaf_token(
    raw_path: Vec<String>,
    value: &Value,
    type_label: Option<&str>,
    description: Option<String>,
) -> Token {
    let mut metadata = TokenMetadata {
        description: description.filter(|text| !text.trim().is_empty()),
        type_label: type_label.map(str::to_string),
        ..TokenMetadata::default()
    };
    for segment in &raw_path {
        let annotated = strip_annotations(segment);
        metadata.is_legacy |= annotated.legacy;
        metadata.designer_notes.extend(annotated.notes);
    }

    let reference = parse_reference(value);
    let mut token_type = type_label.map_or(TokenType::Unknown, TokenType::from_label);
    if token_type == TokenType::Unknown && reference.is_none() {
        token_type = TokenType::infer(value);
    }

    Token::new(raw_path, token_type, value.clone(), reference, metadata)
}

pub(crate) fn child_path(path: &[String], key: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(key.to_string());
    next
}

fn string_field<'a>(map: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn leaf_collects_notes_and_legacy_flag() {
        let token = leaf_token(
            path(&["Colors", "Primary (legacy)", "500"]),
            &json!("#336699"),
            None,
            None,
        );
        assert_eq!(token.name, "colors-primary-500");
        assert!(token.metadata.is_legacy);
        assert_eq!(token.metadata.designer_notes, vec!["legacy"]);
        assert_eq!(token.token_type, TokenType::Color);
    }

    #[test]
    fn leaf_records_reference_without_guessing_type() {
        let token = leaf_token(path(&["text", "primary"]), &json!("{colors.black}"), None, None);
        assert_eq!(token.reference.as_deref(), Some("colors-black"));
        assert_eq!(token.token_type, TokenType::Unknown);
    }

    #[test]
    fn declared_label_wins_over_inference() {
        let token = leaf_token(path(&["space", "sm"]), &json!(4), Some("spacing"), None);
        assert_eq!(token.token_type, TokenType::Dimension);
        assert_eq!(token.metadata.type_label.as_deref(), Some("spacing"));
    }

    #[test]
    fn blank_descriptions_are_dropped() {
        let token = leaf_token(path(&["a"]), &json!("#fff"), None, Some("  ".to_string()));
        assert!(token.metadata.description.is_none());
    }
}
