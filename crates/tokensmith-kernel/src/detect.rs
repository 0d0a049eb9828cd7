//! Format detection for token export documents.
//!
//! Detection never fails: anything unrecognized degrades to [`Format::Unknown`],
//! which is flattened with the simple parser as a best effort.

use crate::naming::is_reference_expression;
use crate::parse;
use crate::token::{Token, is_hex_color};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of export shapes the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    W3c,
    TokensStudio,
    StyleDictionary,
    Simple,
    Unknown,
}

/// Category guessed for simple (marker-free) documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleCategory {
    Color,
    Spacing,
    Typography,
    Radius,
    Shadow,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub format: Format,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SimpleCategory>,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::W3c => "w3c",
            Format::TokensStudio => "tokens-studio",
            Format::StyleDictionary => "style-dictionary",
            Format::Simple => "simple",
            Format::Unknown => "unknown",
        }
    }

    /// Flatten `document` with this format's parser.
    pub fn flatten(self, document: &Value, category: SimpleCategory) -> Vec<Token> {
        match self {
            Format::W3c => parse::w3c::flatten(document),
            Format::TokensStudio => parse::tokens_studio::flatten(document),
            Format::StyleDictionary => parse::style_dictionary::flatten(document),
            Format::Simple | Format::Unknown => parse::simple::flatten(document, category),
        }
    }
}

impl SimpleCategory {
    const KEYWORDS: [(SimpleCategory, &'static [&'static str]); 5] = [
        (SimpleCategory::Color, &["color", "colors", "colour", "colours", "palette"]),
        (SimpleCategory::Spacing, &["spacing", "space", "spaces", "size", "sizes", "sizing"]),
        (SimpleCategory::Typography, &["typography", "font", "fonts", "type", "text"]),
        (SimpleCategory::Radius, &["radius", "radii", "corner", "corners", "rounded"]),
        (SimpleCategory::Shadow, &["shadow", "shadows", "elevation"]),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimpleCategory::Color => "color",
            SimpleCategory::Spacing => "spacing",
            SimpleCategory::Typography => "typography",
            SimpleCategory::Radius => "radius",
            SimpleCategory::Shadow => "shadow",
            SimpleCategory::Unknown => "unknown",
        }
    }

    fn from_words(text: &str) -> Option<Self> {
        let lowered = crate::naming::kebab(text);
        let words: Vec<&str> = lowered.split('-').collect();
        Self::KEYWORDS
            .iter()
            .find(|(_, keywords)| words.iter().any(|word| keywords.contains(word)))
            .map(|(category, _)| *category)
    }

    fn from_value(value: &Value) -> Option<Self> {
        let text = value.as_str()?.trim().to_ascii_lowercase();
        if is_hex_color(&text) || text.starts_with("rgba(") || text.starts_with("rgb(") {
            Some(SimpleCategory::Color)
        } else if text.ends_with("px") {
            Some(SimpleCategory::Spacing)
        } else {
            None
        }
    }
}

/// Guess the export shape of one parsed document.
pub fn detect_format(document: &Value, file_name: &str) -> Detection {
    let Value::Object(root) = document else {
        return Detection {
            format: Format::Unknown,
            confidence: 0.1,
            category: None,
        };
    };

    if any_key(root, &|key| key.starts_with("$type") || key.starts_with("$value")) {
        return detection(Format::W3c, 0.95);
    }
    if any_string(document, &is_reference_expression) {
        return detection(Format::W3c, 0.75);
    }
    if has_nested_typed_leaf(root) {
        return detection(Format::TokensStudio, 0.9);
    }
    if root
        .values()
        .filter_map(Value::as_object)
        .any(|entry| entry.contains_key("value") && entry.contains_key("type"))
    {
        return detection(Format::StyleDictionary, 0.85);
    }
    if any_object(root, &|map| map.contains_key("value") && !map.contains_key("type")) {
        return detection(Format::StyleDictionary, 0.7);
    }

    match first_scalar(document) {
        Some(first) => {
            let category = infer_category(root, file_name, first);
            let confidence = if category == SimpleCategory::Unknown { 0.6 } else { 0.7 };
            Detection {
                format: Format::Simple,
                confidence,
                category: Some(category),
            }
        }
        None => Detection {
            format: Format::Unknown,
            confidence: 0.1,
            category: Some(SimpleCategory::Unknown),
        },
    }
}

fn detection(format: Format, confidence: f64) -> Detection {
    Detection {
        format,
        confidence,
        category: None,
    }
}

fn infer_category(root: &Map<String, Value>, file_name: &str, first: &Value) -> SimpleCategory {
    let stem = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim_end_matches(".json");
    SimpleCategory::from_words(stem)
        .or_else(|| root.keys().next().and_then(|key| SimpleCategory::from_words(key)))
        .or_else(|| SimpleCategory::from_value(first))
        .unwrap_or(SimpleCategory::Unknown)
}

fn any_key(map: &Map<String, Value>, predicate: &dyn Fn(&str) -> bool) -> bool {
    map.iter().any(|(key, value)| {
        predicate(key) || value.as_object().is_some_and(|child| any_key(child, predicate))
    })
}

fn any_object(map: &Map<String, Value>, predicate: &dyn Fn(&Map<String, Value>) -> bool) -> bool {
    map.values()
        .filter_map(Value::as_object)
        .any(|child| predicate(child) || any_object(child, predicate))
}

fn any_string(value: &Value, predicate: &dyn Fn(&str) -> bool) -> bool {
    match value {
        Value::String(text) => predicate(text),
        Value::Array(items) => items.iter().any(|item| any_string(item, predicate)),
        Value::Object(map) => map.values().any(|item| any_string(item, predicate)),
        _ => false,
    }
}

/// An object at depth two or more exposing both `type` and a value marker.
fn has_nested_typed_leaf(root: &Map<String, Value>) -> bool {
    root.iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .filter_map(|(_, value)| value.as_object())
        .any(|entry| {
            any_object(entry, &|map| {
                map.contains_key("type")
                    && (map.contains_key("value") || map.contains_key("$value"))
            })
        })
}

fn first_scalar(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => map.values().find_map(first_scalar),
        Value::Array(_) | Value::Null => None,
        scalar => Some(scalar),
    }
}
