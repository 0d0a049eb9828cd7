//! The token model shared by every stage.

use crate::classify::ClassificationRule;
use crate::naming;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Color,
    Dimension,
    FontFamily,
    FontWeight,
    Duration,
    Shadow,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Primitive,
    #[default]
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenGroup {
    Colors,
    Spacing,
    Typography,
    Radius,
    Shadows,
    Other,
}

fn hex_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
            .expect("hex color regex must compile")
    })
}

fn dimension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?\d*\.?\d+(?:px|rem|em|%|vh|vw|pt|dp|sp)$")
            .expect("dimension regex must compile")
    })
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d*\.?\d+m?s$").expect("duration regex must compile"))
}

/// Whether `value` is a hex literal such as `#fff` or `#fba466`.
pub fn is_hex_color(value: &str) -> bool {
    hex_color_re().is_match(value.trim())
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Color => "color",
            TokenType::Dimension => "dimension",
            TokenType::FontFamily => "fontFamily",
            TokenType::FontWeight => "fontWeight",
            TokenType::Duration => "duration",
            TokenType::Shadow => "shadow",
            TokenType::Unknown => "unknown",
        }
    }

    /// Map a tool-specific type label onto the model.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "color" | "colour" => TokenType::Color,
            "dimension" | "spacing" | "sizing" | "size" | "borderradius" | "radius"
            | "borderwidth" | "fontsize" | "fontsizes" | "lineheight" | "lineheights"
            | "letterspacing" | "paragraphspacing" => TokenType::Dimension,
            "fontfamily" | "fontfamilies" => TokenType::FontFamily,
            "fontweight" | "fontweights" => TokenType::FontWeight,
            "duration" | "time" => TokenType::Duration,
            "shadow" | "boxshadow" => TokenType::Shadow,
            _ => TokenType::Unknown,
        }
    }

    /// Guess a type from the shape of a literal value.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::String(text) => {
                let text = text.trim();
                let lowered = text.to_ascii_lowercase();
                if is_hex_color(text)
                    || lowered.starts_with("rgb(")
                    || lowered.starts_with("rgba(")
                    || lowered.starts_with("hsl(")
                    || lowered.starts_with("hsla(")
                {
                    TokenType::Color
                } else if dimension_re().is_match(&lowered) {
                    TokenType::Dimension
                } else if duration_re().is_match(&lowered) {
                    TokenType::Duration
                } else {
                    TokenType::Unknown
                }
            }
            Value::Object(map) if is_shadow_object(map) => TokenType::Shadow,
            Value::Array(items)
                if !items.is_empty()
                    && items
                        .iter()
                        .all(|item| item.as_object().is_some_and(is_shadow_object)) =>
            {
                TokenType::Shadow
            }
            _ => TokenType::Unknown,
        }
    }
}

fn is_shadow_object(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("color")
        && (map.contains_key("offsetX") || map.contains_key("x") || map.contains_key("blur"))
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Primitive => "primitive",
            Category::Semantic => "semantic",
        }
    }
}

impl TokenGroup {
    /// Emission order.
    pub const ALL: [TokenGroup; 6] = [
        TokenGroup::Colors,
        TokenGroup::Spacing,
        TokenGroup::Typography,
        TokenGroup::Radius,
        TokenGroup::Shadows,
        TokenGroup::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenGroup::Colors => "colors",
            TokenGroup::Spacing => "spacing",
            TokenGroup::Typography => "typography",
            TokenGroup::Radius => "radius",
            TokenGroup::Shadows => "shadows",
            TokenGroup::Other => "other",
        }
    }

    /// Derive the group from the token type, then the original type label,
    /// then keywords in the name.
    pub fn derive(token_type: TokenType, type_label: Option<&str>, name: &str) -> Self {
        let segments: Vec<&str> = name.split('-').collect();
        let has = |words: &[&str]| segments.iter().any(|segment| words.contains(segment));
        match token_type {
            TokenType::Color => return TokenGroup::Colors,
            TokenType::Shadow => return TokenGroup::Shadows,
            TokenType::FontFamily | TokenType::FontWeight => return TokenGroup::Typography,
            TokenType::Dimension => {
                if has(&["radius", "radii", "rounded", "corner"]) {
                    return TokenGroup::Radius;
                }
                if has(&["font", "line", "letter", "typography", "leading", "tracking"]) {
                    return TokenGroup::Typography;
                }
                return TokenGroup::Spacing;
            }
            TokenType::Duration | TokenType::Unknown => {}
        }

        if let Some(label) = type_label {
            let label = label.to_ascii_lowercase();
            if label.contains("typography") || label.contains("font") {
                return TokenGroup::Typography;
            }
            if label.contains("shadow") {
                return TokenGroup::Shadows;
            }
        }

        if token_type == TokenType::Duration {
            return TokenGroup::Other;
        }
        if has(&["color", "colors", "colour", "palette"]) {
            TokenGroup::Colors
        } else if has(&["radius", "radii", "rounded"]) {
            TokenGroup::Radius
        } else if has(&["spacing", "space", "gap", "padding", "margin", "size", "sizing"]) {
            TokenGroup::Spacing
        } else if has(&["font", "typography", "heading", "body", "line", "letter"]) {
            TokenGroup::Typography
        } else if has(&["shadow", "shadows", "elevation"]) {
            TokenGroup::Shadows
        } else {
            TokenGroup::Other
        }
    }
}

/// Free-form data carried alongside a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_legacy: bool,
    /// Parenthetical annotations stripped from the original name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub designer_notes: Vec<String>,
    /// Type label exactly as written in the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Names visited while resolving the reference, terminal last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_chain: Vec<String>,
    #[serde(default)]
    pub synthesized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub name: String,
    pub raw_path: Vec<String>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub value: Value,
    /// The reference as parsed, in name form. Never rewritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The primitive (or terminal literal holder) this token resolves to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_target: Option<String>,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<ClassificationRule>,
    pub group: TokenGroup,
    pub metadata: TokenMetadata,
}

impl Token {
    pub fn new(
        raw_path: Vec<String>,
        token_type: TokenType,
        value: Value,
        reference: Option<String>,
        metadata: TokenMetadata,
    ) -> Self {
        let name = naming::build_name(&raw_path);
        let group = TokenGroup::derive(token_type, metadata.type_label.as_deref(), &name);
        Self {
            name,
            raw_path,
            token_type,
            value,
            reference,
            reference_target: None,
            category: Category::default(),
            rule: None,
            group,
            metadata,
        }
    }

    /// A literal primitive created by the pipeline itself.
    pub fn synthesized_primitive(family: &str, index: usize, value: Value) -> Self {
        let index = format!("{index:02}");
        let mut token = Self::new(
            vec![family.to_string(), index.clone()],
            TokenType::Color,
            value,
            None,
            TokenMetadata {
                synthesized: true,
                ..TokenMetadata::default()
            },
        );
        token.name = format!("{family}-{index}");
        token.category = Category::Primitive;
        token.rule = Some(ClassificationRule::Synthesized);
        token.group = TokenGroup::Colors;
        token
    }

    pub fn regroup(&mut self) {
        self.group =
            TokenGroup::derive(self.token_type, self.metadata.type_label.as_deref(), &self.name);
    }

    pub fn is_primitive(&self) -> bool {
        self.category == Category::Primitive
    }

    pub fn is_semantic(&self) -> bool {
        self.category == Category::Semantic
    }

    /// A reference was parsed but never resolved to a literal.
    pub fn is_unresolved(&self) -> bool {
        self.reference.is_some() && self.reference_target.is_none()
    }

    /// Literal string value, when the value is a plain string that is not a
    /// reference expression.
    pub fn literal_str(&self) -> Option<&str> {
        self.value
            .as_str()
            .filter(|text| !naming::is_reference_expression(text))
    }
}

/// Tokens keyed by name, in insertion order.
///
/// Inserting an existing name replaces the earlier token and moves the entry
/// to the end, so iteration order always reflects the surviving definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    tokens: IndexMap<String, Token>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with last-write-wins semantics; returns the replaced token.
    pub fn insert(&mut self, token: Token) -> Option<Token> {
        let previous = self.tokens.shift_remove(&token.name);
        self.tokens.insert(token.name.clone(), token);
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.tokens.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Token> {
        self.tokens.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tokens.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.tokens.values_mut()
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Token> {
        self.iter().filter(|token| token.is_primitive())
    }

    pub fn semantics(&self) -> impl Iterator<Item = &Token> {
        self.iter().filter(|token| token.is_semantic())
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into_values().collect()
    }
}
