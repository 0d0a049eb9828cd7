//! Artifact emission: one mapping file and one stylesheet per token group.

use crate::config::Prefixes;
use crate::error::PipelineError;
use crate::naming::contains_reference;
use crate::report::Finding;
use crate::token::{Token, TokenGroup, TokenSet, TokenType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt::Write as _;

pub const WARNING_CLASS_TOKEN_SKIPPED: &str = "emit.token.skipped";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primitive,
    Semantic,
    Component,
}

impl Tier {
    /// Semantic tokens whose first name segment is a component keyword are
    /// emitted on the component tier.
    pub fn of(token: &Token, component_keywords: &[String]) -> Self {
        if token.is_primitive() {
            return Tier::Primitive;
        }
        let first = token.name.split('-').next().unwrap_or_default();
        if component_keywords.iter().any(|keyword| keyword == first) {
            Tier::Component
        } else {
            Tier::Semantic
        }
    }

    pub fn prefix(self, prefixes: &Prefixes) -> &str {
        match self {
            Tier::Primitive => &prefixes.primitive,
            Tier::Semantic => &prefixes.semantic,
            Tier::Component => &prefixes.component,
        }
    }
}

/// A file to be written into the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitOutcome {
    pub artifacts: Vec<Artifact>,
    pub emitted: usize,
    /// Tokens left out because they are unresolved or not anchored.
    pub skipped: Vec<String>,
    /// One `emit.token.skipped` finding per skipped token.
    pub findings: Vec<Finding>,
}

/// `--prefix-name`, or `--name` when the prefix is empty.
pub fn custom_property(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        format!("--{name}")
    } else {
        format!("--{prefix}-{name}")
    }
}

fn is_emittable_primitive(token: &Token) -> bool {
    token.is_primitive()
        && !token.is_unresolved()
        && !token.value.is_null()
        && !contains_reference(&token.value)
}

fn primitive_target<'a>(token: &Token, tokens: &'a TokenSet) -> Option<&'a Token> {
    if !token.is_semantic() || token.is_unresolved() {
        return None;
    }
    let target = tokens.get(token.reference_target.as_deref()?)?;
    (is_emittable_primitive(target) && target.value == token.value).then_some(target)
}

fn skip_reason(token: &Token, tokens: &TokenSet) -> String {
    if token.is_unresolved() || contains_reference(&token.value) {
        return "value holds an unresolved reference".to_string();
    }
    if token.is_primitive() {
        return "primitive has no literal value".to_string();
    }
    let Some(target_name) = token.reference_target.as_deref() else {
        return "semantic holds a literal value with no primitive to point at".to_string();
    };
    match tokens.get(target_name) {
        None => format!("reference target `{target_name}` no longer exists"),
        Some(target) if !is_emittable_primitive(target) => {
            format!("reference target `{target_name}` is not an emittable primitive")
        }
        Some(_) => format!("value differs from reference target `{target_name}`"),
    }
}

/// Render every group that has tokens, in the fixed group order, with the
/// legacy variant after the current one.
pub fn emit(
    tokens: &TokenSet,
    prefixes: &Prefixes,
    component_keywords: &[String],
) -> Result<EmitOutcome, PipelineError> {
    let mut outcome = EmitOutcome::default();

    let mut primitives: Vec<&Token> = Vec::new();
    let mut semantics: Vec<(&Token, &Token)> = Vec::new();
    for token in tokens.iter() {
        if is_emittable_primitive(token) {
            primitives.push(token);
        } else if let Some(target) = primitive_target(token, tokens) {
            semantics.push((token, target));
        } else {
            let reason = skip_reason(token, tokens);
            tracing::warn!(token = %token.name, reason = %reason, "token not emitted");
            outcome
                .findings
                .push(Finding::new(&token.name, WARNING_CLASS_TOKEN_SKIPPED, reason));
            outcome.skipped.push(token.name.clone());
        }
    }

    for group in TokenGroup::ALL {
        for legacy in [false, true] {
            let group_primitives: Vec<&Token> = primitives
                .iter()
                .copied()
                .filter(|token| token.group == group && token.metadata.is_legacy == legacy)
                .collect();
            let group_semantics: Vec<(&Token, &Token)> = semantics
                .iter()
                .copied()
                .filter(|(token, _)| token.group == group && token.metadata.is_legacy == legacy)
                .collect();
            if group_primitives.is_empty() && group_semantics.is_empty() {
                continue;
            }

            let stem = if legacy {
                format!("{}.legacy", group.as_str())
            } else {
                group.as_str().to_string()
            };
            let mapping_name = format!("{stem}.tokens.json");
            outcome.artifacts.push(Artifact {
                contents: render_mapping(&mapping_name, &group_primitives, &group_semantics)?,
                file_name: mapping_name,
            });
            outcome.artifacts.push(Artifact {
                file_name: format!("{stem}.css"),
                contents: render_stylesheet(
                    &group_primitives,
                    &group_semantics,
                    prefixes,
                    component_keywords,
                ),
            });
            outcome.emitted += group_primitives.len() + group_semantics.len();
        }
    }

    tracing::debug!(
        artifacts = outcome.artifacts.len(),
        emitted = outcome.emitted,
        skipped = outcome.skipped.len(),
        "emitted artifacts"
    );
    Ok(outcome)
}

fn render_mapping(
    file_name: &str,
    primitives: &[&Token],
    semantics: &[(&Token, &Token)],
) -> Result<String, PipelineError> {
    let mut primitive_map = Map::new();
    for token in primitives {
        primitive_map.insert(token.name.clone(), token.value.clone());
    }
    let mut semantic_map = Map::new();
    for (token, target) in semantics {
        semantic_map.insert(token.name.clone(), Value::String(format!("{{{}}}", target.name)));
    }
    let mut root = Map::new();
    root.insert("primitive".to_string(), Value::Object(primitive_map));
    root.insert("semantic".to_string(), Value::Object(semantic_map));

    let mut rendered = serde_json::to_string_pretty(&Value::Object(root)).map_err(|source| {
        PipelineError::RenderArtifact {
            path: file_name.to_string(),
            source,
        }
    })?;
    rendered.push('\n');
    Ok(rendered)
}

fn render_stylesheet(
    primitives: &[&Token],
    semantics: &[(&Token, &Token)],
    prefixes: &Prefixes,
    component_keywords: &[String],
) -> String {
    let mut css = String::from(":root {\n");
    for token in primitives {
        let _ = writeln!(
            css,
            "  {}: {};",
            custom_property(&prefixes.primitive, &token.name),
            css_value(token.token_type, &token.value)
        );
    }
    for (token, target) in semantics {
        let tier = Tier::of(token, component_keywords);
        let _ = writeln!(
            css,
            "  {}: var({});",
            custom_property(tier.prefix(prefixes), &token.name),
            custom_property(&prefixes.primitive, &target.name)
        );
    }
    css.push_str("}\n");
    css
}

/// Render a literal value as CSS.
pub fn css_value(token_type: TokenType, value: &Value) -> String {
    match value {
        Value::String(text) => match (token_type, bare_number(text)) {
            (TokenType::Dimension | TokenType::Duration, Some(number)) => {
                css_value(token_type, &Value::Number(number))
            }
            _ => text.trim().to_string(),
        },
        Value::Number(number) => match token_type {
            TokenType::Dimension => length(value),
            TokenType::Duration => format!("{number}ms"),
            _ => number.to_string(),
        },
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .map(font_family_name)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) if !items.is_empty() && items.iter().all(is_shadow) => items
            .iter()
            .filter_map(Value::as_object)
            .map(shadow)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => items
            .iter()
            .map(|item| css_value(token_type, item))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) if is_shadow(value) => shadow(map),
        Value::Object(map) if map.contains_key("value") && map.contains_key("unit") => {
            format!(
                "{}{}",
                scalar(map.get("value")),
                scalar(map.get("unit"))
            )
        }
        Value::Object(map) if map.contains_key("fontFamily") && map.contains_key("fontSize") => {
            font_shorthand(map)
        }
        other => other.to_string(),
    }
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

/// Tokens Studio writes dimensions as unitless numeric strings (`"4"`).
fn bare_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Number::from(integer));
    }
    text.parse::<f64>()
        .ok()
        .filter(|float| float.is_finite())
        .and_then(Number::from_f64)
}

fn length(value: &Value) -> String {
    match value {
        Value::Number(number) if number.as_f64() == Some(0.0) => "0".to_string(),
        Value::Number(number) => format!("{number}px"),
        Value::String(text) => match bare_number(text) {
            Some(number) => length(&Value::Number(number)),
            None => text.trim().to_string(),
        },
        _ => "0".to_string(),
    }
}

fn font_family_name(name: &str) -> String {
    let name = name.trim();
    let quoted = name.starts_with('"') || name.starts_with('\'');
    if name.contains(' ') && !quoted {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

fn is_shadow(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        map.contains_key("color")
            && (map.contains_key("offsetX") || map.contains_key("x") || map.contains_key("blur"))
    })
}

fn shadow(map: &Map<String, Value>) -> String {
    let part = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| map.get(*key))
            .map_or_else(|| "0".to_string(), length)
    };
    let inset = map
        .get("inset")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        || map
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| kind == "innerShadow" || kind == "inset");
    let body = format!(
        "{} {} {} {} {}",
        part(&["offsetX", "x"]),
        part(&["offsetY", "y"]),
        part(&["blur"]),
        part(&["spread"]),
        scalar(map.get("color"))
    );
    if inset { format!("inset {body}") } else { body }
}

fn font_shorthand(map: &Map<String, Value>) -> String {
    let mut parts = Vec::new();
    for key in ["fontStyle", "fontWeight"] {
        let rendered = scalar(map.get(key));
        if !rendered.is_empty() {
            parts.push(rendered);
        }
    }
    let size = map.get("fontSize").map(length).unwrap_or_default();
    match map.get("lineHeight").map(|height| scalar(Some(height))) {
        Some(height) if !height.is_empty() => parts.push(format!("{size}/{height}")),
        _ => parts.push(size),
    }
    let family = match map.get("fontFamily") {
        Some(value @ Value::Array(_)) => css_value(TokenType::FontFamily, value),
        Some(Value::String(name)) => font_family_name(name),
        _ => String::new(),
    };
    parts.push(family);
    parts.join(" ")
}
