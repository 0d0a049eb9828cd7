//! Anchoring semantic literals to primitives.
//!
//! After this stage every semantic token that will be emitted points at a
//! primitive with an equal value:
//! - hardcoded semantic colors are matched to a close primitive, or grouped
//!   into a newly synthesized palette ([`synthesize_color_families`]);
//! - other semantic literals are anchored to an identical primitive of the
//!   same group, or promoted to primitives ([`anchor_semantic_literals`]).

use crate::classify::ClassificationRule;
use crate::report::Finding;
use crate::token::{Category, Token, TokenSet, TokenType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokensmith_color::{Rgb, family_name};

pub const WARNING_CLASS_COLOR_UNPARSEABLE: &str = "synth.color.unparseable";
pub const WARNING_CLASS_FAMILY_EXHAUSTED: &str = "synth.family.exhausted";
pub const WARNING_CLASS_LITERAL_PROMOTED: &str = "synth.semantic_literal.promoted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMappingKind {
    /// Mapped onto an existing primitive within the match threshold.
    Matched,
    /// Mapped onto a primitive created for this run.
    Synthesized,
    /// Could not be parsed; excluded from stylesheets.
    Unmapped,
}

/// Where one hardcoded semantic color ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorMapping {
    pub token: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<String>,
    pub kind: ColorMappingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthOutcome {
    pub mappings: Vec<ColorMapping>,
    /// Names of the primitives created, in creation order.
    pub created: Vec<String>,
    /// Family name per synthesized palette, in creation order.
    pub families: Vec<String>,
    pub findings: Vec<Finding>,
}

impl SynthOutcome {
    pub fn matched(&self) -> usize {
        self.mappings
            .iter()
            .filter(|mapping| mapping.kind == ColorMappingKind::Matched)
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorOutcome {
    pub anchored: usize,
    pub promoted: Vec<String>,
    pub repointed: usize,
    pub findings: Vec<Finding>,
}

fn is_hardcoded_color(token: &Token) -> bool {
    token.is_semantic()
        && token.token_type == TokenType::Color
        && token.reference.is_none()
        && token.reference_target.is_none()
        && token.literal_str().is_some()
}

fn parent_key(token: &Token) -> String {
    let parent = token.raw_path.len().saturating_sub(1);
    token.raw_path[..parent].join("/")
}

fn point_at(token: &mut Token, primitive: &str, value: Value) {
    token.reference_target = Some(primitive.to_string());
    token.metadata.reference_chain = vec![primitive.to_string()];
    token.value = value;
}

fn nearest<'a>(known: &'a [(String, Rgb)], color: &Rgb) -> Option<(&'a str, f64)> {
    known
        .iter()
        .filter(|(_, candidate)| candidate.a == color.a)
        .map(|(name, candidate)| (name.as_str(), candidate.distance(color)))
        .fold(None, |best, (name, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((name, distance)),
        })
}

/// Highest two-digit index already used under `family-`, if any.
fn highest_index(tokens: &TokenSet, family: &str) -> Option<usize> {
    let prefix = format!("{family}-");
    tokens
        .iter()
        .filter_map(|token| token.name.strip_prefix(&prefix))
        .filter_map(|suffix| suffix.parse::<usize>().ok())
        .max()
}

/// Map every hardcoded semantic color onto a primitive.
///
/// Groups are formed by parent path in declaration order. Within a group each
/// color first tries the nearest known primitive (RGB distance at most
/// `threshold`, equal alpha). The remaining colors become one new palette,
/// named after the family of the group's median color and indexed `00, 01,
/// …` from lightest to darkest. New primitives are match candidates for later
/// groups.
pub fn synthesize_color_families(tokens: &mut TokenSet, threshold: f64) -> SynthOutcome {
    let mut outcome = SynthOutcome::default();

    let mut known: Vec<(String, Rgb)> = tokens
        .primitives()
        .filter(|token| token.token_type == TokenType::Color)
        .filter_map(|token| {
            let color = Rgb::parse(token.literal_str()?).ok()?;
            Some((token.name.clone(), color))
        })
        .collect();

    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for token in tokens.iter().filter(|token| is_hardcoded_color(token)) {
        groups
            .entry(parent_key(token))
            .or_default()
            .push(token.name.clone());
    }

    for (group, members) in groups {
        let mut leftovers: Vec<(String, String, Rgb)> = Vec::new();

        for name in members {
            let Some(token) = tokens.get_mut(&name) else {
                continue;
            };
            let literal = token.literal_str().unwrap_or_default().to_string();
            let color = match Rgb::parse(&literal) {
                Ok(color) => color,
                Err(err) => {
                    tracing::warn!(token = %name, color = %literal, "unparseable color");
                    outcome.findings.push(Finding::new(
                        &name,
                        WARNING_CLASS_COLOR_UNPARSEABLE,
                        format!("cannot parse `{literal}` as a color: {err}"),
                    ));
                    outcome.mappings.push(ColorMapping {
                        token: name,
                        color: literal,
                        primitive: None,
                        kind: ColorMappingKind::Unmapped,
                        distance: None,
                    });
                    continue;
                }
            };

            match nearest(&known, &color) {
                Some((primitive, distance)) if distance <= threshold => {
                    let primitive = primitive.to_string();
                    let value = tokens
                        .get(&primitive)
                        .map(|target| target.value.clone())
                        .unwrap_or_else(|| Value::String(color.to_hex()));
                    if let Some(token) = tokens.get_mut(&name) {
                        point_at(token, &primitive, value);
                    }
                    outcome.mappings.push(ColorMapping {
                        token: name,
                        color: literal,
                        primitive: Some(primitive),
                        kind: ColorMappingKind::Matched,
                        distance: Some(distance),
                    });
                }
                _ => leftovers.push((name, literal, color)),
            }
        }

        if leftovers.is_empty() {
            continue;
        }

        let mut palette: Vec<(String, Rgb)> = Vec::new();
        for (_, _, color) in &leftovers {
            let hex = color.to_hex();
            if !palette.iter().any(|(existing, _)| *existing == hex) {
                palette.push((hex, *color));
            }
        }

        let median = palette[palette.len() / 2].1.to_hsl();
        let family = family_name(&median, |candidate| {
            let prefix = format!("{candidate}-");
            known
                .iter()
                .any(|(name, _)| name == candidate || name.starts_with(&prefix))
        });
        let start = highest_index(tokens, &family.name).map_or(0, |index| index + 1);
        if family.exhausted {
            let message = format!(
                "every {} family name is taken; extending `{}` from index {start:02}",
                family.family.as_str(),
                family.name
            );
            tracing::warn!(group = %group, family = %family.name, "family names exhausted");
            outcome.findings.push(Finding::new(
                &leftovers[0].0,
                WARNING_CLASS_FAMILY_EXHAUSTED,
                message,
            ));
        }

        palette.sort_by(|(_, a), (_, b)| b.to_hsl().l.total_cmp(&a.to_hsl().l));

        let mut created: Vec<(String, String)> = Vec::with_capacity(palette.len());
        for (offset, (hex, color)) in palette.into_iter().enumerate() {
            let primitive =
                Token::synthesized_primitive(&family.name, start + offset, Value::String(hex.clone()));
            let primitive_name = primitive.name.clone();
            tokens.insert(primitive);
            known.push((primitive_name.clone(), color));
            outcome.created.push(primitive_name.clone());
            created.push((hex, primitive_name));
        }

        for (name, literal, color) in leftovers {
            let hex = color.to_hex();
            let Some((_, primitive)) = created.iter().find(|(created_hex, _)| *created_hex == hex)
            else {
                continue;
            };
            if let Some(token) = tokens.get_mut(&name) {
                point_at(token, primitive, Value::String(hex));
            }
            outcome.mappings.push(ColorMapping {
                token: name,
                color: literal,
                primitive: Some(primitive.clone()),
                kind: ColorMappingKind::Synthesized,
                distance: Some(0.0),
            });
        }

        tracing::debug!(group = %group, family = %family.name, "synthesized palette");
        outcome.families.push(family.name);
    }

    tracing::debug!(
        mappings = outcome.mappings.len(),
        matched = outcome.matched(),
        created = outcome.created.len(),
        "synthesized color families"
    );
    outcome
}

/// Anchor remaining semantic literals and collapse semantic-to-semantic
/// pointers onto their primitives.
///
/// Runs after [`synthesize_color_families`]. A non-color semantic literal
/// points at the first primitive of its group with an identical value; with
/// no such primitive it is promoted to a primitive itself.
pub fn anchor_semantic_literals(tokens: &mut TokenSet) -> AnchorOutcome {
    let mut outcome = AnchorOutcome::default();

    let literal_semantics: Vec<String> = tokens
        .semantics()
        .filter(|token| {
            token.token_type != TokenType::Color
                && token.reference.is_none()
                && token.reference_target.is_none()
                && !token.value.is_null()
        })
        .map(|token| token.name.clone())
        .collect();

    for name in literal_semantics {
        let Some(token) = tokens.get(&name) else {
            continue;
        };
        let anchor = tokens
            .primitives()
            .find(|primitive| primitive.group == token.group && primitive.value == token.value)
            .map(|primitive| (primitive.name.clone(), primitive.value.clone()));

        let Some(token) = tokens.get_mut(&name) else {
            continue;
        };
        match anchor {
            Some((primitive, value)) => {
                point_at(token, &primitive, value);
                outcome.anchored += 1;
            }
            None => {
                token.category = Category::Primitive;
                token.rule = Some(ClassificationRule::Promoted);
                tracing::info!(token = %name, "promoted semantic literal to primitive");
                outcome.findings.push(Finding::new(
                    &name,
                    WARNING_CLASS_LITERAL_PROMOTED,
                    format!(
                        "semantic {} literal has no matching primitive; emitted as a primitive",
                        token.group.as_str()
                    ),
                ));
                outcome.promoted.push(name);
            }
        }
    }

    let limit = tokens.len();
    let pointers: Vec<(String, String)> = tokens
        .semantics()
        .filter_map(|token| Some((token.name.clone(), token.reference_target.clone()?)))
        .collect();
    for (name, target) in pointers {
        let mut current = target.clone();
        for _ in 0..limit {
            match tokens.get(&current) {
                Some(hop) if hop.is_semantic() && hop.name != name => {
                    match hop.reference_target.clone() {
                        Some(next) => current = next,
                        None => break,
                    }
                }
                _ => break,
            }
        }
        if current == target {
            continue;
        }
        let Some(value) = tokens
            .get(&current)
            .filter(|hop| hop.is_primitive())
            .map(|hop| hop.value.clone())
        else {
            continue;
        };
        if let Some(token) = tokens.get_mut(&name) {
            token.reference_target = Some(current.clone());
            token.metadata.reference_chain.push(current);
            token.value = value;
            outcome.repointed += 1;
        }
    }

    tracing::debug!(
        anchored = outcome.anchored,
        promoted = outcome.promoted.len(),
        repointed = outcome.repointed,
        "anchored semantic literals"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenGroup, TokenMetadata};
    use serde_json::json;

    fn literal(path: &[&str], token_type: TokenType, value: Value, category: Category) -> Token {
        let mut token = Token::new(
            path.iter().map(|s| s.to_string()).collect(),
            token_type,
            value,
            None,
            TokenMetadata::default(),
        );
        token.category = category;
        token
    }

    fn semantic_color(path: &[&str], hex: &str) -> Token {
        literal(path, TokenType::Color, json!(hex), Category::Semantic)
    }

    fn primitive_color(path: &[&str], hex: &str) -> Token {
        literal(path, TokenType::Color, json!(hex), Category::Primitive)
    }

    fn set(tokens: Vec<Token>) -> TokenSet {
        let mut set = TokenSet::new();
        for token in tokens {
            set.insert(token);
        }
        set
    }

    #[test]
    fn lone_orange_becomes_amber_palette() {
        let mut tokens = set(vec![semantic_color(&["Notification", "errorMain"], "#fba466")]);
        let outcome = synthesize_color_families(&mut tokens, 30.0);
        assert_eq!(outcome.families, vec!["amber"]);
        assert_eq!(outcome.created, vec!["amber-00"]);

        let semantic = tokens.get("notification-error-main").expect("semantic kept");
        assert_eq!(semantic.reference_target.as_deref(), Some("amber-00"));
        let primitive = tokens.get("amber-00").expect("primitive created");
        assert_eq!(primitive.value, semantic.value);
        assert!(primitive.is_primitive());
        assert_eq!(outcome.mappings[0].kind, ColorMappingKind::Synthesized);
    }

    #[test]
    fn close_colors_match_existing_primitives() {
        let mut tokens = set(vec![
            primitive_color(&["red", "500"], "#f44336"),
            semantic_color(&["alert", "danger"], "#f44436"),
        ]);
        let outcome = synthesize_color_families(&mut tokens, 30.0);
        assert!(outcome.created.is_empty());
        assert_eq!(outcome.matched(), 1);
        let semantic = tokens.get("alert-danger").expect("semantic kept");
        assert_eq!(semantic.reference_target.as_deref(), Some("red-500"));
        assert_eq!(semantic.value, json!("#f44336"));
    }

    #[test]
    fn palette_indices_run_light_to_dark() {
        let mut tokens = set(vec![
            semantic_color(&["brand", "dark"], "#1565c0"),
            semantic_color(&["brand", "light"], "#90caf9"),
            semantic_color(&["brand", "mid"], "#1e88e5"),
        ]);
        let outcome = synthesize_color_families(&mut tokens, 5.0);
        assert_eq!(outcome.families.len(), 1);
        let family = &outcome.families[0];
        let target = |name: &str| {
            tokens
                .get(name)
                .and_then(|token| token.reference_target.clone())
                .expect("mapped")
        };
        assert_eq!(target("brand-light"), format!("{family}-00"));
        assert_eq!(target("brand-mid"), format!("{family}-01"));
        assert_eq!(target("brand-dark"), format!("{family}-02"));
        assert_eq!(outcome.mappings.len(), 3);
    }

    #[test]
    fn taken_family_names_are_skipped_then_extended() {
        let mut tokens = set(vec![
            primitive_color(&["amber", "00"], "#000000"),
            primitive_color(&["apricot", "00"], "#000001"),
            primitive_color(&["sand", "03"], "#000002"),
            semantic_color(&["Notification", "errorMain"], "#fba466"),
        ]);
        let outcome = synthesize_color_families(&mut tokens, 30.0);
        assert_eq!(outcome.families, vec!["amber"]);
        assert_eq!(outcome.created, vec!["amber-01"]);
        assert_eq!(outcome.findings[0].class, WARNING_CLASS_FAMILY_EXHAUSTED);
    }

    #[test]
    fn unparseable_colors_are_reported_and_unmapped() {
        let mut tokens = set(vec![semantic_color(&["brand", "odd"], "#zzzzzz")]);
        let outcome = synthesize_color_families(&mut tokens, 30.0);
        assert_eq!(outcome.mappings[0].kind, ColorMappingKind::Unmapped);
        assert_eq!(outcome.findings[0].class, WARNING_CLASS_COLOR_UNPARSEABLE);
        assert!(tokens.get("brand-odd").is_some_and(|t| t.reference_target.is_none()));
    }

    #[test]
    fn every_hardcoded_color_gets_exactly_one_mapping() {
        let mut tokens = set(vec![
            primitive_color(&["gray", "100"], "#f5f5f5"),
            semantic_color(&["surface", "page"], "#f5f5f5"),
            semantic_color(&["surface", "card"], "#ffffff"),
            semantic_color(&["text", "accent"], "#7b1fa2"),
            semantic_color(&["text", "accent-strong"], "#7b1fa2"),
        ]);
        let outcome = synthesize_color_families(&mut tokens, 10.0);
        assert_eq!(outcome.mappings.len(), 4);
        for token in tokens.semantics() {
            let target = token.reference_target.as_deref().expect("mapped");
            let primitive = tokens.get(target).expect("target exists");
            assert!(primitive.is_primitive());
            assert_eq!(primitive.value, token.value);
        }
    }

    #[test]
    fn non_color_literals_anchor_or_promote() {
        let mut tokens = set(vec![
            literal(&["space", "4"], TokenType::Dimension, json!("16px"), Category::Primitive),
            literal(&["gap", "card"], TokenType::Dimension, json!("16px"), Category::Semantic),
            literal(&["gap", "hero"], TokenType::Dimension, json!("48px"), Category::Semantic),
        ]);
        let outcome = anchor_semantic_literals(&mut tokens);
        assert_eq!(outcome.anchored, 1);
        assert_eq!(outcome.promoted, vec!["gap-hero"]);
        let card = tokens.get("gap-card").expect("kept");
        assert_eq!(card.reference_target.as_deref(), Some("space-4"));
        assert_eq!(card.group, TokenGroup::Spacing);
        assert!(tokens.get("gap-hero").is_some_and(Token::is_primitive));
    }

    #[test]
    fn semantic_chains_collapse_onto_primitives() {
        let mut holder = semantic_color(&["brand", "main"], "#fba466");
        holder.reference_target = Some("amber-00".to_string());
        let mut alias = semantic_color(&["button", "bg"], "#fba466");
        alias.reference = Some("brand-main".to_string());
        alias.reference_target = Some("brand-main".to_string());
        let mut tokens = set(vec![
            Token::synthesized_primitive("amber", 0, json!("#fba466")),
            holder,
            alias,
        ]);
        let outcome = anchor_semantic_literals(&mut tokens);
        assert_eq!(outcome.repointed, 1);
        assert_eq!(
            tokens.get("button-bg").and_then(|t| t.reference_target.clone()),
            Some("amber-00".to_string())
        );
    }
}
