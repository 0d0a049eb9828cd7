//! Output-name normalization with rename propagation.

use crate::config::NamingRules;
use crate::naming::{clean_name, reorder_semantic_name};
use crate::token::{Token, TokenSet};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    /// Tokens under their new names, in the original order. Names may now
    /// collide; the caller deduplicates.
    pub tokens: Vec<Token>,
    /// Old name to new name, for every token whose name changed.
    pub renames: IndexMap<String, String>,
}

/// Rewrite every token name into its output form.
///
/// Semantic names are additionally reordered when `rules` ask for it.
/// `reference_target` and reference chains follow the renames so pointers
/// stay valid.
pub fn normalize_names(tokens: TokenSet, rules: &NamingRules) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    let mut renamed = Vec::with_capacity(tokens.len());

    for mut token in tokens.into_tokens() {
        let mut name = clean_name(&token.raw_path, &rules.wrapper_labels);
        if name.is_empty() {
            name = token.name.clone();
        }
        if token.is_semantic() && rules.reorder_semantic_names {
            name = reorder_semantic_name(&name, &rules.category_keywords);
        }
        if name != token.name {
            outcome.renames.insert(token.name.clone(), name.clone());
            token.name = name;
            token.regroup();
        }
        renamed.push(token);
    }

    for token in &mut renamed {
        if let Some(target) = token.reference_target.as_mut() {
            if let Some(new_name) = outcome.renames.get(target.as_str()) {
                *target = new_name.clone();
            }
        }
        for hop in &mut token.metadata.reference_chain {
            if let Some(new_name) = outcome.renames.get(hop.as_str()) {
                *hop = new_name.clone();
            }
        }
    }

    tracing::debug!(renamed = outcome.renames.len(), "normalized names");
    outcome.tokens = renamed;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Category, TokenMetadata, TokenType};
    use serde_json::json;

    fn token(path: &[&str], category: Category, target: Option<&str>) -> Token {
        let mut token = Token::new(
            path.iter().map(|s| s.to_string()).collect(),
            TokenType::Color,
            json!("#5d4037"),
            target.map(str::to_string),
            TokenMetadata::default(),
        );
        token.category = category;
        token.reference_target = target.map(str::to_string);
        if let Some(target) = target {
            token.metadata.reference_chain = vec![target.to_string()];
        }
        token
    }

    #[test]
    fn cleans_primitives_and_reorders_semantics() {
        let mut set = TokenSet::new();
        set.insert(token(&["Secondary-Brown-brown00"], Category::Primitive, None));
        set.insert(token(
            &["primaryBlackText"],
            Category::Semantic,
            Some("secondary-brown-brown-00"),
        ));

        let outcome = normalize_names(set, &NamingRules::defaults());
        let names: Vec<&str> = outcome.tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["brown-00", "text-primary-black"]);

        let semantic = &outcome.tokens[1];
        assert_eq!(semantic.reference_target.as_deref(), Some("brown-00"));
        assert_eq!(semantic.metadata.reference_chain, vec!["brown-00"]);
        assert_eq!(
            outcome.renames.get("secondary-brown-brown-00").map(String::as_str),
            Some("brown-00")
        );
    }

    #[test]
    fn reordering_is_config_gated() {
        let mut rules = NamingRules::defaults();
        rules.reorder_semantic_names = false;
        let mut set = TokenSet::new();
        set.insert(token(&["primary-black-text"], Category::Semantic, None));
        let outcome = normalize_names(set, &rules);
        assert_eq!(outcome.tokens[0].name, "primary-black-text");
        assert!(outcome.renames.is_empty());
    }

    #[test]
    fn primitives_are_never_reordered() {
        let mut set = TokenSet::new();
        set.insert(token(&["gray-text-100"], Category::Primitive, None));
        let outcome = normalize_names(set, &NamingRules::defaults());
        assert_eq!(outcome.tokens[0].name, "gray-text-100");
    }
}
