//! Primitive / semantic classification.

use crate::config::ClassificationRules;
use crate::report::{Confidence, SemanticCandidate};
use crate::token::{Category, Token, TokenSet, TokenType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

fn numeric_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+$").expect("numeric suffix regex must compile"))
}

/// Which rule decided a token's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    PrimitivePattern,
    SemanticKeyword,
    NumericSuffix,
    DefaultSemantic,
    Reference,
    DimensionReference,
    Synthesized,
    Promoted,
}

impl ClassificationRule {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationRule::PrimitivePattern => "primitive_pattern",
            ClassificationRule::SemanticKeyword => "semantic_keyword",
            ClassificationRule::NumericSuffix => "numeric_suffix",
            ClassificationRule::DefaultSemantic => "default_semantic",
            ClassificationRule::Reference => "reference",
            ClassificationRule::DimensionReference => "dimension_reference",
            ClassificationRule::Synthesized => "synthesized",
            ClassificationRule::Promoted => "promoted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: Category,
    pub rule: ClassificationRule,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifyOutcome {
    /// Tokens per rule name.
    pub counts: BTreeMap<String, usize>,
    pub candidates: Vec<SemanticCandidate>,
}

/// Classify a bare name. First match wins:
/// primitive pattern, semantic keyword substring, trailing number, semantic.
pub fn classify(name: &str, rules: &ClassificationRules) -> Classification {
    let (category, rule) = if rules
        .primitive_patterns
        .iter()
        .any(|pattern| pattern.is_match(name))
    {
        (Category::Primitive, ClassificationRule::PrimitivePattern)
    } else if rules
        .semantic_keywords
        .iter()
        .any(|keyword| name.contains(keyword.as_str()))
    {
        (Category::Semantic, ClassificationRule::SemanticKeyword)
    } else if numeric_suffix_re().is_match(name) {
        (Category::Primitive, ClassificationRule::NumericSuffix)
    } else {
        (Category::Semantic, ClassificationRule::DefaultSemantic)
    };
    Classification { category, rule }
}

/// Classify a token in the context of the resolved set.
///
/// A resolved reference makes a token semantic, except a dimension pointing
/// at a dimension, which is a primitive alias.
pub fn classify_token(token: &Token, tokens: &TokenSet, rules: &ClassificationRules) -> Classification {
    if let Some(target) = token.reference_target.as_deref() {
        let target_is_dimension = tokens
            .get(target)
            .is_some_and(|target| target.token_type == TokenType::Dimension);
        if token.token_type == TokenType::Dimension && target_is_dimension {
            return Classification {
                category: Category::Primitive,
                rule: ClassificationRule::DimensionReference,
            };
        }
        return Classification {
            category: Category::Semantic,
            rule: ClassificationRule::Reference,
        };
    }
    classify(&token.name, rules)
}

/// Classify every token in place and collect fallback-rule suggestions.
pub fn classify_all(tokens: &mut TokenSet, rules: &ClassificationRules) -> ClassifyOutcome {
    let decisions: Vec<(String, Classification)> = tokens
        .iter()
        .map(|token| (token.name.clone(), classify_token(token, tokens, rules)))
        .collect();

    let referenced: BTreeSet<String> = tokens
        .iter()
        .filter_map(|token| token.reference.clone())
        .collect();

    let mut outcome = ClassifyOutcome::default();
    for (name, classification) in decisions {
        if let Some(token) = tokens.get_mut(&name) {
            token.category = classification.category;
            token.rule = Some(classification.rule);
        }
        *outcome
            .counts
            .entry(classification.rule.as_str().to_string())
            .or_default() += 1;

        let is_referenced = referenced.contains(&name);
        let suggestion = match (classification.rule, is_referenced) {
            (ClassificationRule::DefaultSemantic, false) => Some((
                Confidence::High,
                "no primitive pattern or semantic keyword matched and nothing references it",
            )),
            (ClassificationRule::DefaultSemantic, true) => Some((
                Confidence::Medium,
                "no rule matched but other tokens reference it, so it may be a primitive",
            )),
            (ClassificationRule::NumericSuffix, false) => Some((
                Confidence::Low,
                "numeric suffix made it primitive but nothing references it",
            )),
            _ => None,
        };
        if let Some((confidence, reason)) = suggestion {
            outcome.candidates.push(SemanticCandidate {
                name,
                category: classification.category,
                confidence,
                rule: classification.rule,
                reason: reason.to_string(),
            });
        }
    }

    tracing::debug!(
        primitives = tokens.primitives().count(),
        semantics = tokens.semantics().count(),
        candidates = outcome.candidates.len(),
        "classified tokens"
    );
    outcome
}
