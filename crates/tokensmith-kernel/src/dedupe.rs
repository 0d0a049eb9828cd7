//! Name-keyed deduplication with last-write-wins semantics.

use crate::report::Finding;
use crate::token::{Token, TokenSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const WARNING_CLASS_DUPLICATE: &str = "dedupe.name.duplicate";
pub const WARNING_CLASS_LEGACY_COLLISION: &str = "dedupe.legacy.collision";
pub const WARNING_CLASS_TARGET_REBOUND: &str = "dedupe.target.rebound";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discarded_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kept_source: Option<String>,
    /// One side of the collision was a legacy token.
    pub legacy_collision: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DedupeOutcome {
    pub tokens: TokenSet,
    pub duplicates: Vec<DuplicateRecord>,
    pub findings: Vec<Finding>,
}

impl DedupeOutcome {
    pub fn discarded(&self) -> usize {
        self.duplicates.len()
    }
}

/// Key tokens by name. A later token replaces an earlier one of the same
/// name and takes its place at the end of the order.
pub fn dedupe(tokens: impl IntoIterator<Item = Token>) -> DedupeOutcome {
    let mut outcome = DedupeOutcome::default();
    for token in tokens {
        let kept_source = token.metadata.source_file.clone();
        let kept_legacy = token.metadata.is_legacy;
        let Some(discarded) = outcome.tokens.insert(token) else {
            continue;
        };

        let legacy_collision = kept_legacy || discarded.metadata.is_legacy;
        let record = DuplicateRecord {
            name: discarded.name.clone(),
            discarded_source: discarded.metadata.source_file.clone(),
            kept_source,
            legacy_collision,
        };
        let (class, message) = if legacy_collision {
            (
                WARNING_CLASS_LEGACY_COLLISION,
                format!(
                    "legacy and current definitions share a name; kept the one from {}",
                    source_label(&record.kept_source)
                ),
            )
        } else {
            (
                WARNING_CLASS_DUPLICATE,
                format!(
                    "duplicate name; definition from {} replaced by {}",
                    source_label(&record.discarded_source),
                    source_label(&record.kept_source)
                ),
            )
        };
        tracing::warn!(token = %record.name, class, "{message}");
        outcome
            .findings
            .push(Finding::new(record.name.clone(), class, message));
        outcome.duplicates.push(record);
    }
    tracing::debug!(
        kept = outcome.tokens.len(),
        discarded = outcome.discarded(),
        "deduplicated tokens"
    );
    outcome
}

/// Point tokens whose `reference_target` collided at the surviving
/// definition's value.
///
/// A semantic resolved against a definition that a later duplicate replaced
/// still carries the discarded value; without this it would no longer equal
/// its target and drop out of emission.
pub fn rebind_targets(tokens: &mut TokenSet, duplicates: &[DuplicateRecord]) -> Vec<Finding> {
    let collided: BTreeSet<&str> = duplicates.iter().map(|record| record.name.as_str()).collect();
    let updates: Vec<(String, String, Value)> = tokens
        .iter()
        .filter_map(|token| {
            let target = token.reference_target.as_deref()?;
            if !collided.contains(target) || token.name == target {
                return None;
            }
            let survivor = tokens.get(target)?;
            if survivor.is_unresolved() || survivor.value == token.value {
                return None;
            }
            Some((token.name.clone(), target.to_string(), survivor.value.clone()))
        })
        .collect();

    let mut findings = Vec::with_capacity(updates.len());
    for (name, target, value) in updates {
        let Some(token) = tokens.get_mut(&name) else {
            continue;
        };
        let message = format!(
            "reference target `{target}` was replaced by a duplicate; value {} now follows it as {}",
            token.value, value
        );
        tracing::warn!(token = %name, target = %target, "rebound to surviving duplicate");
        token.value = value;
        findings.push(Finding::new(name, WARNING_CLASS_TARGET_REBOUND, message));
    }
    findings
}

fn source_label(source: &Option<String>) -> &str {
    source.as_deref().unwrap_or("<unknown>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenMetadata, TokenType};
    use serde_json::{Value, json};

    fn token(path: &[&str], value: Value, source: &str, legacy: bool) -> Token {
        Token::new(
            path.iter().map(|s| s.to_string()).collect(),
            TokenType::Color,
            value,
            None,
            TokenMetadata {
                source_file: Some(source.to_string()),
                is_legacy: legacy,
                ..TokenMetadata::default()
            },
        )
    }

    #[test]
    fn last_write_wins_and_counts_discards() {
        let outcome = dedupe(vec![
            token(&["a"], json!("#000"), "one.json", false),
            token(&["b"], json!("#111"), "one.json", false),
            token(&["a"], json!("#222"), "two.json", false),
        ]);
        assert_eq!(outcome.discarded(), 1);
        assert_eq!(outcome.tokens.names(), vec!["b", "a"]);
        assert_eq!(outcome.tokens.get("a").map(|t| t.value.clone()), Some(json!("#222")));
        assert_eq!(outcome.findings[0].class, WARNING_CLASS_DUPLICATE);
        assert_eq!(outcome.duplicates[0].discarded_source.as_deref(), Some("one.json"));
        assert_eq!(outcome.duplicates[0].kept_source.as_deref(), Some("two.json"));
    }

    #[test]
    fn references_to_collided_names_follow_the_survivor() {
        let mut link = token(&["text", "link"], json!("#0000ff"), "c.json", false);
        link.reference_target = Some("blue-500".to_string());
        let outcome = dedupe(vec![
            token(&["blue", "500"], json!("#0000ff"), "a.json", false),
            token(&["blue", "500"], json!("#0000f0"), "b.json", false),
            link,
        ]);
        let mut tokens = outcome.tokens;
        let findings = rebind_targets(&mut tokens, &outcome.duplicates);

        assert_eq!(
            tokens.get("text-link").map(|t| t.value.clone()),
            Some(json!("#0000f0"))
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].token, "text-link");
        assert_eq!(findings[0].class, WARNING_CLASS_TARGET_REBOUND);
    }

    #[test]
    fn untouched_targets_are_left_alone() {
        let mut link = token(&["text", "link"], json!("#0000ff"), "c.json", false);
        link.reference_target = Some("blue-500".to_string());
        let outcome = dedupe(vec![
            token(&["blue", "500"], json!("#0000ff"), "a.json", false),
            token(&["gray", "100"], json!("#eeeeee"), "a.json", false),
            token(&["gray", "100"], json!("#f0f0f0"), "b.json", false),
            link,
        ]);
        let mut tokens = outcome.tokens;
        assert!(rebind_targets(&mut tokens, &outcome.duplicates).is_empty());
        assert_eq!(
            tokens.get("text-link").map(|t| t.value.clone()),
            Some(json!("#0000ff"))
        );
    }

    #[test]
    fn legacy_collisions_get_their_own_class() {
        let outcome = dedupe(vec![
            token(&["Primary (legacy)"], json!("#000"), "one.json", true),
            token(&["Primary"], json!("#111"), "one.json", false),
        ]);
        assert_eq!(outcome.tokens.len(), 1);
        assert!(outcome.duplicates[0].legacy_collision);
        assert_eq!(outcome.findings[0].class, WARNING_CLASS_LEGACY_COLLISION);
    }

    #[test]
    fn distinct_names_produce_no_findings() {
        let outcome = dedupe(vec![
            token(&["a"], json!("#000"), "one.json", false),
            token(&["b"], json!("#000"), "one.json", false),
        ]);
        assert_eq!(outcome.discarded(), 0);
        assert!(outcome.findings.is_empty());
    }
}
