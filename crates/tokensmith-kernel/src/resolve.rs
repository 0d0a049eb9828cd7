//! Reference resolution over the merged token set.
//!
//! Chains are followed through each token's parsed `reference`, which is
//! never rewritten, so running the resolver again over its own output is a
//! no-op.
//!
//! Tokens Studio references are relative to the token set they live in, so a
//! name that is not found as written is retried under the top-level key of
//! the token that refers to it (`{colors.black}` inside set `global` finds
//! `global-colors-black`).

use crate::naming::{build_name, parse_reference};
use crate::report::Finding;
use crate::token::{Token, TokenSet, TokenType};
use serde_json::Value;

pub const WARNING_CLASS_REFERENCE_MISSING: &str = "resolve.reference.missing";
pub const WARNING_CLASS_REFERENCE_CIRCULAR: &str = "resolve.reference.circular";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    pub resolved: usize,
    pub missing: Vec<String>,
    pub circular: Vec<String>,
    pub findings: Vec<Finding>,
}

enum Walk {
    Resolved {
        chain: Vec<String>,
        value: Value,
        token_type: TokenType,
    },
    Missing {
        chain: Vec<String>,
    },
    TooDeep {
        chain: Vec<String>,
        pending: String,
    },
}

/// Top-level key a token was declared under, when it sits inside a group.
fn set_scope(token: &Token) -> Option<String> {
    (token.raw_path.len() > 1).then(|| build_name(&token.raw_path[..1]))
}

fn lookup<'a>(tokens: &'a TokenSet, name: &str, scope: Option<&str>) -> Option<&'a Token> {
    tokens.get(name).or_else(|| {
        let scope = scope?;
        if name.starts_with(&format!("{scope}-")) {
            return None;
        }
        tokens.get(&format!("{scope}-{name}"))
    })
}

fn walk(tokens: &TokenSet, start: &str, scope: Option<String>, max_depth: usize) -> Walk {
    let mut chain = Vec::new();
    let mut current = start.to_string();
    let mut scope = scope;
    loop {
        if chain.len() == max_depth {
            return Walk::TooDeep {
                chain,
                pending: current,
            };
        }
        let Some(hop) = lookup(tokens, &current, scope.as_deref()) else {
            chain.push(current);
            return Walk::Missing { chain };
        };
        chain.push(hop.name.clone());
        match &hop.reference {
            Some(next) => {
                scope = set_scope(hop);
                current = next.clone();
            }
            None => {
                return Walk::Resolved {
                    chain,
                    value: hop.value.clone(),
                    token_type: hop.token_type,
                };
            }
        }
    }
}

/// Resolve every reference in `tokens`, following at most `max_depth` hops.
///
/// - Success: `value` becomes the terminal literal, `reference_target` the
///   terminal name, the chain is recorded and an untyped token takes the
///   terminal type.
/// - Missing target: the symbolic value is kept and a warning recorded.
/// - Depth exceeded: the value is left at the last reached hop, written as
///   that hop's reference expression, and a warning recorded.
pub fn resolve_references(tokens: &mut TokenSet, max_depth: usize) -> ResolveOutcome {
    let mut outcome = ResolveOutcome::default();

    resolve_embedded(tokens, max_depth, &mut outcome);

    for name in tokens.names() {
        let Some((start, scope)) = tokens
            .get(&name)
            .and_then(|token| Some((token.reference.clone()?, set_scope(token))))
        else {
            continue;
        };
        let walked = walk(tokens, &start, scope, max_depth);
        let Some(token) = tokens.get_mut(&name) else {
            continue;
        };

        match walked {
            Walk::Resolved {
                chain,
                value,
                token_type,
            } => {
                token.value = value;
                token.reference_target = chain.last().cloned();
                token.metadata.reference_chain = chain;
                if token.token_type == TokenType::Unknown {
                    token.token_type = token_type;
                }
                token.regroup();
                outcome.resolved += 1;
            }
            Walk::Missing { chain } => {
                token.reference_target = None;
                token.metadata.reference_chain.clear();
                let target = chain.last().cloned().unwrap_or_default();
                let message = if chain.len() > 1 {
                    format!("reference target `{target}` not found (via {})", chain.join(" -> "))
                } else {
                    format!("reference target `{target}` not found")
                };
                tracing::warn!(token = %name, target = %target, "unresolved reference");
                outcome
                    .findings
                    .push(Finding::new(&name, WARNING_CLASS_REFERENCE_MISSING, message));
                outcome.missing.push(name);
            }
            Walk::TooDeep { chain, pending } => {
                token.reference_target = None;
                token.metadata.reference_chain.clear();
                token.value = Value::String(format!("{{{pending}}}"));
                let cyclic = chain.iter().any(|hop| *hop == name) || has_repeat(&chain);
                let message = if cyclic {
                    format!("reference cycle: {} -> {pending}", chain.join(" -> "))
                } else {
                    format!("reference chain exceeds {max_depth} hops; stopped at `{pending}`")
                };
                tracing::warn!(token = %name, depth = max_depth, cyclic, "circular reference");
                outcome
                    .findings
                    .push(Finding::new(&name, WARNING_CLASS_REFERENCE_CIRCULAR, message));
                outcome.circular.push(name);
            }
        }
    }

    tracing::debug!(
        resolved = outcome.resolved,
        missing = outcome.missing.len(),
        circular = outcome.circular.len(),
        "resolved references"
    );
    outcome
}

/// Substitute reference strings nested inside composite values (a shadow's
/// `color`, a typography object's `fontFamily`) with their literal values.
fn resolve_embedded(tokens: &mut TokenSet, max_depth: usize, outcome: &mut ResolveOutcome) {
    for name in tokens.names() {
        let Some(token) = tokens.get(&name) else {
            continue;
        };
        if token.reference.is_some() || !(token.value.is_object() || token.value.is_array()) {
            continue;
        }
        let scope = set_scope(token);
        let mut value = token.value.clone();
        let mut missing = Vec::new();
        substitute(&mut value, tokens, scope.as_deref(), max_depth, &mut missing);
        if let Some(token) = tokens.get_mut(&name) {
            token.value = value;
        }
        if missing.is_empty() {
            continue;
        }
        tracing::warn!(token = %name, targets = ?missing, "unresolved embedded reference");
        let message = format!("embedded reference target `{}` not found", missing.join("`, `"));
        outcome
            .findings
            .push(Finding::new(&name, WARNING_CLASS_REFERENCE_MISSING, message));
        outcome.missing.push(name);
    }
}

fn substitute(
    value: &mut Value,
    tokens: &TokenSet,
    scope: Option<&str>,
    max_depth: usize,
    missing: &mut Vec<String>,
) {
    match value {
        Value::String(_) => {
            let Some(target) = parse_reference(value) else {
                return;
            };
            match walk(tokens, &target, scope.map(str::to_string), max_depth) {
                Walk::Resolved { value: literal, .. } => *value = literal,
                Walk::Missing { .. } | Walk::TooDeep { .. } => missing.push(target),
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, tokens, scope, max_depth, missing);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute(item, tokens, scope, max_depth, missing);
            }
        }
        _ => {}
    }
}

fn has_repeat(chain: &[String]) -> bool {
    chain
        .iter()
        .enumerate()
        .any(|(index, hop)| chain[..index].contains(hop))
}
