//! Name construction, cleanup and semantic reordering.
//!
//! Three related operations live here:
//! - [`build_name`]: the identity every parser assigns (join, strip
//!   annotations, kebab-case). References are built with the same rules so
//!   both sides of a pointer agree.
//! - [`clean_name`]: structural cleanup of a raw path for output names.
//! - [`reorder_semantic_name`]: move a category keyword to the front.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("annotation regex must compile"))
}

fn legacy_note_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:legacy|deprecated|old)\b").expect("legacy note regex must compile")
    })
}

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\{([^}]+)\}$").expect("reference regex must compile"))
}

/// A path segment with its parenthetical annotations removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotated {
    pub text: String,
    pub notes: Vec<String>,
    pub legacy: bool,
}

/// Split `"Primary (legacy)"` into `"Primary"` plus the note `"legacy"`.
pub fn strip_annotations(segment: &str) -> Annotated {
    let mut notes = Vec::new();
    let mut legacy = false;
    for caps in annotation_re().captures_iter(segment) {
        let note = caps[1].trim();
        if note.is_empty() {
            continue;
        }
        if legacy_note_re().is_match(note) {
            legacy = true;
        }
        notes.push(note.to_string());
    }
    let text = annotation_re().replace_all(segment, "").trim().to_string();
    Annotated {
        text,
        notes,
        legacy,
    }
}

/// Kebab-case an identifier.
///
/// camelCase boundaries and letter→digit boundaries become hyphens, as does
/// every non-alphanumeric character (spaces, `_`, `.`, `/`, `&`, …). Runs of
/// hyphens collapse and the result is lowercase.
pub fn kebab(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            out.push('-');
            continue;
        }
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if c.is_uppercase() => {
                p.is_lowercase()
                    || p.is_ascii_digit()
                    || (p.is_uppercase() && next.is_some_and(|n| n.is_lowercase()))
            }
            Some(p) if c.is_ascii_digit() => p.is_alphabetic(),
            _ => false,
        };
        if boundary {
            out.push('-');
        }
        out.extend(c.to_lowercase());
    }
    collapse_hyphens(&out)
}

fn collapse_hyphens(input: &str) -> String {
    input
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// The identity a parser assigns to a raw path.
pub fn build_name<S: AsRef<str>>(raw_path: &[S]) -> String {
    let joined = raw_path
        .iter()
        .map(|segment| strip_annotations(segment.as_ref()).text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    kebab(&joined)
}

/// Whether any string inside `value`, at any depth, is a reference
/// expression.
pub fn contains_reference(value: &Value) -> bool {
    match value {
        Value::String(text) => is_reference_expression(text),
        Value::Array(items) => items.iter().any(contains_reference),
        Value::Object(map) => map.values().any(contains_reference),
        _ => false,
    }
}

/// Whether the whole string is a brace-wrapped reference like `{color.red}`.
pub fn is_reference_expression(text: &str) -> bool {
    reference_re().is_match(text.trim())
}

/// Name form of a reference value, if `value` is one.
///
/// Trailing `.value` / `.$value` segments written by older exporters are
/// dropped so the pointer lands on the token, not its payload.
pub fn parse_reference(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    let caps = reference_re().captures(text)?;
    let mut segments: Vec<&str> = caps[1].split('.').map(str::trim).collect();
    while segments
        .last()
        .is_some_and(|last| *last == "value" || *last == "$value")
        && segments.len() > 1
    {
        segments.pop();
    }
    let name = build_name(&segments);
    (!name.is_empty()).then_some(name)
}

fn split_segments<S: AsRef<str>>(raw_path: &[S]) -> Vec<String> {
    raw_path
        .iter()
        .flat_map(|segment| {
            strip_annotations(segment.as_ref())
                .text
                .split(|c: char| c == '-' || c == '/' || c == '.' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

fn restates(first: &str, second: &str) -> bool {
    let first = first.to_lowercase();
    let second = second.to_lowercase();
    common_prefix_len(&first, &second) >= 4
        || first.starts_with(&second)
        || second.starts_with(&first)
}

/// Structural cleanup of a raw path into an output name.
///
/// 1. Drop a leading wrapper label (from `wrappers`) when at least three
///    segments remain.
/// 2. Drop the first segment when the second restates it (shared prefix of
///    four or more characters, or one is a prefix of the other).
/// 3. Kebab-case the rest.
pub fn clean_name<S: AsRef<str>>(raw_path: &[S], wrappers: &[String]) -> String {
    let mut segments = split_segments(raw_path);

    if segments.len() >= 3 {
        let first = segments[0].to_lowercase();
        if wrappers.iter().any(|wrapper| *wrapper == first) {
            segments.remove(0);
        }
    }

    if segments.len() >= 2 && restates(&segments[0], &segments[1]) {
        segments.remove(0);
    }

    kebab(&segments.join("-"))
}

/// Move the first configured category keyword to the front of a semantic
/// name. Names that already lead with a keyword, or contain none, are
/// returned unchanged.
pub fn reorder_semantic_name(name: &str, keywords: &[String]) -> String {
    let segments: Vec<&str> = name.split('-').collect();
    let keyword_segments: Vec<Vec<&str>> = keywords
        .iter()
        .map(|keyword| keyword.split('-').collect::<Vec<_>>())
        .filter(|parts| !parts.is_empty() && parts.iter().all(|part| !part.is_empty()))
        .collect();

    let matches_at = |index: usize| -> Option<usize> {
        keyword_segments
            .iter()
            .filter(|parts| segments[index..].starts_with(parts.as_slice()))
            .map(Vec::len)
            .max()
    };

    if matches_at(0).is_some() {
        return name.to_string();
    }

    for index in 1..segments.len() {
        if let Some(len) = matches_at(index) {
            let mut reordered: Vec<&str> = segments[index..index + len].to_vec();
            reordered.extend_from_slice(&segments[..index]);
            reordered.extend_from_slice(&segments[index + len..]);
            return reordered.join("-");
        }
    }

    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrappers() -> Vec<String> {
        crate::config::DEFAULT_WRAPPER_LABELS
            .iter()
            .map(|label| label.to_string())
            .collect()
    }

    #[test]
    fn kebab_splits_camel_and_digit_boundaries() {
        assert_eq!(kebab("errorMain"), "error-main");
        assert_eq!(kebab("brown00"), "brown-00");
        assert_eq!(kebab("HTMLColor"), "html-color");
        assert_eq!(kebab("Primary  Blue__500"), "primary-blue-500");
        assert_eq!(kebab("Black & White"), "black-white");
        assert_eq!(kebab("--a--b--"), "a-b");
        assert_eq!(kebab("2xl"), "2xl");
    }

    #[test]
    fn strips_annotations_and_flags_legacy() {
        let annotated = strip_annotations("Primary (legacy)");
        assert_eq!(annotated.text, "Primary");
        assert_eq!(annotated.notes, vec!["legacy"]);
        assert!(annotated.legacy);

        let annotated = strip_annotations("Gold (use for badges)");
        assert_eq!(annotated.text, "Gold");
        assert!(!annotated.legacy);

        assert!(strip_annotations("Blue (Deprecated)").legacy);
        assert!(!strip_annotations("Bold (bolder)").legacy);
    }

    #[test]
    fn builds_names_from_raw_paths() {
        assert_eq!(build_name(&["Notification", "errorMain"]), "notification-error-main");
        assert_eq!(build_name(&["Colors", "Primary (old)", "500"]), "colors-primary-500");
    }

    #[test]
    fn parses_references_into_names() {
        assert_eq!(
            parse_reference(&json!("{colors.primary.500}")),
            Some("colors-primary-500".to_string())
        );
        assert_eq!(
            parse_reference(&json!("{color.base.red.value}")),
            Some("color-base-red".to_string())
        );
        assert_eq!(parse_reference(&json!("{spacing.2} * 2")), None);
        assert_eq!(parse_reference(&json!("#fff")), None);
        assert_eq!(parse_reference(&json!(4)), None);
    }

    #[test]
    fn cleans_restated_and_wrapped_paths() {
        assert_eq!(clean_name(&["Radius-radius-small"], &wrappers()), "radius-small");
        assert_eq!(clean_name(&["Secondary-Brown-brown00"], &wrappers()), "brown-00");
        assert_eq!(clean_name(&["Secondary", "Brown", "brown00"], &wrappers()), "brown-00");
        assert_eq!(clean_name(&["Notification", "errorMain"], &wrappers()), "notification-error-main");
        assert_eq!(clean_name(&["Colors", "color", "red"], &wrappers()), "color-red");
        assert_eq!(clean_name(&["Fill & Stroke", "main"], &wrappers()), "fill-stroke-main");
    }

    #[test]
    fn wrapper_needs_three_segments() {
        assert_eq!(clean_name(&["Secondary", "main"], &wrappers()), "secondary-main");
    }

    #[test]
    fn reorders_category_keyword_to_front() {
        let keywords = vec!["text".to_string(), "background".to_string()];
        assert_eq!(reorder_semantic_name("primary-black-text", &keywords), "text-primary-black");
        assert_eq!(reorder_semantic_name("primary-main", &keywords), "primary-main");
        assert_eq!(reorder_semantic_name("text-primary", &keywords), "text-primary");
        assert_eq!(
            reorder_semantic_name("card-background-text", &keywords),
            "background-card-text"
        );
    }

    #[test]
    fn reorders_multi_segment_keywords() {
        let keywords = vec!["on-surface".to_string()];
        assert_eq!(
            reorder_semantic_name("primary-on-surface-muted", &keywords),
            "on-surface-primary-muted"
        );
    }
}
