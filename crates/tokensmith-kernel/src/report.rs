//! Build report: findings, counts and a digest of the emitted artifacts.

use crate::classify::ClassificationRule;
use crate::detect::{Format, SimpleCategory};
use crate::emit::Artifact;
use crate::synth::ColorMapping;
use crate::token::Category;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

pub const BUILD_REPORT_KIND: &str = "tokensmith.build.v1";
pub const REPORT_JSON_FILE: &str = "token-report.json";
pub const REPORT_TEXT_FILE: &str = "token-report.txt";

const RESULT_ACCEPTED: &str = "accepted";
const RESULT_ACCEPTED_WITH_WARNINGS: &str = "accepted_with_warnings";

/// A non-fatal condition attached to one token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub token: String,
    pub class: String,
    pub message: String,
}

impl Finding {
    pub fn new(token: impl Into<String>, class: &str, message: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            class: class.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A token whose category was decided by a fallback rule, with a hint on
/// how sure that decision is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticCandidate {
    pub name: String,
    pub category: Category,
    pub confidence: Confidence,
    pub rule: ClassificationRule,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub path: String,
    pub format: Format,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SimpleCategory>,
    pub token_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub file_count: usize,
    pub parsed_count: usize,
    pub duplicate_count: usize,
    pub token_count: usize,
    pub primitive_count: usize,
    pub semantic_count: usize,
    pub synthesized_count: usize,
    pub matched_color_count: usize,
    pub promoted_count: usize,
    pub unresolved_count: usize,
    pub circular_count: usize,
    pub legacy_count: usize,
    pub warning_count: usize,
    pub artifact_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub check_kind: String,
    pub result: String,
    pub warning_classes: Vec<String>,
    pub warnings: Vec<Finding>,
    pub summary: BuildSummary,
    pub files: Vec<FileSummary>,
    /// Tokens per classification rule.
    pub classification: BTreeMap<String, usize>,
    pub semantic_candidates: Vec<SemanticCandidate>,
    pub color_mappings: Vec<ColorMapping>,
    pub families: Vec<String>,
    pub artifacts: Vec<String>,
    /// sha256 over every artifact name and body, in emission order.
    pub digest: String,
}

impl BuildReport {
    /// Assemble a report; warning classes and the result are derived from
    /// `warnings`, the digest from `artifacts`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mut summary: BuildSummary,
        files: Vec<FileSummary>,
        warnings: Vec<Finding>,
        classification: BTreeMap<String, usize>,
        semantic_candidates: Vec<SemanticCandidate>,
        color_mappings: Vec<ColorMapping>,
        families: Vec<String>,
        artifacts: &[Artifact],
    ) -> Self {
        summary.warning_count = warnings.len();
        summary.artifact_count = artifacts.len();
        let result = if warnings.is_empty() {
            RESULT_ACCEPTED
        } else {
            RESULT_ACCEPTED_WITH_WARNINGS
        };
        Self {
            check_kind: BUILD_REPORT_KIND.to_string(),
            result: result.to_string(),
            warning_classes: collect_classes(&warnings),
            warnings,
            summary,
            files,
            classification,
            semantic_candidates,
            color_mappings,
            families,
            artifacts: artifacts
                .iter()
                .map(|artifact| artifact.file_name.clone())
                .collect(),
            digest: artifact_digest(artifacts),
        }
    }

    pub fn accepted(&self) -> bool {
        self.result == RESULT_ACCEPTED || self.result == RESULT_ACCEPTED_WITH_WARNINGS
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

fn collect_classes(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn artifact_digest(artifacts: &[Artifact]) -> String {
    let mut hasher = Sha256::new();
    for artifact in artifacts {
        hasher.update(artifact.file_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(artifact.contents.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Human-readable rendering of a report, as written to `token-report.txt`.
pub fn render_text(report: &BuildReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let _ = writeln!(out, "tokensmith build report ({})", report.check_kind);
    let _ = writeln!(out, "result: {}", report.result);
    let _ = writeln!(out);

    let _ = writeln!(out, "files: {}", summary.file_count);
    for file in &report.files {
        let category = file
            .category
            .map(|category| format!(", {}", serde_label(&category)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} [{} {:.2}{}] {} tokens",
            file.path,
            file.format.as_str(),
            file.confidence,
            category,
            file.token_count
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "tokens parsed: {}", summary.parsed_count);
    let _ = writeln!(out, "duplicates discarded: {}", summary.duplicate_count);
    let _ = writeln!(
        out,
        "tokens kept: {} ({} primitive, {} semantic, {} legacy)",
        summary.token_count, summary.primitive_count, summary.semantic_count, summary.legacy_count
    );
    let _ = writeln!(
        out,
        "colors: {} matched, {} primitives synthesized",
        summary.matched_color_count, summary.synthesized_count
    );
    let _ = writeln!(out, "literals promoted: {}", summary.promoted_count);
    let _ = writeln!(
        out,
        "references: {} unresolved, {} circular",
        summary.unresolved_count, summary.circular_count
    );
    if !report.families.is_empty() {
        let _ = writeln!(out, "families: {}", report.families.join(", "));
    }

    if !report.classification.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "classification:");
        for (rule, count) in &report.classification {
            let _ = writeln!(out, "  {rule}: {count}");
        }
    }

    if !report.semantic_candidates.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "semantic candidates:");
        for candidate in &report.semantic_candidates {
            let _ = writeln!(
                out,
                "  [{}] {} ({}): {}",
                serde_label(&candidate.confidence),
                candidate.name,
                candidate.category.as_str(),
                candidate.reason
            );
        }
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            let _ = writeln!(out, "  {} {}: {}", warning.class, warning.token, warning.message);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "artifacts ({}):", summary.artifact_count);
    for artifact in &report.artifacts {
        let _ = writeln!(out, "  {artifact}");
    }
    let _ = writeln!(out, "digest: {}", report.digest);
    out
}

fn serde_label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str, contents: &str) -> Artifact {
        Artifact {
            file_name: name.to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn result_and_classes_follow_warnings() {
        let warnings = vec![
            Finding::new("b", "resolve.reference.missing", "gone"),
            Finding::new("a", "dedupe.name.duplicate", "twice"),
            Finding::new("c", "resolve.reference.missing", "gone"),
        ];
        let report = BuildReport::new(
            BuildSummary::default(),
            Vec::new(),
            warnings,
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            &[],
        );
        assert!(report.accepted());
        assert_eq!(report.result, "accepted_with_warnings");
        assert_eq!(
            report.warning_classes,
            vec!["dedupe.name.duplicate", "resolve.reference.missing"]
        );
        assert_eq!(report.summary.warning_count, 3);
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let one = [artifact("colors.css", ":root {}\n")];
        let same = [artifact("colors.css", ":root {}\n")];
        let other = [artifact("colors.css", ":root { }\n")];
        assert_eq!(artifact_digest(&one), artifact_digest(&same));
        assert_ne!(artifact_digest(&one), artifact_digest(&other));
        assert_eq!(artifact_digest(&one).len(), 64);
    }

    #[test]
    fn text_rendering_lists_warnings_and_artifacts() {
        let report = BuildReport::new(
            BuildSummary {
                file_count: 1,
                ..BuildSummary::default()
            },
            vec![FileSummary {
                path: "colors.json".to_string(),
                format: Format::W3c,
                confidence: 0.95,
                category: None,
                token_count: 2,
            }],
            vec![Finding::new("x", "resolve.reference.circular", "too deep")],
            BTreeMap::new(),
            Vec::new(),
            Vec::new(),
            vec!["amber".to_string()],
            &[artifact("colors.css", ":root {}\n")],
        );
        let text = render_text(&report);
        assert!(text.contains("colors.json [w3c 0.95] 2 tokens"));
        assert!(text.contains("resolve.reference.circular x: too deep"));
        assert!(text.contains("families: amber"));
        assert!(text.contains("  colors.css"));
    }
}
