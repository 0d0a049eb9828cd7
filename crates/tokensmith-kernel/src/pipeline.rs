//! End-to-end orchestration of one build.

use crate::classify::classify_all;
use crate::config::PipelineConfig;
use crate::dedupe::{dedupe, rebind_targets};
use crate::detect::{SimpleCategory, detect_format};
use crate::emit::{Artifact, emit};
use crate::error::PipelineError;
use crate::normalize::normalize_names;
use crate::report::{
    BuildReport, BuildSummary, FileSummary, REPORT_JSON_FILE, REPORT_TEXT_FILE, render_text,
};
use crate::resolve::resolve_references;
use crate::synth::{anchor_semantic_literals, synthesize_color_families};
use crate::token::{Token, TokenSet};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const MANIFEST_FILES: [&str; 2] = ["$metadata.json", "$themes.json"];

/// One parsed input file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub name: String,
    pub document: Value,
}

impl SourceDocument {
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, PipelineError> {
        let name = name.into();
        let document = serde_json::from_str(text).map_err(|source| PipelineError::ParseJson {
            path: name.clone(),
            source,
        })?;
        Ok(Self { name, document })
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub tokens: TokenSet,
    pub artifacts: Vec<Artifact>,
    pub report: BuildReport,
}

/// Tool manifests that carry no tokens of their own.
pub fn is_manifest(file_name: &str) -> bool {
    MANIFEST_FILES.contains(&file_name) || file_name.to_ascii_lowercase().contains("manifest")
}

/// Read every `.json` file directly under `dir`, sorted by file name.
/// Malformed JSON in any file fails the whole load.
pub fn load_documents(dir: &Path) -> Result<Vec<SourceDocument>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|source| PipelineError::ReadDir {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::ReadDir {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !path.is_file() || !is_json {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_manifest(&file_name) {
            tracing::debug!(file = %file_name, "skipping manifest");
            continue;
        }
        files.push((file_name, path));
    }
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for (file_name, path) in files {
        let text = fs::read_to_string(&path).map_err(|source| PipelineError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        documents.push(SourceDocument::parse(file_name, &text)?);
    }
    Ok(documents)
}

/// Run every stage over already-loaded documents.
pub fn run(documents: &[SourceDocument], config: &PipelineConfig) -> Result<BuildOutput, PipelineError> {
    let mut files = Vec::with_capacity(documents.len());
    let mut parsed: Vec<Token> = Vec::new();
    for source in documents {
        let detection = detect_format(&source.document, &source.name);
        let mut tokens = detection.format.flatten(
            &source.document,
            detection.category.unwrap_or(SimpleCategory::Unknown),
        );
        for token in &mut tokens {
            token.metadata.source_file = Some(source.name.clone());
        }
        tracing::info!(
            file = %source.name,
            format = detection.format.as_str(),
            confidence = detection.confidence,
            tokens = tokens.len(),
            "parsed document"
        );
        files.push(FileSummary {
            path: source.name.clone(),
            format: detection.format,
            confidence: detection.confidence,
            category: detection.category,
            token_count: tokens.len(),
        });
        parsed.extend(tokens);
    }
    let parsed_count = parsed.len();

    let merged = dedupe(parsed);
    let mut warnings = merged.findings.clone();
    let mut duplicate_count = merged.discarded();
    let mut tokens = merged.tokens;

    let resolved = resolve_references(&mut tokens, config.resolution.max_depth);
    warnings.extend(resolved.findings.iter().cloned());

    let classified = classify_all(&mut tokens, &config.classification);

    let normalized = normalize_names(tokens, &config.naming);
    let renames = normalized.renames;
    let renamed = dedupe(normalized.tokens);
    warnings.extend(renamed.findings.iter().cloned());
    duplicate_count += renamed.discarded();
    let mut tokens = renamed.tokens;
    warnings.extend(rebind_targets(&mut tokens, &renamed.duplicates));

    let synthesized = synthesize_color_families(&mut tokens, config.colors.match_threshold);
    warnings.extend(synthesized.findings.iter().cloned());

    let anchored = anchor_semantic_literals(&mut tokens);
    warnings.extend(anchored.findings.iter().cloned());

    let emitted = emit(
        &tokens,
        &config.prefixes,
        &config.classification.component_keywords,
    )?;
    warnings.extend(emitted.findings.iter().cloned());

    let mut classification: BTreeMap<String, usize> = BTreeMap::new();
    for token in tokens.iter() {
        if let Some(rule) = token.rule {
            *classification.entry(rule.as_str().to_string()).or_default() += 1;
        }
    }
    let semantic_candidates = classified
        .candidates
        .into_iter()
        .map(|mut candidate| {
            if let Some(new_name) = renames.get(&candidate.name) {
                candidate.name = new_name.clone();
            }
            candidate
        })
        .filter(|candidate| tokens.contains(&candidate.name))
        .collect();

    let summary = BuildSummary {
        file_count: files.len(),
        parsed_count,
        duplicate_count,
        token_count: tokens.len(),
        primitive_count: tokens.primitives().count(),
        semantic_count: tokens.semantics().count(),
        synthesized_count: synthesized.created.len(),
        matched_color_count: synthesized.matched(),
        promoted_count: anchored.promoted.len(),
        unresolved_count: resolved.missing.len(),
        circular_count: resolved.circular.len(),
        legacy_count: tokens.iter().filter(|token| token.metadata.is_legacy).count(),
        ..BuildSummary::default()
    };

    let report = BuildReport::new(
        summary,
        files,
        warnings,
        classification,
        semantic_candidates,
        synthesized.mappings,
        synthesized.families,
        &emitted.artifacts,
    );
    tracing::info!(
        tokens = report.summary.token_count,
        artifacts = report.summary.artifact_count,
        warnings = report.summary.warning_count,
        "build finished"
    );

    Ok(BuildOutput {
        tokens,
        artifacts: emitted.artifacts,
        report,
    })
}

/// Write artifacts plus `token-report.json` and `token-report.txt`.
pub fn write_artifacts(out_dir: &Path, output: &BuildOutput) -> Result<(), PipelineError> {
    fs::create_dir_all(out_dir).map_err(|source| PipelineError::WriteArtifact {
        path: out_dir.display().to_string(),
        source,
    })?;

    let mut report_json =
        serde_json::to_string_pretty(&output.report).map_err(PipelineError::RenderReport)?;
    report_json.push('\n');
    let report_files = [
        (REPORT_JSON_FILE, report_json),
        (REPORT_TEXT_FILE, render_text(&output.report)),
    ];

    let files = output
        .artifacts
        .iter()
        .map(|artifact| (artifact.file_name.as_str(), artifact.contents.as_str()))
        .chain(report_files.iter().map(|(name, body)| (*name, body.as_str())));
    for (file_name, contents) in files {
        let path = out_dir.join(file_name);
        fs::write(&path, contents).map_err(|source| PipelineError::WriteArtifact {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Load `input`, run the pipeline and write everything into `out_dir`.
pub fn build_directory(
    input: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<BuildOutput, PipelineError> {
    let documents = load_documents(input)?;
    let output = run(&documents, config)?;
    write_artifacts(out_dir, &output)?;
    Ok(output)
}
