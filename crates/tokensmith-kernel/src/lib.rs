//! # tokensmith-kernel
//!
//! Turns heterogeneous design-token exports into one classified token model
//! and emits a declarative mapping plus a custom-property stylesheet per
//! token group.
//!
//! ## Pipeline
//!
//! ```text
//! JSON document ──detect──▶ Format ──flatten──▶ Vec<Token>      (per file)
//!                                                   │ concat
//!                                                   ▼
//!                  dedupe ─▶ resolve ─▶ classify ─▶ normalize ─▶ dedupe
//!                                                   │
//!                                                   ▼
//!                           synthesize colors ─▶ anchor literals ─▶ emit
//! ```
//!
//! Parsing is file-local and pure. Everything after the merge sees the whole
//! input set, because references and duplicate names cross file boundaries.
//! Every stage takes its configuration explicitly and iterates ordered
//! collections only, so identical inputs produce byte-identical artifacts.

pub mod classify;
pub mod config;
pub mod dedupe;
pub mod detect;
pub mod emit;
pub mod error;
pub mod naming;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod synth;
pub mod token;

pub use classify::{
    Classification, ClassificationRule, ClassifyOutcome, classify, classify_all, classify_token,
};
pub use config::{
    ClassificationRules, ColorRules, ConfigError, NamingRules, PipelineConfig, Prefixes,
    ResolutionRules,
};
pub use dedupe::{DedupeOutcome, DuplicateRecord, dedupe, rebind_targets};
pub use detect::{Detection, Format, SimpleCategory, detect_format};
pub use emit::{Artifact, EmitOutcome, Tier, css_value, custom_property, emit};
pub use error::PipelineError;
pub use naming::{build_name, clean_name, contains_reference, kebab, reorder_semantic_name};
pub use normalize::{NormalizeOutcome, normalize_names};
pub use pipeline::{
    BuildOutput, SourceDocument, build_directory, is_manifest, load_documents, run, write_artifacts,
};
pub use report::{
    BuildReport, BuildSummary, Confidence, FileSummary, Finding, SemanticCandidate, render_text,
};
pub use resolve::{ResolveOutcome, resolve_references};
pub use synth::{
    AnchorOutcome, ColorMapping, ColorMappingKind, SynthOutcome, anchor_semantic_literals,
    synthesize_color_families,
};
pub use token::{Category, Token, TokenGroup, TokenMetadata, TokenSet, TokenType};
