//! Fatal pipeline errors.
//!
//! Anything recoverable (missing reference targets, cycles, duplicates,
//! unparseable colors) is a [`Finding`](crate::report::Finding) instead.

use crate::config::ConfigError;

/// Errors that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read input directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render artifact {path}: {source}")]
    RenderArtifact {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write artifact {path}: {source}")]
    WriteArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render report: {0}")]
    RenderReport(#[source] serde_json::Error),
}
