//! Run configuration.
//!
//! Loaded once from TOML and passed by reference into every stage. The
//! `[prefixes]` table is required in full: every emitted custom-property name
//! depends on it, so a run without it aborts before any file is read. All
//! other tables fall back to the defaults below.

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "tokensmith.toml";
pub const DEFAULT_MATCH_THRESHOLD: f64 = 30.0;
pub const DEFAULT_MAX_DEPTH: usize = 10;

pub const DEFAULT_SEMANTIC_KEYWORDS: &[&str] = &[
    "primary",
    "secondary",
    "tertiary",
    "accent",
    "brand",
    "background",
    "bg",
    "foreground",
    "surface",
    "text",
    "border",
    "outline",
    "icon",
    "success",
    "error",
    "warning",
    "danger",
    "info",
    "critical",
    "positive",
    "negative",
    "disabled",
    "hover",
    "pressed",
    "active",
    "focus",
    "selected",
    "muted",
    "subtle",
    "inverse",
    "overlay",
    "main",
    "default",
    "emphasis",
    "link",
];

pub const DEFAULT_PRIMITIVE_PATTERNS: &[&str] = &[
    r"^[a-z]+(?:-[a-z]+)*-\d{2,4}$",
    r"^spacing-\d+$",
    r"^radius-\d+$",
    r"^font-size-\d+$",
    r"^(?:red|orange|amber|yellow|lime|green|emerald|teal|cyan|sky|blue|indigo|violet|purple|fuchsia|pink|rose|brown|gray|grey|slate|zinc|neutral|stone|black|white)$",
];

pub const DEFAULT_COMPONENT_KEYWORDS: &[&str] = &[
    "button", "input", "card", "modal", "dialog", "badge", "chip", "tooltip", "tab", "toast",
    "avatar", "checkbox", "switch", "select", "menu",
];

pub const DEFAULT_CATEGORY_KEYWORDS: &[&str] = &["text", "background", "border", "surface", "icon"];

pub const DEFAULT_WRAPPER_LABELS: &[&str] = &[
    "secondary",
    "tertiary",
    "palette",
    "palettes",
    "global",
    "core",
    "base",
    "tokens",
    "foundation",
    "foundations",
    "collection",
];

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required config field `{0}`")]
    MissingField(&'static str),

    #[error("invalid primitive pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid config value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Custom-property prefixes per tier. Any of them may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefixes {
    pub primitive: String,
    pub semantic: String,
    pub component: String,
}

#[derive(Debug, Clone)]
pub struct ClassificationRules {
    pub semantic_keywords: Vec<String>,
    pub primitive_patterns: Vec<Regex>,
    pub component_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NamingRules {
    pub reorder_semantic_names: bool,
    pub category_keywords: Vec<String>,
    pub wrapper_labels: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ColorRules {
    /// Maximum RGB distance at which a hardcoded color maps onto an existing
    /// primitive.
    pub match_threshold: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolutionRules {
    pub max_depth: usize,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub prefixes: Prefixes,
    pub classification: ClassificationRules,
    pub naming: NamingRules,
    pub colors: ColorRules,
    pub resolution: ResolutionRules,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    prefixes: Option<RawPrefixes>,
    #[serde(default)]
    classification: RawClassification,
    #[serde(default)]
    naming: RawNaming,
    #[serde(default)]
    colors: RawColors,
    #[serde(default)]
    resolution: RawResolution,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrefixes {
    primitive: Option<String>,
    semantic: Option<String>,
    component: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassification {
    semantic_keywords: Option<Vec<String>>,
    primitive_patterns: Option<Vec<String>>,
    component_keywords: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNaming {
    reorder_semantic_names: Option<bool>,
    category_keywords: Option<Vec<String>>,
    wrapper_labels: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawColors {
    match_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResolution {
    max_depth: Option<usize>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

fn lowered(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_ascii_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

impl ClassificationRules {
    pub fn defaults() -> Self {
        Self {
            semantic_keywords: owned(DEFAULT_SEMANTIC_KEYWORDS),
            primitive_patterns: compile_patterns(&owned(DEFAULT_PRIMITIVE_PATTERNS))
                .expect("default primitive patterns must compile"),
            component_keywords: owned(DEFAULT_COMPONENT_KEYWORDS),
        }
    }
}

impl NamingRules {
    pub fn defaults() -> Self {
        Self {
            reorder_semantic_names: true,
            category_keywords: owned(DEFAULT_CATEGORY_KEYWORDS),
            wrapper_labels: owned(DEFAULT_WRAPPER_LABELS),
        }
    }
}

impl PipelineConfig {
    /// Configuration with the given prefixes and default rule sets.
    pub fn new(prefixes: Prefixes) -> Self {
        Self {
            prefixes,
            classification: ClassificationRules::defaults(),
            naming: NamingRules::defaults(),
            colors: ColorRules {
                match_threshold: DEFAULT_MATCH_THRESHOLD,
            },
            resolution: ResolutionRules {
                max_depth: DEFAULT_MAX_DEPTH,
            },
        }
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Parse configuration text; `origin` only labels error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: origin.to_string(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let prefixes = raw.prefixes.ok_or(ConfigError::MissingField("prefixes"))?;
        let prefixes = Prefixes {
            primitive: prefixes
                .primitive
                .ok_or(ConfigError::MissingField("prefixes.primitive"))?,
            semantic: prefixes
                .semantic
                .ok_or(ConfigError::MissingField("prefixes.semantic"))?,
            component: prefixes
                .component
                .ok_or(ConfigError::MissingField("prefixes.component"))?,
        };
        for (key, value) in [
            ("prefixes.primitive", &prefixes.primitive),
            ("prefixes.semantic", &prefixes.semantic),
            ("prefixes.component", &prefixes.component),
        ] {
            validate_prefix(key, value)?;
        }

        let mut config = Self::new(prefixes);

        let classification = raw.classification;
        if let Some(keywords) = classification.semantic_keywords {
            config.classification.semantic_keywords = lowered(keywords);
        }
        if let Some(patterns) = classification.primitive_patterns {
            config.classification.primitive_patterns = compile_patterns(&patterns)?;
        }
        if let Some(keywords) = classification.component_keywords {
            config.classification.component_keywords = lowered(keywords);
        }

        let naming = raw.naming;
        if let Some(reorder) = naming.reorder_semantic_names {
            config.naming.reorder_semantic_names = reorder;
        }
        if let Some(keywords) = naming.category_keywords {
            config.naming.category_keywords = lowered(keywords);
        }
        if let Some(labels) = naming.wrapper_labels {
            config.naming.wrapper_labels = lowered(labels);
        }

        if let Some(threshold) = raw.colors.match_threshold {
            config.set_match_threshold(threshold)?;
        }
        if let Some(depth) = raw.resolution.max_depth {
            config.set_max_depth(depth)?;
        }

        Ok(config)
    }

    pub fn set_match_threshold(&mut self, threshold: f64) -> Result<(), ConfigError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "colors.match_threshold",
                message: format!("expected a non-negative number, got {threshold}"),
            });
        }
        self.colors.match_threshold = threshold;
        Ok(())
    }

    pub fn set_max_depth(&mut self, depth: usize) -> Result<(), ConfigError> {
        if depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "resolution.max_depth",
                message: "must be at least 1".to_string(),
            });
        }
        self.resolution.max_depth = depth;
        Ok(())
    }
}

fn validate_prefix(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid || value.starts_with('-') || value.ends_with('-') {
        return Err(ConfigError::InvalidValue {
            key,
            message: format!("`{value}` is not a valid custom-property prefix"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[prefixes]
primitive = "primitive"
semantic = ""
component = "cmp"
"#;

    #[test]
    fn loads_minimal_config_with_defaults() {
        let config = PipelineConfig::from_toml_str(MINIMAL, "inline").expect("config parses");
        assert_eq!(config.prefixes.primitive, "primitive");
        assert_eq!(config.prefixes.semantic, "");
        assert_eq!(config.prefixes.component, "cmp");
        assert_eq!(config.colors.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(config.resolution.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.naming.reorder_semantic_names);
        assert_eq!(
            config.classification.primitive_patterns.len(),
            DEFAULT_PRIMITIVE_PATTERNS.len()
        );
    }

    #[test]
    fn missing_prefix_table_is_fatal() {
        let err = PipelineConfig::from_toml_str("[colors]\nmatch_threshold = 12.0\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("prefixes")));
    }

    #[test]
    fn missing_prefix_key_is_fatal() {
        let text = "[prefixes]\nprimitive = \"p\"\ncomponent = \"\"\n";
        let err = PipelineConfig::from_toml_str(text, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("prefixes.semantic")));
    }

    #[test]
    fn overrides_rule_sets() {
        let text = format!(
            "{MINIMAL}\n[classification]\nsemantic_keywords = [\"Intent\"]\nprimitive_patterns = ['^step-\\d+$']\n\n[naming]\nreorder_semantic_names = false\n\n[colors]\nmatch_threshold = 12.5\n\n[resolution]\nmax_depth = 4\n"
        );
        let config = PipelineConfig::from_toml_str(&text, "inline").expect("config parses");
        assert_eq!(config.classification.semantic_keywords, vec!["intent"]);
        assert!(config.classification.primitive_patterns[0].is_match("step-3"));
        assert!(!config.naming.reorder_semantic_names);
        assert_eq!(config.colors.match_threshold, 12.5);
        assert_eq!(config.resolution.max_depth, 4);
    }

    #[test]
    fn rejects_invalid_pattern() {
        let text = format!("{MINIMAL}\n[classification]\nprimitive_patterns = ['(unclosed']\n");
        let err = PipelineConfig::from_toml_str(&text, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_zero_depth_and_negative_threshold() {
        let text = format!("{MINIMAL}\n[resolution]\nmax_depth = 0\n");
        assert!(matches!(
            PipelineConfig::from_toml_str(&text, "inline").unwrap_err(),
            ConfigError::InvalidValue { key: "resolution.max_depth", .. }
        ));

        let text = format!("{MINIMAL}\n[colors]\nmatch_threshold = -1.0\n");
        assert!(matches!(
            PipelineConfig::from_toml_str(&text, "inline").unwrap_err(),
            ConfigError::InvalidValue { key: "colors.match_threshold", .. }
        ));
    }

    #[test]
    fn rejects_malformed_prefix() {
        let text = "[prefixes]\nprimitive = \"has space\"\nsemantic = \"\"\ncomponent = \"\"\n";
        assert!(matches!(
            PipelineConfig::from_toml_str(text, "inline").unwrap_err(),
            ConfigError::InvalidValue { key: "prefixes.primitive", .. }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\n[colors]\nthreshold = 3.0\n");
        assert!(matches!(
            PipelineConfig::from_toml_str(&text, "inline").unwrap_err(),
            ConfigError::ParseToml { .. }
        ));
    }
}
