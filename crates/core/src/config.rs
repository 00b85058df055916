//! Configuration for an analysis run, loadable from `.codemap.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Glob patterns for files to analyze (matched against file names).
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Patterns for paths to skip. A pattern excludes a file when it matches
    /// the file name as a glob or occurs as a substring of the full path.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            extract: ExtractConfig::default(),
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AnalyzerConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load `.codemap.toml` from `dir` if present, else defaults.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(".codemap.toml");
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["*.py".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "__pycache__".to_string(),
        "*.pyc".to_string(),
        "*.pyo".to_string(),
        "*.pyd".to_string(),
    ]
}

/// Which attributes extraction populates, per node kind.
///
/// A fixed record rather than a free-form map: the option set is closed, and
/// an unknown key in a config file should be a parse error, not silence.
/// Imports are always extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub classes: ClassAttrs,

    #[serde(default)]
    pub functions: FunctionAttrs,

    /// Lower top-level module statements into linear IR.
    #[serde(default)]
    pub module_instructions: bool,
}

/// Attribute toggles for class definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassAttrs {
    #[serde(default = "default_true")]
    pub decorator_list: bool,

    #[serde(default = "default_true")]
    pub base_classes: bool,
}

impl Default for ClassAttrs {
    fn default() -> Self {
        Self {
            decorator_list: true,
            base_classes: true,
        }
    }
}

/// Attribute toggles for function definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionAttrs {
    #[serde(default = "default_true")]
    pub decorator_list: bool,

    #[serde(default = "default_true")]
    pub parameters: bool,

    #[serde(default = "default_true")]
    pub outgoing_calls: bool,

    /// Record structured `(expression, line, column)` call sites. Required
    /// for precise-mode call resolution.
    #[serde(default)]
    pub call_sites: bool,

    /// Lower function bodies into linear IR.
    #[serde(default)]
    pub instructions: bool,
}

impl Default for FunctionAttrs {
    fn default() -> Self {
        Self {
            decorator_list: true,
            parameters: true,
            outgoing_calls: true,
            call_sites: false,
            instructions: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_extracts_the_full_attribute_set() {
        let config = AnalyzerConfig::default();
        assert!(config.extract.classes.base_classes);
        assert!(config.extract.functions.outgoing_calls);
        assert!(!config.extract.functions.call_sites);
        assert_eq!(config.include, vec!["*.py"]);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: AnalyzerConfig = toml::from_str(
            r#"
            exclude = ["build"]

            [extract.functions]
            call_sites = true
            "#,
        )
        .unwrap();
        assert_eq!(config.exclude, vec!["build"]);
        assert!(config.extract.functions.call_sites);
        assert!(config.extract.functions.outgoing_calls);
        assert_eq!(config.include, vec!["*.py"]);
    }
}
