//! Serialization of the element map with field selection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::model::{Element, ElementKind, ModelMap};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// What to emit and how: format, element filters, and per-field toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,

    /// Only emit elements of these kinds, when set.
    pub include_types: Option<Vec<ElementKind>>,
    /// Never emit elements of these kinds.
    pub exclude_types: Vec<ElementKind>,
    /// Only emit elements whose file path contains one of these substrings,
    /// when non-empty. Elements without a span (folders) always pass.
    pub include_files: Vec<String>,
    /// Drop elements whose file path contains one of these substrings.
    pub exclude_files: Vec<String>,

    pub include_source_span: bool,
    pub include_children: bool,
    pub include_parent: bool,
    pub include_imports: bool,
    pub include_base_classes: bool,
    pub include_outgoing_calls: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
            include_types: None,
            exclude_types: Vec::new(),
            include_files: Vec::new(),
            exclude_files: Vec::new(),
            include_source_span: true,
            include_children: true,
            include_parent: true,
            include_imports: true,
            include_base_classes: true,
            include_outgoing_calls: true,
        }
    }
}

impl OutputConfig {
    /// Render the filtered element map in the configured format.
    pub fn render(&self, models: &ModelMap) -> Result<String, OutputError> {
        let value = self.filtered_value(models)?;
        Ok(match self.format {
            OutputFormat::Json if self.pretty => serde_json::to_string_pretty(&value)?,
            OutputFormat::Json => serde_json::to_string(&value)?,
            OutputFormat::Yaml => serde_yaml::to_string(&value)?,
        })
    }

    /// Render and write to `path`, creating parent directories as needed.
    pub fn write(&self, models: &ModelMap, path: &Path) -> Result<(), OutputError> {
        let rendered = self.render(models)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }

    fn filtered_value(&self, models: &ModelMap) -> Result<serde_json::Value, OutputError> {
        let mut map = serde_json::Map::new();
        for (id, element) in models.iter() {
            if !self.should_include(element) {
                continue;
            }
            let mut value = serde_json::to_value(element)?;
            if let serde_json::Value::Object(fields) = &mut value {
                if !self.include_source_span {
                    fields.remove("source_span");
                }
                if !self.include_children {
                    fields.remove("children_ids");
                }
                if !self.include_parent {
                    fields.remove("parent_id");
                }
                if !self.include_imports {
                    fields.remove("imports");
                }
                if !self.include_base_classes {
                    fields.remove("base_classes");
                    fields.remove("unresolved_base_classes");
                }
                if !self.include_outgoing_calls {
                    fields.remove("outgoing_calls");
                }
            }
            map.insert(id.to_string(), value);
        }
        Ok(serde_json::Value::Object(map))
    }

    fn should_include(&self, element: &Element) -> bool {
        let kind = element.kind();
        if let Some(include) = &self.include_types {
            if !include.contains(&kind) {
                return false;
            }
        }
        if self.exclude_types.contains(&kind) {
            return false;
        }

        if let Some(span) = element.source_span() {
            let path = span.file_path.to_string_lossy();
            if !self.include_files.is_empty()
                && !self.include_files.iter().any(|p| path.contains(p.as_str()))
            {
                return false;
            }
            if self.exclude_files.iter().any(|p| path.contains(p.as_str())) {
                return false;
            }
        }
        true
    }
}
