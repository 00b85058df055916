//! Import records held inside module elements.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ElementId;

/// One imported binding inside a module. Not itself an element.
///
/// Field mapping from source:
/// - `from X import A as B` → `module: X, name: A, alias: B, level: 0`
/// - `import X.Y as Z` → `module: X.Y, name: None, alias: Z, level: 0`
/// - `from . import X` → `module: None, name: X, level: 1`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportRecord {
    /// Dotted source path of the imported module, absent for bare relative
    /// imports (`from . import X`).
    pub module: Option<String>,
    /// Imported member for the `from`-form, absent for the `import`-form.
    pub name: Option<String>,
    pub alias: Option<String>,
    /// 0 for absolute imports, otherwise the relative-ancestor count (the
    /// number of leading dots).
    pub level: usize,
    /// Whether the target resolves to a path inside the project.
    pub is_local: bool,
    /// Resolved filesystem path. A directory here means the import resolved
    /// to a package rather than a single file.
    pub path: Option<PathBuf>,
    /// Id of the resolved module (or folder, for package directories),
    /// filled during stitching after all files are read.
    pub module_id: Option<ElementId>,
}

impl ImportRecord {
    /// The name this import binds in the importing module's scope:
    /// the alias if given, else the imported member, else the first segment
    /// of the module path.
    pub fn local_name(&self) -> Option<&str> {
        if let Some(alias) = &self.alias {
            return Some(alias);
        }
        if let Some(name) = &self.name {
            return Some(name);
        }
        self.module.as_deref().map(|m| m.split('.').next().unwrap_or(m))
    }
}
