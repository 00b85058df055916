//! Import extraction and local-path classification.
//!
//! Resolution is path-based, not semantic: for each import the candidate
//! search roots are probed on disk in order, and the first hit wins. Targets
//! whose first segment names a standard-library module are non-local by
//! definition; everything that fails to resolve inside the project is
//! likewise classified non-local and never touched again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

use super::calls::node_text;
use crate::model::ImportRecord;

/// Classifies imports and resolves dotted module paths to on-disk paths.
pub struct ImportResolver<'a> {
    project_root: &'a Path,
    stdlib: &'a HashSet<String>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(project_root: &'a Path, stdlib: &'a HashSet<String>) -> Self {
        Self {
            project_root,
            stdlib,
        }
    }

    /// Resolve a dotted module path to a filesystem path inside the project.
    ///
    /// Search roots: for absolute imports, the project root, plus the root's
    /// parent when the first segment equals the root folder's name (covers
    /// both package-as-root and package-under-root layouts). For relative
    /// imports, the single directory `level - 1` hops above the importing
    /// file's directory.
    ///
    /// Candidate probing, per root: a directory with an `__init__.py` marker,
    /// then a `.py` file, then a bare directory as a last resort.
    pub fn resolve(
        &self,
        module: Option<&str>,
        level: usize,
        importing_file: &Path,
    ) -> Option<PathBuf> {
        if module.is_none() && level == 0 {
            return None;
        }

        let mut search_roots: Vec<PathBuf> = Vec::new();
        if level == 0 {
            let module = module?;
            let first = module.split('.').next().unwrap_or(module);
            if self.stdlib.contains(first) {
                return None;
            }

            search_roots.push(self.project_root.to_path_buf());
            let root_name = self.project_root.file_name().and_then(|n| n.to_str());
            if root_name == Some(first) {
                if let Some(parent) = self.project_root.parent() {
                    search_roots.push(parent.to_path_buf());
                }
            }
        } else {
            let mut dir = importing_file.parent()?.to_path_buf();
            for _ in 1..level {
                dir = dir.parent()?.to_path_buf();
            }
            search_roots.push(dir);
        }

        let relative: PathBuf = match module {
            Some(module) => module.split('.').collect(),
            None => PathBuf::new(),
        };

        for base in &search_roots {
            let candidate = base.join(&relative);
            if candidate.is_dir() && candidate.join("__init__.py").is_file() {
                return Some(candidate);
            }
            let as_file = PathBuf::from(format!("{}.py", candidate.display()));
            if as_file.is_file() {
                return Some(as_file);
            }
            if candidate.is_dir() {
                return Some(candidate);
            }
        }

        None
    }
}

/// Build one [`ImportRecord`] per imported alias from an `import` /
/// `from … import …` statement node. Duplicate records are retained.
pub fn records_from_statement(
    node: Node<'_>,
    source: &str,
    resolver: &ImportResolver<'_>,
    importing_file: &Path,
) -> Vec<ImportRecord> {
    match node.kind() {
        "import_statement" => {
            let mut records = Vec::new();
            let mut cursor = node.walk();
            for name_node in node.children_by_field_name("name", &mut cursor) {
                let (module, alias) = match name_node.kind() {
                    "dotted_name" => (node_text(name_node, source), None),
                    "aliased_import" => {
                        let module = name_node
                            .child_by_field_name("name")
                            .map(|n| node_text(n, source));
                        let alias = name_node
                            .child_by_field_name("alias")
                            .map(|a| node_text(a, source));
                        match module {
                            Some(module) => (module, alias),
                            None => continue,
                        }
                    }
                    _ => continue,
                };

                let path = resolver.resolve(Some(&module), 0, importing_file);
                records.push(ImportRecord {
                    module: Some(module),
                    name: None,
                    alias,
                    level: 0,
                    is_local: path.is_some(),
                    path,
                    module_id: None,
                });
            }
            records
        }

        "import_from_statement" => {
            let (module, level) = match node.child_by_field_name("module_name") {
                Some(m) if m.kind() == "relative_import" => relative_parts(m, source),
                Some(m) => (Some(node_text(m, source)), 0),
                None => (None, 0),
            };

            let path = resolver.resolve(module.as_deref(), level, importing_file);
            let is_local = path.is_some();

            let mut records = Vec::new();

            // `from x import *` yields a single record with name "*"; no
            // attempt is made to enumerate the target's bindings.
            let mut cursor = node.walk();
            let has_wildcard = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "wildcard_import");
            if has_wildcard {
                records.push(ImportRecord {
                    module: module.clone(),
                    name: Some("*".to_string()),
                    alias: None,
                    level,
                    is_local,
                    path: path.clone(),
                    module_id: None,
                });
            }

            let mut cursor = node.walk();
            for name_node in node.children_by_field_name("name", &mut cursor) {
                let (name, alias) = match name_node.kind() {
                    "dotted_name" => (node_text(name_node, source), None),
                    "aliased_import" => {
                        let name = name_node
                            .child_by_field_name("name")
                            .map(|n| node_text(n, source));
                        let alias = name_node
                            .child_by_field_name("alias")
                            .map(|a| node_text(a, source));
                        match name {
                            Some(name) => (name, alias),
                            None => continue,
                        }
                    }
                    _ => continue,
                };

                records.push(ImportRecord {
                    module: module.clone(),
                    name: Some(name),
                    alias,
                    level,
                    is_local,
                    path: path.clone(),
                    module_id: None,
                });
            }
            records
        }

        _ => Vec::new(),
    }
}

/// `relative_import` → (dotted module if any, number of leading dots).
fn relative_parts(node: Node<'_>, source: &str) -> (Option<String>, usize) {
    let mut level = 0;
    let mut module = None;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_prefix" => {
                level = node_text(child, source)
                    .chars()
                    .filter(|c| *c == '.')
                    .count();
            }
            "dotted_name" => module = Some(node_text(child, source)),
            _ => {}
        }
    }
    (module, level)
}
