//! Project-tree reading: discovery, decoding, parallel per-file extraction,
//! containment assembly, and import stitching.
//!
//! Per-file parsing is embarrassingly parallel, so it fans out on a rayon
//! pool where every worker builds its own element map; a sequential merge in
//! sorted path order then assembles the folder tree. Ids are UUIDs, so the
//! merge needs no remapping and the parse phase needs no locks.

use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::analyzer::AnalyzeError;
use crate::config::AnalyzerConfig;
use crate::extract::{FileModels, NodeExtractor};
use crate::model::{Element, ElementData, ElementId, ModelMap};

/// Output of reading a project tree, before the resolution passes.
#[derive(Debug)]
pub struct ReadResult {
    pub models: ModelMap,
    /// Root folder element, absent when the tree contained no modules.
    pub root_id: Option<ElementId>,
    /// Source file path → module element id, in merge (sorted path) order.
    pub module_index: IndexMap<PathBuf, ElementId>,
    /// Module files *and* package directories → element id; superset of
    /// `module_index` used to stitch imports (package imports resolve to
    /// folder elements).
    pub path_index: IndexMap<PathBuf, ElementId>,
    /// Soft per-file failures (decode errors, syntax errors), one line each.
    pub errors: Vec<String>,
}

/// Reads a project directory into the initial element map.
pub struct FolderReader<'a> {
    config: &'a AnalyzerConfig,
    stdlib: &'a HashSet<String>,
}

impl<'a> FolderReader<'a> {
    pub fn new(config: &'a AnalyzerConfig, stdlib: &'a HashSet<String>) -> Self {
        Self { config, stdlib }
    }

    /// Read the tree rooted at `root`. A missing root is the one hard error;
    /// everything per-file is soft and recorded in [`ReadResult::errors`].
    pub fn read(&self, root: &Path) -> Result<ReadResult, AnalyzeError> {
        let root = root
            .canonicalize()
            .map_err(|_| AnalyzeError::RootNotFound(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(AnalyzeError::RootNotFound(root));
        }

        let filter = FileFilter::new(&self.config.include, &self.config.exclude);
        let files = discover_files(&root, &filter);
        debug!(files = files.len(), root = %root.display(), "discovered source files");

        // Fork-join parse: one element map per file, merged afterwards.
        let parsed: Vec<(PathBuf, Result<FileModels, String>)> = files
            .par_iter()
            .map(|path| {
                let result = read_source(path).and_then(|source| {
                    NodeExtractor::new(&root, path, &self.config.extract, self.stdlib)
                        .extract(&source)
                        .map_err(|e| e.to_string())
                });
                (path.clone(), result)
            })
            .collect();

        let mut errors = Vec::new();
        let mut by_path: HashMap<PathBuf, FileModels> = HashMap::new();
        for (path, result) in parsed {
            match result {
                Ok(file_models) => {
                    by_path.insert(path, file_models);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping file");
                    errors.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        let mut models = ModelMap::new();
        let mut module_index = IndexMap::new();
        let mut path_index = IndexMap::new();
        let root_id = self.assemble(
            &root,
            &filter,
            &mut by_path,
            &mut models,
            &mut module_index,
            &mut path_index,
        );

        Ok(ReadResult {
            models,
            root_id,
            module_index,
            path_index,
            errors,
        })
    }

    /// Depth-first containment assembly: files of a directory first, in
    /// sorted path order, then its subdirectories. A folder element is kept
    /// only when at least one module survives somewhere beneath it.
    fn assemble(
        &self,
        dir: &Path,
        filter: &FileFilter,
        parsed: &mut HashMap<PathBuf, FileModels>,
        models: &mut ModelMap,
        module_index: &mut IndexMap<PathBuf, ElementId>,
        path_index: &mut IndexMap<PathBuf, ElementId>,
    ) -> Option<ElementId> {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    subdirs.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files.sort();
        subdirs.sort();

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        let folder = Element::new(name, None, ElementData::Folder);
        let folder_id = folder.id().clone();

        let mut children: Vec<ElementId> = Vec::new();

        for path in files {
            if !filter.matches(&path) {
                continue;
            }
            if let Some(file_models) = parsed.remove(&path) {
                let module_id = file_models.module_id.clone();
                models.merge(file_models.models);
                module_index.insert(path.clone(), module_id.clone());
                path_index.insert(path, module_id.clone());
                children.push(module_id);
            }
        }

        for subdir in subdirs {
            if let Some(child_id) = self.assemble(
                &subdir,
                filter,
                parsed,
                models,
                module_index,
                path_index,
            ) {
                children.push(child_id);
            }
        }

        if children.is_empty() {
            return None;
        }

        models.insert(folder);
        for child in &children {
            models.attach(&folder_id, child);
        }
        path_index.insert(dir.to_path_buf(), folder_id.clone());
        Some(folder_id)
    }
}

/// Attach `module_id` to every local import whose resolved path names an
/// element in the index. Imports resolved to a package directory stitch to
/// that package's folder element; unknown paths stay unstitched.
pub fn stitch_imports(models: &mut ModelMap, path_index: &IndexMap<PathBuf, ElementId>) {
    let ids: Vec<ElementId> = models.iter().map(|(id, _)| id.clone()).collect();
    for id in ids {
        let Some(element) = models.get_mut(&id) else {
            continue;
        };
        if let ElementData::Module { imports, .. } = element.data_mut() {
            for record in imports.iter_mut() {
                if !record.is_local {
                    continue;
                }
                if let Some(path) = &record.path {
                    record.module_id = path_index.get(path).cloned();
                }
            }
        }
    }
}

/// Enumerate candidate source files under `root`, sorted by full path.
fn discover_files(root: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .build();
    for entry in walker {
        let Ok(entry) = entry else {
            continue; // unreadable entry
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if filter.matches(&path) {
            files.push(path);
        }
    }
    files.sort();
    files
}

/// Include/exclude filtering: includes match the file name as globs; an
/// exclude pattern matches by file-name glob or by substring of the full
/// path (so `__pycache__` knocks out whole directories).
struct FileFilter {
    include: Vec<(String, Option<glob::Pattern>)>,
    exclude: Vec<(String, Option<glob::Pattern>)>,
}

impl FileFilter {
    fn new(include: &[String], exclude: &[String]) -> Self {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| (p.clone(), glob::Pattern::new(p).ok()))
                .collect()
        };
        Self {
            include: compile(include),
            exclude: compile(exclude),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let full = path.to_string_lossy();

        let included = self
            .include
            .iter()
            .any(|(_, glob)| glob.as_ref().is_some_and(|g| g.matches(&file_name)));
        if !included {
            return false;
        }

        let excluded = self.exclude.iter().any(|(raw, glob)| {
            full.contains(raw.as_str()) || glob.as_ref().is_some_and(|g| g.matches(&file_name))
        });
        !excluded
    }
}

/// Read a source file as UTF-8, falling back to windows-1251; a second
/// failure is reported as an error so the caller can skip the file.
fn read_source(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            let (text, _, had_errors) = encoding_rs::WINDOWS_1251.decode(e.as_bytes());
            if had_errors {
                Err("not decodable as utf-8 or windows-1251".to_string())
            } else {
                Ok(text.into_owned())
            }
        }
    }
}
