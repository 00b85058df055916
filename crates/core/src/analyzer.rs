//! The analysis pipeline: reading, stitching, hierarchy, calls.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::model::{ElementId, ModelMap};
use crate::reader::{stitch_imports, FolderReader};
use crate::resolve::{CallResolver, DefinitionOracle, HierarchyResolver};
use crate::stdlib::default_stdlib;

/// Hard errors of an analysis run. Per-file problems are soft and end up in
/// [`Analysis::errors`] instead.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("project root {0} does not exist")]
    RootNotFound(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The frozen result of an analysis run.
#[derive(Debug)]
pub struct Analysis {
    /// Flat element map keyed by id. No element is mutated after call
    /// resolution finishes.
    pub models: ModelMap,
    /// Root folder element, absent when no module was found.
    pub root_id: Option<ElementId>,
    /// Source file path → module element id.
    pub module_index: IndexMap<PathBuf, ElementId>,
    /// Per-file soft failures, one line each.
    pub errors: Vec<String>,
}

/// Runs the full pipeline over a project directory.
///
/// Passes execute strictly in order: folder reading (which classifies
/// imports), import stitching, hierarchy resolution, call resolution. Each
/// running to completion before the next begins; call resolution reads the
/// `base_classes` filled by hierarchy resolution.
pub struct Analyzer {
    config: AnalyzerConfig,
    stdlib: HashSet<String>,
    oracle: Option<Box<dyn DefinitionOracle>>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            stdlib: default_stdlib(),
            oracle: None,
        }
    }

    /// Replace the standard-library module-name set used for import
    /// classification.
    pub fn with_stdlib(mut self, stdlib: HashSet<String>) -> Self {
        self.stdlib = stdlib;
        self
    }

    /// Attach a semantic engine for precise call resolution. Only consulted
    /// for functions that carry call sites; heuristics remain the fallback.
    pub fn with_oracle(mut self, oracle: Box<dyn DefinitionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the project rooted at `root` and return the frozen model.
    pub fn analyze(&self, root: &Path) -> Result<Analysis, AnalyzeError> {
        let reader = FolderReader::new(&self.config, &self.stdlib);
        let mut read = reader.read(root)?;

        debug!(elements = read.models.len(), "stitching imports");
        stitch_imports(&mut read.models, &read.path_index);

        debug!("resolving class hierarchy");
        HierarchyResolver::run(&mut read.models);

        debug!("resolving calls");
        match &self.oracle {
            Some(oracle) => CallResolver::with_oracle(oracle.as_ref()).run(&mut read.models),
            None => CallResolver::new().run(&mut read.models),
        }

        Ok(Analysis {
            models: read.models,
            root_id: read.root_id,
            module_index: read.module_index,
            errors: read.errors,
        })
    }
}

/// Consistency check used by tests and debug assertions: every parent/child
/// link must be mirrored on both sides.
pub fn validate_containment(models: &ModelMap) -> Result<(), String> {
    for (id, element) in models.iter() {
        if let Some(parent_id) = element.parent_id() {
            let parent = models
                .get(parent_id)
                .ok_or_else(|| format!("{}: dangling parent {}", id, parent_id))?;
            if !parent.children_ids().contains(id) {
                return Err(format!("{}: not listed in parent {}", id, parent_id));
            }
        }
        for child_id in element.children_ids() {
            let child = models
                .get(child_id)
                .ok_or_else(|| format!("{}: dangling child {}", id, child_id))?;
            if child.parent_id() != Some(id) {
                return Err(format!("{}: child {} points elsewhere", id, child_id));
            }
        }
    }
    Ok(())
}
