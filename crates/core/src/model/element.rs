//! Element variants and their per-kind payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{ElementId, ImportRecord, Instruction};

/// A node in the code model: folder, module (file), class, or function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Element {
    id: ElementId,
    name: String,
    parent_id: Option<ElementId>,
    children_ids: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_span: Option<SourceSpan>,
    #[serde(flatten)]
    data: ElementData,
}

impl Element {
    pub fn new(name: impl Into<String>, source_span: Option<SourceSpan>, data: ElementData) -> Self {
        Self {
            id: ElementId::new(),
            name: name.into(),
            parent_id: None,
            children_ids: Vec::new(),
            source_span,
            data,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<&ElementId> {
        self.parent_id.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent_id = parent;
    }

    pub fn children_ids(&self) -> &[ElementId] {
        &self.children_ids
    }

    pub fn push_child(&mut self, child: ElementId) {
        self.children_ids.push(child);
    }

    pub fn source_span(&self) -> Option<&SourceSpan> {
        self.source_span.as_ref()
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    pub fn kind(&self) -> ElementKind {
        match self.data {
            ElementData::Folder => ElementKind::Folder,
            ElementData::Module { .. } => ElementKind::Module,
            ElementData::Class { .. } => ElementKind::Class,
            ElementData::Function { .. } => ElementKind::Function,
        }
    }
}

/// Discriminant of an element variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Folder,
    /// A single source file.
    #[serde(rename = "file")]
    Module,
    Class,
    Function,
}

/// Kind-specific payload, flattened into the element on serialization under
/// the `element_type` tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "element_type", rename_all = "snake_case")]
pub enum ElementData {
    Folder,
    #[serde(rename = "file")]
    Module {
        /// Import records in declaration order. Duplicates are retained.
        imports: Vec<ImportRecord>,
        /// Linear IR of top-level statements, when enabled.
        instructions: Vec<Instruction>,
    },
    Class {
        decorator_list: Vec<String>,
        /// Original base-class source string → resolved class id.
        /// Disjoint from `unresolved_base_classes` after hierarchy
        /// resolution; insertion follows source order of the bases.
        base_classes: IndexMap<String, ElementId>,
        /// Base-class names, as written in source, not yet (or never)
        /// resolved to a class in the project.
        unresolved_base_classes: Vec<String>,
        /// Attribute name → type-name candidates inferred from
        /// `self.<attr> = T(...)` assignments in method bodies.
        attribute_types: IndexMap<String, Vec<String>>,
    },
    Function {
        decorator_list: Vec<String>,
        parameters: Vec<Parameter>,
        /// Before call resolution: raw callee name strings, de-duplicated
        /// and sorted. After: resolved target element ids, sorted;
        /// unresolved entries are dropped.
        outgoing_calls: Vec<String>,
        /// Raw plain-name call targets (never rewritten).
        outgoing_func_calls: Vec<String>,
        /// Raw dotted call targets (never rewritten).
        outgoing_method_calls: Vec<String>,
        /// Structured call occurrences, when enabled.
        call_sites: Vec<CallSite>,
        /// Linear IR of the body, when enabled.
        instructions: Vec<Instruction>,
    },
}

impl ElementData {
    pub fn module() -> Self {
        ElementData::Module {
            imports: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn class() -> Self {
        ElementData::Class {
            decorator_list: Vec::new(),
            base_classes: IndexMap::new(),
            unresolved_base_classes: Vec::new(),
            attribute_types: IndexMap::new(),
        }
    }

    pub fn function() -> Self {
        ElementData::Function {
            decorator_list: Vec::new(),
            parameters: Vec::new(),
            outgoing_calls: Vec::new(),
            outgoing_func_calls: Vec::new(),
            outgoing_method_calls: Vec::new(),
            call_sites: Vec::new(),
            instructions: Vec::new(),
        }
    }
}

/// Location of an element in its source file. Lines are 1-based, inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSpan {
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceSpan {
    pub fn new(file_path: impl Into<PathBuf>, start_line: usize, end_line: usize) -> Self {
        Self {
            file_path: file_path.into(),
            start_line,
            end_line,
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// A positional function parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub name: String,
}

/// One invocation occurrence inside a function body. The column is 0-based,
/// the line 1-based, both pointing at the callee expression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallSite {
    pub expression: String,
    pub line: usize,
    pub column: usize,
}
