//! The code model: a flat, insertion-ordered arena of elements keyed by id.
//!
//! Relations (containment, inheritance, calls) are stored as ids rather than
//! references, so mutually importing modules and inheritance cycles are
//! representable without ownership hazards. Walks over the model carry a
//! visited set where cycles are possible.

pub mod element;
pub mod import;
pub mod instruction;

pub use element::{CallSite, Element, ElementData, ElementKind, Parameter, SourceSpan};
pub use import::ImportRecord;
pub use instruction::{Instruction, OpKind};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, process-wide unique identifier of an element.
///
/// Ids are UUID v4 strings, so parallel extraction workers can allocate them
/// without coordination. Ids are never recycled; deletion is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an id string previously produced by this process (e.g. read back
    /// from a resolved `outgoing_calls` entry).
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The flat element map produced by an analysis run.
///
/// Insertion order is preserved (files merge in sorted path order, children
/// follow source order), so iteration and every first-match tie-break in
/// the resolvers is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelMap {
    elements: IndexMap<ElementId, Element>,
}

impl ModelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, returning its id.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = element.id().clone();
        self.elements.insert(id.clone(), element);
        id
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &Element)> {
        self.elements.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Absorb all elements of `other`. Ids are globally unique, so no
    /// remapping is needed; insertion order of `other` is preserved.
    pub fn merge(&mut self, other: ModelMap) {
        self.elements.extend(other.elements);
    }

    /// Link `child` under `parent`: sets the child's `parent_id` and appends
    /// to the parent's `children_ids` (source order).
    pub fn attach(&mut self, parent_id: &ElementId, child_id: &ElementId) {
        if let Some(child) = self.elements.get_mut(child_id) {
            child.set_parent(Some(parent_id.clone()));
        }
        if let Some(parent) = self.elements.get_mut(parent_id) {
            parent.push_child(child_id.clone());
        }
    }

    /// First child of `parent` with the given name, in insertion order.
    pub fn find_child<'a>(&'a self, parent: &Element, name: &str) -> Option<&'a Element> {
        parent
            .children_ids()
            .iter()
            .filter_map(|id| self.elements.get(id))
            .find(|child| child.name() == name)
    }

    /// Nearest ancestor of `id` that is a module, if any.
    pub fn parent_module_of(&self, id: &ElementId) -> Option<ElementId> {
        let mut current = self.elements.get(id)?.parent_id().cloned();
        while let Some(parent_id) = current {
            let parent = self.elements.get(&parent_id)?;
            if parent.kind() == ElementKind::Module {
                return Some(parent_id);
            }
            current = parent.parent_id().cloned();
        }
        None
    }
}
