//! Generic dotted-name lookup within a module's scope.

use crate::model::{Element, ElementData, ElementId, ElementKind, ModelMap};

/// Resolves a dotted name against a module's local definitions and imports.
///
/// Lookup order for the head segment: the module's own children first (local
/// definitions shadow imports), then the module's imports in declared order.
/// An import binds under its alias if present, else its imported member
/// name, else the first segment of its module path. Remaining segments
/// descend through children, falling back to each intermediate module's own
/// imports so re-exported chains like `pkg.sub.Class` resolve.
pub struct SymbolResolver<'a> {
    models: &'a ModelMap,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(models: &'a ModelMap) -> Self {
        Self { models }
    }

    /// Resolve `name` in the scope of `context_module_id`. When `expected`
    /// is given, a match of any other kind resolves to `None`.
    pub fn resolve(
        &self,
        name: &str,
        context_module_id: &ElementId,
        expected: Option<ElementKind>,
    ) -> Option<ElementId> {
        let module = self.models.get(context_module_id)?;
        if module.kind() != ElementKind::Module {
            return None;
        }

        let (head, tail) = match name.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (name, None),
        };

        let head_id = self.resolve_head(head, module)?;
        let found = match tail {
            Some(tail) => self.descend(head_id, tail)?,
            None => head_id,
        };

        if let Some(kind) = expected {
            if self.models.get(&found)?.kind() != kind {
                return None;
            }
        }
        Some(found)
    }

    fn resolve_head(&self, head: &str, module: &Element) -> Option<ElementId> {
        if let Some(child) = self.models.find_child(module, head) {
            return Some(child.id().clone());
        }
        self.import_binding(module, head)
    }

    /// The element an import in `element`'s scope binds under `name`:
    /// the target module itself for the import-form, the named child of the
    /// target for the from-form. Scans in declared order; an import whose
    /// target lacks the requested member does not stop the scan.
    fn import_binding(&self, element: &Element, name: &str) -> Option<ElementId> {
        let ElementData::Module { imports, .. } = element.data() else {
            return None;
        };
        for record in imports {
            if record.local_name() != Some(name) {
                continue;
            }
            let Some(module_id) = &record.module_id else {
                continue;
            };
            match &record.name {
                Some(member) => {
                    if let Some(target) = self.models.get(module_id) {
                        if let Some(child) = self.models.find_child(target, member) {
                            return Some(child.id().clone());
                        }
                    }
                }
                None => return Some(module_id.clone()),
            }
        }
        None
    }

    /// Walk the remaining dotted path from `start`, one segment at a time.
    fn descend(&self, start: ElementId, path: &str) -> Option<ElementId> {
        let mut current = start;
        let mut remaining = path;
        loop {
            let (segment, rest) = match remaining.split_once('.') {
                Some((segment, rest)) => (segment, Some(rest)),
                None => (remaining, None),
            };

            let element = self.models.get(&current)?;
            let next = match self.models.find_child(element, segment) {
                Some(child) => child.id().clone(),
                None => self.import_binding(element, segment)?,
            };

            match rest {
                Some(rest) => {
                    current = next;
                    remaining = rest;
                }
                None => return Some(next),
            }
        }
    }
}
