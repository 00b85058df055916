//! Call-target resolution: rewrites each function's raw callee names into
//! the ids of their defining elements.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SymbolResolver;
use crate::model::{CallSite, ElementData, ElementId, ElementKind, ModelMap};

/// A companion semantic engine that can jump from a call site to its
/// definition. Optional: resolution always has the name-based heuristics to
/// fall back on, so an oracle only sharpens results.
pub trait DefinitionOracle: Send + Sync {
    /// Definition site for the call at `(file, line, column)`, if known.
    fn definition(&self, file: &Path, line: usize, column: usize) -> Option<DefinitionLocation>;
}

/// A definition position reported by a [`DefinitionOracle`].
#[derive(Debug, Clone)]
pub struct DefinitionLocation {
    pub file: PathBuf,
    pub line: usize,
}

/// Resolves every function's outgoing calls.
///
/// Heuristics, in order, first success wins:
/// 1. `self.method`: depth-first walk of the owning class and its resolved
///    bases (cycle-safe).
/// 2. `self.attr.method`: follows inferred attribute types through the
///    chain.
/// 3. Unqualified names: symbol lookup in the containing module, functions
///    preferred over classes.
/// 4. `Object.method`: `Object` matching a class name anywhere in the
///    model, `method` a direct child.
/// 5. Any dotted path: full symbol lookup through imports.
///
/// Resolved ids replace the raw strings as a sorted, de-duplicated list;
/// unresolved entries are dropped.
pub struct CallResolver<'a> {
    oracle: Option<&'a dyn DefinitionOracle>,
}

impl<'a> CallResolver<'a> {
    pub fn new() -> Self {
        Self { oracle: None }
    }

    pub fn with_oracle(oracle: &'a dyn DefinitionOracle) -> Self {
        Self {
            oracle: Some(oracle),
        }
    }

    pub fn run(&self, models: &mut ModelMap) {
        let mut updates: Vec<(ElementId, Vec<String>)> = Vec::new();
        {
            let resolver = SymbolResolver::new(models);
            for (function_id, element) in models.iter() {
                let ElementData::Function {
                    outgoing_calls,
                    decorator_list,
                    call_sites,
                    ..
                } = element.data()
                else {
                    continue;
                };

                let mut resolved: BTreeSet<ElementId> = BTreeSet::new();
                if self.oracle.is_some() && !call_sites.is_empty() {
                    for site in call_sites {
                        if let Some(target) =
                            self.resolve_call_site(site, function_id, models, &resolver)
                        {
                            resolved.insert(target);
                        }
                    }
                    for decorator in decorator_list {
                        if let Some(target) =
                            self.resolve_name(decorator, function_id, models, &resolver)
                        {
                            resolved.insert(target);
                        }
                    }
                } else {
                    for name in outgoing_calls {
                        if let Some(target) =
                            self.resolve_name(name, function_id, models, &resolver)
                        {
                            resolved.insert(target);
                        }
                    }
                }

                updates.push((
                    function_id.clone(),
                    resolved
                        .into_iter()
                        .map(|id| id.as_str().to_string())
                        .collect(),
                ));
            }
        }

        debug!(functions = updates.len(), "call resolution complete");

        for (function_id, calls) in updates {
            if let Some(ElementData::Function { outgoing_calls, .. }) =
                models.get_mut(&function_id).map(|e| e.data_mut())
            {
                *outgoing_calls = calls;
            }
        }
    }

    fn resolve_name(
        &self,
        name: &str,
        function_id: &ElementId,
        models: &ModelMap,
        resolver: &SymbolResolver<'_>,
    ) -> Option<ElementId> {
        if let Some(rest) = name.strip_prefix("self.") {
            let class_id = owning_class(models, function_id)?;
            return if rest.contains('.') {
                // self.attr[.attr...].method: follow attribute types
                let segments: Vec<&str> = rest.split('.').collect();
                let (method, chain) = segments.split_last()?;
                self.resolve_attribute_chain(models, resolver, &class_id, chain, method)
            } else {
                // self.method: dispatch through the hierarchy
                let mut visited = HashSet::new();
                mro_lookup(models, &class_id, rest, &mut visited)
            };
        }

        let module_id = models.parent_module_of(function_id)?;

        if !name.contains('.') {
            // Class names are callable: constructor calls map to the class.
            return resolver
                .resolve(name, &module_id, Some(ElementKind::Function))
                .or_else(|| resolver.resolve(name, &module_id, Some(ElementKind::Class)));
        }

        // Object.method where Object names a class anywhere in the model.
        if let Some((object, method)) = name.split_once('.') {
            if !method.contains('.') {
                for (_, element) in models.iter() {
                    if element.kind() == ElementKind::Class && element.name() == object {
                        if let Some(found) = method_in_class(models, element.id(), method) {
                            return Some(found);
                        }
                    }
                }
            }
        }

        // Full dotted path through imports.
        resolver
            .resolve(name, &module_id, Some(ElementKind::Function))
            .or_else(|| resolver.resolve(name, &module_id, Some(ElementKind::Class)))
    }

    /// Follow an inferred attribute chain from `class_id`: each link maps an
    /// attribute to its candidate type classes; the tail looks up `method`.
    /// Any successful path wins.
    fn resolve_attribute_chain(
        &self,
        models: &ModelMap,
        resolver: &SymbolResolver<'_>,
        class_id: &ElementId,
        chain: &[&str],
        method: &str,
    ) -> Option<ElementId> {
        let (first, rest) = chain.split_first()?;
        let element = models.get(class_id)?;
        let ElementData::Class {
            attribute_types, ..
        } = element.data()
        else {
            return None;
        };
        let type_names = attribute_types.get(*first)?;
        let module_id = models.parent_module_of(class_id)?;

        for type_name in type_names {
            let Some(type_class_id) =
                resolver.resolve(type_name, &module_id, Some(ElementKind::Class))
            else {
                continue;
            };
            let found = if rest.is_empty() {
                method_in_class(models, &type_class_id, method)
            } else {
                self.resolve_attribute_chain(models, resolver, &type_class_id, rest, method)
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Precise mode: `self.`-dispatch first, then the oracle, then the
    /// name heuristics on the site's expression.
    fn resolve_call_site(
        &self,
        site: &CallSite,
        function_id: &ElementId,
        models: &ModelMap,
        resolver: &SymbolResolver<'_>,
    ) -> Option<ElementId> {
        if site.expression.starts_with("self.") {
            if let Some(target) =
                self.resolve_name(&site.expression, function_id, models, resolver)
            {
                return Some(target);
            }
        }

        if let Some(oracle) = self.oracle {
            let file = models
                .get(function_id)
                .and_then(|f| f.source_span())
                .map(|span| span.file_path.clone());
            if let Some(file) = file {
                if let Some(location) = oracle.definition(&file, site.line, site.column) {
                    if let Some(target) =
                        function_at_location(models, &location.file, location.line)
                    {
                        return Some(target);
                    }
                }
            }
        }

        self.resolve_name(&site.expression, function_id, models, resolver)
    }
}

impl Default for CallResolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// The class that syntactically contains `function_id`, if its direct
/// parent is one.
fn owning_class(models: &ModelMap, function_id: &ElementId) -> Option<ElementId> {
    let parent_id = models.get(function_id)?.parent_id()?;
    let parent = models.get(parent_id)?;
    (parent.kind() == ElementKind::Class).then(|| parent_id.clone())
}

/// Depth-first method lookup through a class and its resolved bases.
/// `visited` guards against inheritance cycles.
fn mro_lookup(
    models: &ModelMap,
    class_id: &ElementId,
    method: &str,
    visited: &mut HashSet<ElementId>,
) -> Option<ElementId> {
    if !visited.insert(class_id.clone()) {
        return None;
    }
    if let Some(found) = method_in_class(models, class_id, method) {
        return Some(found);
    }
    let ElementData::Class { base_classes, .. } = models.get(class_id)?.data() else {
        return None;
    };
    for base_id in base_classes.values() {
        if let Some(found) = mro_lookup(models, base_id, method, visited) {
            return Some(found);
        }
    }
    None
}

/// Direct function child of `class_id` named `method`.
fn method_in_class(models: &ModelMap, class_id: &ElementId, method: &str) -> Option<ElementId> {
    let class = models.get(class_id)?;
    class
        .children_ids()
        .iter()
        .filter_map(|id| models.get(id))
        .find(|child| child.kind() == ElementKind::Function && child.name() == method)
        .map(|child| child.id().clone())
}

/// The function whose span covers `line` in `file`, in model order.
fn function_at_location(models: &ModelMap, file: &Path, line: usize) -> Option<ElementId> {
    for (id, element) in models.iter() {
        if element.kind() != ElementKind::Function {
            continue;
        }
        let Some(span) = element.source_span() else {
            continue;
        };
        if span.file_path == file && span.contains_line(line) {
            return Some(id.clone());
        }
    }
    None
}
