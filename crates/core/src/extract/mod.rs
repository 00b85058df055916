//! Per-file extraction: walks one parsed syntax tree and emits the file's
//! element map (module, classes, functions, import records).
//!
//! Extraction mirrors the source's scoping: class and function definitions
//! open a new containment scope, so definitions nested anywhere inside a
//! body (including under `if`/`try` blocks) become children of the
//! innermost enclosing definition. Import statements attach to the module
//! whenever the module is the innermost scope.

pub mod calls;
pub mod imports;
pub mod instructions;

pub use imports::ImportResolver;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::config::ExtractConfig;
use crate::model::{
    Element, ElementData, ElementId, ElementKind, ModelMap, Parameter, SourceSpan,
};
use calls::{node_text, CallNames};
use instructions::InstructionBuilder;

/// Error raised for a single file; the surrounding run treats these as soft
/// and skips the file.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to load python grammar: {0}")]
    Language(String),

    #[error("parser returned no tree for {0}")]
    ParseFailed(PathBuf),

    #[error("syntax error in {0}")]
    Syntax(PathBuf),
}

/// Result of extracting one file: its local element map, rooted at a module.
#[derive(Debug)]
pub struct FileModels {
    pub models: ModelMap,
    pub module_id: ElementId,
}

/// Walks one file's syntax tree and produces its elements.
pub struct NodeExtractor<'a> {
    file_path: &'a Path,
    config: &'a ExtractConfig,
    resolver: ImportResolver<'a>,
}

impl<'a> NodeExtractor<'a> {
    pub fn new(
        project_root: &'a Path,
        file_path: &'a Path,
        config: &'a ExtractConfig,
        stdlib: &'a HashSet<String>,
    ) -> Self {
        Self {
            file_path,
            config,
            resolver: ImportResolver::new(project_root, stdlib),
        }
    }

    /// Parse `source` and extract the file's element map.
    pub fn extract(&self, source: &str) -> Result<FileModels, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ExtractError::Language(e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::ParseFailed(self.file_path.to_path_buf()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ExtractError::Syntax(self.file_path.to_path_buf()));
        }

        let module_name = self
            .file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        let end_line = source.lines().count();
        let module = Element::new(
            module_name,
            Some(SourceSpan::new(self.file_path, 1, end_line)),
            ElementData::module(),
        );

        let mut models = ModelMap::new();
        let module_id = models.insert(module);

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            self.walk(child, &module_id, &mut models, source);
        }

        if self.config.module_instructions {
            let mut cursor = root.walk();
            let statements: Vec<_> = root.named_children(&mut cursor).collect();
            let lowered = InstructionBuilder::new(source).build(statements.into_iter());
            if let Some(ElementData::Module { instructions, .. }) =
                models.get_mut(&module_id).map(|m| m.data_mut())
            {
                *instructions = lowered;
            }
        }

        Ok(FileModels { models, module_id })
    }

    /// Statement dispatch. `parent_id` is the innermost enclosing scope.
    fn walk(&self, node: Node<'_>, parent_id: &ElementId, models: &mut ModelMap, source: &str) {
        match node.kind() {
            "function_definition" => {
                self.extract_function(node, &[], parent_id, models, source);
            }
            "class_definition" => {
                self.extract_class(node, &[], parent_id, models, source);
            }
            "decorated_definition" => {
                let decorators = self.decorator_names(node, source);
                if let Some(definition) = node.child_by_field_name("definition") {
                    match definition.kind() {
                        "function_definition" => {
                            self.extract_function(definition, &decorators, parent_id, models, source);
                        }
                        "class_definition" => {
                            self.extract_class(definition, &decorators, parent_id, models, source);
                        }
                        _ => {}
                    }
                }
            }
            "import_statement" | "import_from_statement" => {
                let is_module = models
                    .get(parent_id)
                    .map(|p| p.kind() == ElementKind::Module)
                    .unwrap_or(false);
                if is_module {
                    let records =
                        imports::records_from_statement(node, source, &self.resolver, self.file_path);
                    if let Some(ElementData::Module { imports, .. }) =
                        models.get_mut(parent_id).map(|m| m.data_mut())
                    {
                        imports.extend(records);
                    }
                }
            }
            _ => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.walk(child, parent_id, models, source);
                }
            }
        }
    }

    fn extract_class(
        &self,
        node: Node<'_>,
        decorators: &[String],
        parent_id: &ElementId,
        models: &mut ModelMap,
        source: &str,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, source);

        let mut data = ElementData::class();
        if let ElementData::Class {
            decorator_list,
            unresolved_base_classes,
            ..
        } = &mut data
        {
            if self.config.classes.decorator_list {
                *decorator_list = decorators.to_vec();
            }
            if self.config.classes.base_classes {
                *unresolved_base_classes = self.base_class_names(node, source);
            }
        }

        let element = Element::new(name, Some(self.span_of(node)), data);
        let class_id = models.insert(element);
        models.attach(parent_id, &class_id);

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                self.walk(child, &class_id, models, source);
            }
        }
    }

    fn extract_function(
        &self,
        node: Node<'_>,
        decorators: &[String],
        parent_id: &ElementId,
        models: &mut ModelMap,
        source: &str,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, source);
        let body = node.child_by_field_name("body");

        let mut data = ElementData::function();
        if let ElementData::Function {
            decorator_list,
            parameters,
            outgoing_calls,
            outgoing_func_calls,
            outgoing_method_calls,
            call_sites,
            instructions,
        } = &mut data
        {
            if self.config.functions.decorator_list {
                *decorator_list = decorators.to_vec();
            }
            if self.config.functions.parameters {
                *parameters = self.parameter_names(node, source);
            }
            if self.config.functions.outgoing_calls {
                let mut names = CallNames::default();
                if let Some(body) = body {
                    let mut cursor = body.walk();
                    for child in body.named_children(&mut cursor) {
                        calls::collect_call_names(child, source, &mut names);
                    }
                }
                // Decorators are call sites on the defining scope.
                if self.config.functions.decorator_list {
                    names.all.extend(decorators.iter().cloned());
                }
                *outgoing_calls = dedup_sorted(names.all);
                *outgoing_func_calls = dedup_sorted(names.func_calls);
                *outgoing_method_calls = dedup_sorted(names.method_calls);
            }
            if self.config.functions.call_sites {
                if let Some(body) = body {
                    let mut cursor = body.walk();
                    for child in body.named_children(&mut cursor) {
                        calls::collect_call_sites(child, source, call_sites);
                    }
                }
            }
            if self.config.functions.instructions {
                if let Some(body) = body {
                    let mut cursor = body.walk();
                    let statements: Vec<_> = body.named_children(&mut cursor).collect();
                    *instructions = InstructionBuilder::new(source).build(statements.into_iter());
                }
            }
        }

        let element = Element::new(name, Some(self.span_of(node)), data);
        let function_id = models.insert(element);
        models.attach(parent_id, &function_id);

        // Method bodies feed the owning class's attribute-type table.
        let parent_is_class = models
            .get(parent_id)
            .map(|p| p.kind() == ElementKind::Class)
            .unwrap_or(false);
        if parent_is_class {
            let mut pairs = Vec::new();
            calls::collect_self_attribute_types(node, source, &mut pairs);
            if !pairs.is_empty() {
                if let Some(ElementData::Class {
                    attribute_types, ..
                }) = models.get_mut(parent_id).map(|p| p.data_mut())
                {
                    for (attr, type_name) in pairs {
                        let entry = attribute_types.entry(attr).or_default();
                        if !entry.contains(&type_name) {
                            entry.push(type_name);
                            entry.sort();
                        }
                    }
                }
            }
        }

        // Nested definitions become children of this function.
        if let Some(body) = body {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                self.walk(child, &function_id, models, source);
            }
        }
    }

    /// Base-class expressions in source form, skipping keyword arguments
    /// such as `metaclass=`.
    fn base_class_names(&self, node: Node<'_>, source: &str) -> Vec<String> {
        let Some(superclasses) = node.child_by_field_name("superclasses") else {
            return Vec::new();
        };
        let mut cursor = superclasses.walk();
        superclasses
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "keyword_argument" && c.kind() != "comment")
            .map(|c| calls::render_name(c, source))
            .collect()
    }

    /// Simple-name decorators only; `@app.route(...)` and other compound
    /// decorator expressions are ignored.
    fn decorator_names(&self, node: Node<'_>, source: &str) -> Vec<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .filter_map(|d| {
                let expr = d.named_child(0)?;
                if expr.kind() == "identifier" {
                    Some(node_text(expr, source))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Positional parameter names; splats, separators, and keyword-only
    /// markers are skipped.
    fn parameter_names(&self, node: Node<'_>, source: &str) -> Vec<Parameter> {
        let Some(parameters) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = parameters.walk();
        parameters
            .named_children(&mut cursor)
            .filter_map(|p| match p.kind() {
                "identifier" => Some(node_text(p, source)),
                "typed_parameter" => {
                    let inner = p.named_child(0)?;
                    (inner.kind() == "identifier").then(|| node_text(inner, source))
                }
                "default_parameter" | "typed_default_parameter" => p
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| node_text(n, source)),
                _ => None,
            })
            .map(|name| Parameter { name })
            .collect()
    }

    fn span_of(&self, node: Node<'_>) -> SourceSpan {
        SourceSpan::new(
            self.file_path,
            node.start_position().row + 1,
            node.end_position().row + 1,
        )
    }
}

fn dedup_sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}
