//! Call-expression scanning inside function bodies: raw callee names,
//! structured call sites, and `self.<attr>` type inference.

use tree_sitter::Node;

use crate::model::CallSite;

/// Raw callee names collected from one function body.
#[derive(Debug, Default)]
pub struct CallNames {
    /// Every emitted form (bare attribute, dotted, `self.`-prefixed, …).
    pub all: Vec<String>,
    /// Plain-name invocations (`foo()`).
    pub func_calls: Vec<String>,
    /// Dotted invocations (`obj.method()`), in their dotted form.
    pub method_calls: Vec<String>,
}

/// Render a name-like expression in its dotted source form:
/// `Name` → `x`, `Attribute` → `a.b`, `Subscript` → `base[]`,
/// `Call` → `target()`. Anything else renders as `unknown`.
pub fn render_name(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "identifier" => node_text(node, source),
        "attribute" => {
            let object = node.child_by_field_name("object");
            let attr = node
                .child_by_field_name("attribute")
                .map(|a| node_text(a, source))
                .unwrap_or_else(|| "unknown".to_string());
            match object {
                Some(obj) => format!("{}.{}", render_name(obj, source), attr),
                None => attr,
            }
        }
        "subscript" => match node.child_by_field_name("value") {
            Some(value) => format!("{}[]", render_name(value, source)),
            None => "unknown".to_string(),
        },
        "call" => match node.child_by_field_name("function") {
            Some(function) => format!("{}()", render_name(function, source)),
            None => "unknown".to_string(),
        },
        _ => "unknown".to_string(),
    }
}

/// Collect raw callee names from every call expression under `node`,
/// skipping nested function/class definitions (their calls belong to the
/// nested scope, not this one).
pub fn collect_call_names(node: Node<'_>, source: &str, names: &mut CallNames) {
    match node.kind() {
        "function_definition" | "class_definition" => return,
        "call" => {
            if let Some(callee) = node.child_by_field_name("function") {
                match callee.kind() {
                    "identifier" => {
                        let name = node_text(callee, source);
                        names.all.push(name.clone());
                        names.func_calls.push(name);
                    }
                    "attribute" => {
                        if let Some(attr) = callee.child_by_field_name("attribute") {
                            let attr = node_text(attr, source);
                            names.all.push(attr.clone());
                            let dotted = match callee.child_by_field_name("object") {
                                Some(obj) => format!("{}.{}", render_name(obj, source), attr),
                                None => attr,
                            };
                            names.all.push(dotted.clone());
                            names.method_calls.push(dotted);
                        }
                    }
                    // `factory()()`: the callee is itself a call; the inner
                    // call is also visited on its own during recursion.
                    "call" => names.all.push(render_name(callee, source)),
                    _ => {}
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_call_names(child, source, names);
    }
}

/// Collect `(expression, line, column)` call sites under `node`, skipping
/// nested definitions. Line is 1-based, column 0-based, both anchored at the
/// callee expression.
pub fn collect_call_sites(node: Node<'_>, source: &str, sites: &mut Vec<CallSite>) {
    match node.kind() {
        "function_definition" | "class_definition" => return,
        "call" => {
            if let Some(callee) = node.child_by_field_name("function") {
                sites.push(CallSite {
                    expression: describe_expression(callee, source),
                    line: callee.start_position().row + 1,
                    column: callee.start_position().column,
                });
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_call_sites(child, source, sites);
    }
}

/// Infer attribute types from `self.<attr> = T(...)` assignments anywhere in
/// a method body. Returns `(attribute, type name)` pairs in encounter order;
/// the caller unions them into the owning class.
pub fn collect_self_attribute_types(node: Node<'_>, source: &str, out: &mut Vec<(String, String)>) {
    if node.kind() == "assignment" {
        if let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) {
            if let (Some(attr), Some(type_name)) = (
                self_attribute_name(left, source),
                constructor_type_name(right, source),
            ) {
                out.push((attr, type_name));
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_self_attribute_types(child, source, out);
    }
}

/// `self.<attr>` target → `attr`, anything else → None.
fn self_attribute_name(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "attribute" {
        return None;
    }
    let object = node.child_by_field_name("object")?;
    if object.kind() != "identifier" || node_text(object, source) != "self" {
        return None;
    }
    node.child_by_field_name("attribute")
        .map(|a| node_text(a, source))
}

/// `T(...)` → `T`, `mod.T(...)` → `mod.T`, anything else → None.
fn constructor_type_name(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "call" {
        return None;
    }
    let callee = node.child_by_field_name("function")?;
    match callee.kind() {
        "identifier" => Some(node_text(callee, source)),
        "attribute" => Some(render_name(callee, source)),
        _ => None,
    }
}

fn describe_expression(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "identifier" => node_text(node, source),
        "attribute" => {
            let attr = node
                .child_by_field_name("attribute")
                .map(|a| node_text(a, source))
                .unwrap_or_else(|| "unknown".to_string());
            match node.child_by_field_name("object") {
                Some(obj) => format!("{}.{}", describe_expression(obj, source), attr),
                None => attr,
            }
        }
        "call" => match node.child_by_field_name("function") {
            Some(function) => describe_expression(function, source),
            None => "unknown".to_string(),
        },
        _ => render_name(node, source),
    }
}

pub(crate) fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn names_for(source: &str) -> CallNames {
        let tree = parse(source);
        let mut names = CallNames::default();
        let mut cursor = tree.root_node().walk();
        for child in tree.root_node().named_children(&mut cursor) {
            collect_call_names(child, source, &mut names);
        }
        names
    }

    #[test]
    fn plain_call_emits_bare_name() {
        let names = names_for("foo(1, 2)\n");
        assert_eq!(names.all, vec!["foo"]);
        assert_eq!(names.func_calls, vec!["foo"]);
    }

    #[test]
    fn method_call_emits_bare_and_dotted_forms() {
        let names = names_for("obj.method()\n");
        assert_eq!(names.all, vec!["method", "obj.method"]);
        assert_eq!(names.method_calls, vec!["obj.method"]);
    }

    #[test]
    fn self_call_renders_with_self_prefix() {
        let names = names_for("self.helper()\n");
        assert!(names.all.contains(&"self.helper".to_string()));
        assert!(names.all.contains(&"helper".to_string()));
    }

    #[test]
    fn chained_receiver_renders_recursively() {
        let names = names_for("self.config.loader.load()\n");
        assert!(names.all.contains(&"self.config.loader.load".to_string()));
        assert!(names.all.contains(&"load".to_string()));
    }

    #[test]
    fn call_returning_callable_gets_parens_suffix() {
        let names = names_for("factory()()\n");
        assert!(names.all.contains(&"factory()".to_string()));
        // The inner call is also collected in its own right.
        assert!(names.all.contains(&"factory".to_string()));
    }

    #[test]
    fn nested_defs_do_not_contribute_calls() {
        let source = "def outer():\n    def inner():\n        hidden()\n    visible()\n";
        let tree = parse(source);
        let module = tree.root_node();
        let outer = module.named_child(0).unwrap();
        let body = outer.child_by_field_name("body").unwrap();
        let mut names = CallNames::default();
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            collect_call_names(child, source, &mut names);
        }
        assert!(names.all.contains(&"visible".to_string()));
        assert!(!names.all.contains(&"hidden".to_string()));
    }

    #[test]
    fn self_assignment_infers_attribute_type() {
        let source = "def __init__(self):\n    self.engine = Engine()\n    self.backup = spare.Engine()\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let mut pairs = Vec::new();
        collect_self_attribute_types(func, source, &mut pairs);
        assert_eq!(
            pairs,
            vec![
                ("engine".to_string(), "Engine".to_string()),
                ("backup".to_string(), "spare.Engine".to_string()),
            ]
        );
    }

    #[test]
    fn plain_local_assignment_is_not_an_attribute_type() {
        let source = "def setup(self):\n    engine = Engine()\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let mut pairs = Vec::new();
        collect_self_attribute_types(func, source, &mut pairs);
        assert!(pairs.is_empty());
    }
}
