//! Lowering of statement bodies into linear single-assignment IR.
//!
//! Nested call expressions are flattened into `%tN` temporaries, one
//! operation per instruction; descent stops at nested function and class
//! definitions, which lower in their own scope.

use tree_sitter::Node;

use super::calls::node_text;
use crate::model::Instruction;

pub struct InstructionBuilder<'a> {
    source: &'a str,
    instructions: Vec<Instruction>,
    temp_count: usize,
}

impl<'a> InstructionBuilder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            instructions: Vec::new(),
            temp_count: 0,
        }
    }

    /// Lower the given statements, in order, and return the instruction list.
    pub fn build(mut self, statements: impl Iterator<Item = Node<'a>>) -> Vec<Instruction> {
        for statement in statements {
            self.visit(statement);
        }
        self.instructions
    }

    fn new_temp(&mut self) -> String {
        self.temp_count += 1;
        format!("%t{}", self.temp_count)
    }

    /// Visit a node, emitting instructions for its effects. The returned
    /// string is the value reference for expression nodes: a temporary, a
    /// name, or the literal source text.
    fn visit(&mut self, node: Node<'a>) -> Option<String> {
        match node.kind() {
            // Nested scopes lower separately.
            "function_definition" | "class_definition" | "decorated_definition" => None,

            "expression_statement" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.visit(child);
                }
                None
            }

            "assignment" => {
                self.visit_assignment(node);
                None
            }

            "call" => Some(self.visit_call(node)),

            "attribute" => {
                let base = self
                    .visit_value(node.child_by_field_name("object"))
                    .unwrap_or_else(|| "unknown".to_string());
                let attr = node
                    .child_by_field_name("attribute")
                    .map(|a| node_text(a, self.source))
                    .unwrap_or_else(|| "unknown".to_string());
                let target = self.new_temp();
                self.instructions
                    .push(Instruction::get_attr(target.clone(), attr, base));
                Some(target)
            }

            "identifier" => Some(node_text(node, self.source)),

            "string" | "integer" | "float" | "true" | "false" | "none" => {
                Some(node_text(node, self.source))
            }

            // Compound statements and operators: lower any nested calls,
            // reference the whole expression by its source text.
            _ => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.visit(child);
                }
                if node.is_named() && node.kind().ends_with("_statement") {
                    None
                } else {
                    Some(node_text(node, self.source))
                }
            }
        }
    }

    fn visit_assignment(&mut self, node: Node<'a>) {
        let Some(right) = node.child_by_field_name("right") else {
            return; // bare annotation, no value
        };
        let value = self
            .visit(right)
            .unwrap_or_else(|| node_text(right, self.source));

        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        match left.kind() {
            "identifier" => {
                self.instructions
                    .push(Instruction::assign(node_text(left, self.source), value));
            }
            "pattern_list" => {
                let mut cursor = left.walk();
                for target in left.named_children(&mut cursor) {
                    if target.kind() == "identifier" {
                        self.instructions.push(Instruction::assign(
                            node_text(target, self.source),
                            value.clone(),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_call(&mut self, node: Node<'a>) -> String {
        let mut arguments = Vec::new();
        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for arg in args.named_children(&mut cursor) {
                if arg.kind() == "keyword_argument" || arg.kind() == "comment" {
                    continue;
                }
                let value = self
                    .visit(arg)
                    .unwrap_or_else(|| node_text(arg, self.source));
                arguments.push(value);
            }
        }

        match node.child_by_field_name("function") {
            Some(callee) if callee.kind() == "attribute" => {
                let base = self
                    .visit_value(callee.child_by_field_name("object"))
                    .unwrap_or_else(|| "unknown".to_string());
                let name = callee
                    .child_by_field_name("attribute")
                    .map(|a| node_text(a, self.source))
                    .unwrap_or_else(|| "unknown".to_string());
                let target = self.new_temp();
                self.instructions.push(Instruction::call_method(
                    target.clone(),
                    name,
                    base,
                    arguments,
                ));
                target
            }
            Some(callee) if callee.kind() == "identifier" => {
                let target = self.new_temp();
                self.instructions.push(Instruction::call_function(
                    target.clone(),
                    node_text(callee, self.source),
                    arguments,
                ));
                target
            }
            Some(callee) => {
                // e.g. `factory()()`: lower the inner expression, but the
                // outer call has no simple name to record.
                self.visit(callee);
                self.new_temp()
            }
            None => self.new_temp(),
        }
    }

    fn visit_value(&mut self, node: Option<Node<'a>>) -> Option<String> {
        node.and_then(|n| self.visit(n))
    }
}
