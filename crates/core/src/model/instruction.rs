//! Linear, single-assignment IR for statement bodies.

use serde::{Deserialize, Serialize};

/// Operation discriminant of an [`Instruction`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    CallFunction,
    CallMethod,
    Assign,
    GetAttr,
}

/// A flattened statement: nested expressions are lowered into `%tN`
/// temporaries so every instruction has at most one operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instruction {
    /// Destination: a `%tN` temporary or, for `assign`, the bound name.
    pub target: Option<String>,
    pub op: OpKind,
    /// Callee name for calls, attribute name for `get_attr`.
    pub name: Option<String>,
    /// Receiver value for `call_method` / `get_attr`.
    pub base_object: Option<String>,
    /// Temporaries or name references, in evaluation order.
    pub arguments: Vec<String>,
}

impl Instruction {
    pub fn call_function(target: String, name: String, arguments: Vec<String>) -> Self {
        Self {
            target: Some(target),
            op: OpKind::CallFunction,
            name: Some(name),
            base_object: None,
            arguments,
        }
    }

    pub fn call_method(
        target: String,
        name: String,
        base_object: String,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            target: Some(target),
            op: OpKind::CallMethod,
            name: Some(name),
            base_object: Some(base_object),
            arguments,
        }
    }

    pub fn assign(target: String, value: String) -> Self {
        Self {
            target: Some(target),
            op: OpKind::Assign,
            name: None,
            base_object: None,
            arguments: vec![value],
        }
    }

    pub fn get_attr(target: String, name: String, base_object: String) -> Self {
        Self {
            target: Some(target),
            op: OpKind::GetAttr,
            name: Some(name),
            base_object: Some(base_object),
            arguments: Vec::new(),
        }
    }
}
