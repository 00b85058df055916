//! Resolution passes over the merged element map.
//!
//! Each pass runs to completion before the next begins: symbol lookup is the
//! shared primitive, hierarchy resolution fills `base_classes`, and call
//! resolution rewrites `outgoing_calls` into element ids. The passes plan
//! their updates against an immutable view and apply them afterwards, so no
//! element is observed half-mutated.

pub mod calls;
pub mod hierarchy;
pub mod symbols;

pub use calls::{CallResolver, DefinitionLocation, DefinitionOracle};
pub use hierarchy::HierarchyResolver;
pub use symbols::SymbolResolver;
