//! Codemap Core - Symbol-resolution graph engine for Python codebases
//!
//! This crate turns a directory tree of Python sources into a flat,
//! cross-referenced element map:
//! - Per-file extraction via Tree-sitter (modules, classes, functions,
//!   imports)
//! - Path-based import classification and resolution inside the project
//! - Cross-file base-class resolution
//! - Call-target resolution, including `self.` dispatch through the class
//!   hierarchy and inferred attribute types

pub mod analyzer;
pub mod config;
pub mod extract;
pub mod model;
pub mod output;
pub mod reader;
pub mod resolve;
pub mod stdlib;

pub use analyzer::{validate_containment, Analysis, AnalyzeError, Analyzer};
pub use config::{AnalyzerConfig, ClassAttrs, ExtractConfig, FunctionAttrs};
pub use extract::{ExtractError, FileModels, ImportResolver, NodeExtractor};
pub use model::{
    CallSite, Element, ElementData, ElementId, ElementKind, ImportRecord, Instruction, ModelMap,
    OpKind, Parameter, SourceSpan,
};
pub use output::{OutputConfig, OutputError, OutputFormat};
pub use reader::{stitch_imports, FolderReader, ReadResult};
pub use resolve::{CallResolver, DefinitionLocation, DefinitionOracle, HierarchyResolver, SymbolResolver};
pub use stdlib::default_stdlib;

/// Codemap version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
