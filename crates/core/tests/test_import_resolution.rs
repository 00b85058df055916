//! Tests for import classification, path resolution, and stitching.
//!
//! Each test creates temp files, then either probes `ImportResolver`
//! directly or runs the full analyzer and inspects the stitched records.

use std::path::{Path, PathBuf};

use codemap_core::{
    default_stdlib, Analyzer, AnalyzerConfig, ElementData, ElementKind, ImportResolver,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn root_of(dir: &TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

fn imports_of(analysis: &codemap_core::Analysis, module_path: &Path) -> Vec<codemap_core::ImportRecord> {
    let module_id = analysis
        .module_index
        .get(module_path)
        .unwrap_or_else(|| panic!("no module for {}", module_path.display()));
    let module = analysis.models.get(module_id).unwrap();
    let ElementData::Module { imports, .. } = module.data() else {
        panic!("expected module data");
    };
    imports.clone()
}

// ── Path resolution ────────────────────────────────────────────────────────

#[test]
fn test_stdlib_import_is_non_local() {
    let dir = TempDir::new().unwrap();
    write(&dir, "os.py", "x = 1\n"); // a trap: name-collides with stdlib
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    assert_eq!(resolver.resolve(Some("os"), 0, &root.join("main.py")), None);
    assert_eq!(
        resolver.resolve(Some("os.path"), 0, &root.join("main.py")),
        None
    );
}

#[test]
fn test_absolute_import_resolves_to_module_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "helpers.py", "def h(): pass\n");
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    assert_eq!(
        resolver.resolve(Some("helpers"), 0, &root.join("main.py")),
        Some(root.join("helpers.py"))
    );
}

#[test]
fn test_package_with_init_marker_resolves_to_directory() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/__init__.py", "");
    write(&dir, "pkg/mod.py", "def f(): pass\n");
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    assert_eq!(
        resolver.resolve(Some("pkg"), 0, &root.join("main.py")),
        Some(root.join("pkg"))
    );
    assert_eq!(
        resolver.resolve(Some("pkg.mod"), 0, &root.join("main.py")),
        Some(root.join("pkg").join("mod.py"))
    );
}

#[test]
fn test_bare_directory_still_resolves_as_last_resort() {
    let dir = TempDir::new().unwrap();
    write(&dir, "plain/mod.py", "def f(): pass\n");
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    // No __init__.py, but the bare directory is still returned.
    assert_eq!(
        resolver.resolve(Some("plain"), 0, &root.join("main.py")),
        Some(root.join("plain"))
    );
}

#[test]
fn test_relative_import_level_one_searches_sibling() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/a.py", "");
    write(&dir, "pkg/sibling.py", "");
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    assert_eq!(
        resolver.resolve(Some("sibling"), 1, &root.join("pkg").join("a.py")),
        Some(root.join("pkg").join("sibling.py"))
    );
}

#[test]
fn test_relative_import_walks_up_level_minus_one() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/helpers.py", "");
    write(&dir, "pkg/sub/a.py", "");
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    // `from ..helpers import h` inside pkg/sub/a.py
    assert_eq!(
        resolver.resolve(
            Some("helpers"),
            2,
            &root.join("pkg").join("sub").join("a.py")
        ),
        Some(root.join("pkg").join("helpers.py"))
    );
}

#[test]
fn test_bare_relative_import_resolves_to_own_package() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/__init__.py", "");
    write(&dir, "pkg/a.py", "");
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    // `from . import x` inside pkg/a.py
    assert_eq!(
        resolver.resolve(None, 1, &root.join("pkg").join("a.py")),
        Some(root.join("pkg"))
    );
}

#[test]
fn test_root_named_package_searches_roots_parent() {
    let dir = TempDir::new().unwrap();
    write(&dir, "myproj/utils.py", "def u(): pass\n");
    let project_root = root_of(&dir).join("myproj");
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&project_root, &stdlib);

    // `import myproj.utils` from inside the myproj root: the first segment
    // equals the root folder name, so the root's parent is also searched.
    assert_eq!(
        resolver.resolve(Some("myproj.utils"), 0, &project_root.join("main.py")),
        Some(project_root.join("utils.py"))
    );
}

#[test]
fn test_unknown_module_is_non_local() {
    let dir = TempDir::new().unwrap();
    let root = root_of(&dir);
    let stdlib = default_stdlib();
    let resolver = ImportResolver::new(&root, &stdlib);

    assert_eq!(
        resolver.resolve(Some("nonexistent_module"), 0, &root.join("main.py")),
        None
    );
}

// ── Classification and stitching through the full pipeline ─────────────────

#[test]
fn test_local_import_is_stitched_to_module_id() {
    let dir = TempDir::new().unwrap();
    write(&dir, "utils.py", "def helper(): pass\n");
    write(&dir, "main.py", "from utils import helper\n");
    let root = root_of(&dir);

    let analysis = Analyzer::new(AnalyzerConfig::default())
        .analyze(dir.path())
        .unwrap();

    let imports = imports_of(&analysis, &root.join("main.py"));
    assert_eq!(imports.len(), 1);
    assert!(imports[0].is_local);
    assert_eq!(imports[0].path.as_deref(), Some(root.join("utils.py").as_path()));

    let utils_id = analysis.module_index.get(&root.join("utils.py")).unwrap();
    assert_eq!(imports[0].module_id.as_ref(), Some(utils_id));
}

#[test]
fn test_stdlib_import_is_not_stitched() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.py", "import os\nimport sys\n");
    let root = root_of(&dir);

    let analysis = Analyzer::new(AnalyzerConfig::default())
        .analyze(dir.path())
        .unwrap();

    for record in imports_of(&analysis, &root.join("main.py")) {
        assert!(!record.is_local);
        assert_eq!(record.path, None);
        assert_eq!(record.module_id, None);
    }
}

#[test]
fn test_package_import_stitches_to_folder_element() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pkg/__init__.py", "");
    write(&dir, "pkg/mod.py", "def f(): pass\n");
    write(&dir, "main.py", "import pkg\n");
    let root = root_of(&dir);

    let analysis = Analyzer::new(AnalyzerConfig::default())
        .analyze(dir.path())
        .unwrap();

    let imports = imports_of(&analysis, &root.join("main.py"));
    let folder_id = imports[0].module_id.as_ref().expect("package not stitched");
    let folder = analysis.models.get(folder_id).unwrap();
    assert_eq!(folder.kind(), ElementKind::Folder);
    assert_eq!(folder.name(), "pkg");
}

#[test]
fn test_unresolvable_import_survives_with_null_module_id() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.py", "from vendored_thing import magic\n\ndef run(): pass\n");
    let root = root_of(&dir);

    let analysis = Analyzer::new(AnalyzerConfig::default())
        .analyze(dir.path())
        .unwrap();

    let imports = imports_of(&analysis, &root.join("main.py"));
    assert_eq!(imports.len(), 1);
    assert!(!imports[0].is_local);
    assert_eq!(imports[0].module_id, None);
}
