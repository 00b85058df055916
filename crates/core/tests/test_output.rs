//! Tests for element-map serialization and field selection.

use std::path::PathBuf;

use codemap_core::{
    Analysis, Analyzer, AnalyzerConfig, ElementKind, OutputConfig, OutputFormat,
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

fn analyze(dir: &TempDir) -> Analysis {
    Analyzer::new(AnalyzerConfig::default())
        .analyze(dir.path())
        .unwrap()
}

fn sample_analysis(dir: &TempDir) -> Analysis {
    write(&dir, "base.py", "class Animal:\n    pass\n");
    write(
        &dir,
        "dog.py",
        "from base import Animal\n\nclass Dog(Animal):\n    def bark(self):\n        pass\n",
    );
    analyze(dir)
}

#[test]
fn test_json_output_is_keyed_by_id_with_type_tags() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let rendered = OutputConfig::default().render(&analysis.models).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), analysis.models.len());

    for (id, element) in map {
        assert_eq!(element["id"], *id);
        let tag = element["element_type"].as_str().unwrap();
        assert!(matches!(tag, "folder" | "file" | "class" | "function"));
    }

    // Modules carry their imports; classes their base mappings.
    let dog = map
        .values()
        .find(|e| e["element_type"] == "class" && e["name"] == "Dog")
        .unwrap();
    assert!(dog["base_classes"]["Animal"].is_string());
    assert_eq!(dog["unresolved_base_classes"].as_array().unwrap().len(), 0);
}

#[test]
fn test_compact_json_is_single_line() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let config = OutputConfig {
        pretty: false,
        ..OutputConfig::default()
    };
    let rendered = config.render(&analysis.models).unwrap();
    assert_eq!(rendered.lines().count(), 1);
}

#[test]
fn test_yaml_output_parses_back() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let config = OutputConfig {
        format: OutputFormat::Yaml,
        ..OutputConfig::default()
    };
    let rendered = config.render(&analysis.models).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
    assert!(value.as_mapping().is_some());
}

#[test]
fn test_field_toggles_drop_fields() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let config = OutputConfig {
        include_source_span: false,
        include_children: false,
        include_parent: false,
        include_imports: false,
        include_base_classes: false,
        include_outgoing_calls: false,
        ..OutputConfig::default()
    };
    let rendered = config.render(&analysis.models).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    for element in value.as_object().unwrap().values() {
        let fields = element.as_object().unwrap();
        for dropped in [
            "source_span",
            "children_ids",
            "parent_id",
            "imports",
            "base_classes",
            "unresolved_base_classes",
            "outgoing_calls",
        ] {
            assert!(!fields.contains_key(dropped), "{} not dropped", dropped);
        }
        assert!(fields.contains_key("name"));
    }
}

#[test]
fn test_include_types_filters_elements() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let config = OutputConfig {
        include_types: Some(vec![ElementKind::Class]),
        ..OutputConfig::default()
    };
    let rendered = config.render(&analysis.models).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    let map = value.as_object().unwrap();
    assert!(!map.is_empty());
    for element in map.values() {
        assert_eq!(element["element_type"], "class");
    }
}

#[test]
fn test_exclude_files_filters_by_substring() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let config = OutputConfig {
        exclude_files: vec!["dog".to_string()],
        ..OutputConfig::default()
    };
    let rendered = config.render(&analysis.models).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    for element in value.as_object().unwrap().values() {
        if let Some(span) = element.get("source_span") {
            if span.is_object() {
                let file = span["file_path"].as_str().unwrap();
                assert!(!file.contains("dog"), "dog.py element leaked: {}", file);
            }
        }
    }
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let analysis = sample_analysis(&dir);

    let out = dir.path().join("out/nested/result.json");
    OutputConfig::default().write(&analysis.models, &out).unwrap();
    let content = std::fs::read_to_string(&out).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
}
