//! Loading each supported structured format (JSON, YAML, INI) as a source.

#![allow(clippy::pedantic)]

use envcompose::{ComposeOptions, ConfigComposer, SerdeSchema, SourceDescriptor};
use serde::Deserialize;
use std::io::Write;
use tempfile::tempdir;

#[derive(Debug, Deserialize, PartialEq)]
struct Database {
    host: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct DbConfig {
    database: Database,
}

fn write(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::File::create(&path).unwrap().write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn loads_a_json_source() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "config.json", r#"{"database": {"host": "from-json"}}"#);

    let options = ComposeOptions::new().no_env().source(SourceDescriptor::file(path));
    let schema = SerdeSchema::<DbConfig>::new();
    let composed = ConfigComposer::compose(&options, &schema).unwrap();
    assert_eq!(composed.config.database.host, "from-json");
}

#[cfg(feature = "yaml")]
#[test]
fn loads_a_yaml_source() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "config.yaml", "database:\n  host: from-yaml\n");

    let options = ComposeOptions::new().no_env().source(SourceDescriptor::file(path));
    let schema = SerdeSchema::<DbConfig>::new();
    let composed = ConfigComposer::compose(&options, &schema).unwrap();
    assert_eq!(composed.config.database.host, "from-yaml");
}

#[cfg(feature = "ini")]
#[test]
fn loads_an_ini_source_with_sections_as_nested_objects() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "config.ini", "[database]\nhost=from-ini\n");

    let options = ComposeOptions::new().no_env().source(SourceDescriptor::file(path));
    let schema = SerdeSchema::<DbConfig>::new();
    let composed = ConfigComposer::compose(&options, &schema).unwrap();
    assert_eq!(composed.config.database.host, "from-ini");
}

#[test]
#[cfg(feature = "yaml")]
fn later_source_format_can_differ_from_earlier_one() {
    let dir = tempdir().unwrap();
    let json_path = write(dir.path(), "base.json", r#"{"database": {"host": "base"}}"#);
    let yaml_path = write(dir.path(), "override.yaml", "database:\n  host: overridden\n");

    let options = ComposeOptions::new()
        .no_env()
        .source(SourceDescriptor::file(json_path))
        .source(SourceDescriptor::file(yaml_path));
    let schema = SerdeSchema::<DbConfig>::new();
    let composed = ConfigComposer::compose(&options, &schema).unwrap();
    assert_eq!(composed.config.database.host, "overridden");
}
