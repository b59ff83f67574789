//! Malformed input produces `Format`/`Parse` errors with exact positions,
//! never silent fallback.

#![allow(clippy::pedantic)]

use envcompose::dotenv::DotenvLexer;
use envcompose::file::{self, FileFormat};
use envcompose::{ComposeOptions, ConfigComposer, SerdeSchema, SourceDescriptor};
use serde::Deserialize;
use serde_json::json;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn bare_value_with_unquoted_space_is_a_format_error() {
    let err = DotenvLexer::parse("FOO=BAR BAZ", "inline").unwrap_err();
    assert!(err.to_string().to_lowercase().contains("space") || err.to_string().to_lowercase().contains("quote"));
}

#[test]
fn whitespace_between_name_and_equals_is_a_format_error() {
    assert!(DotenvLexer::parse("FOO BAR=BAR", "inline").is_err());
}

#[test]
fn assignment_without_equals_is_a_format_error() {
    assert!(DotenvLexer::parse("FOO", "inline").is_err());
}

#[test]
fn unterminated_double_quote_is_a_format_error() {
    assert!(DotenvLexer::parse("FOO=\"foo", "inline").is_err());
}

#[test]
fn unclosed_brace_interpolation_is_a_format_error() {
    assert!(DotenvLexer::parse("FOO=${FOO", "inline").is_err());
}

#[test]
fn malformed_json_file_reports_a_span() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::File::create(&path).unwrap().write_all(b"{ \"a\": ").unwrap();

    let err = file::read_source(&path, true).unwrap_err();
    match err {
        file::FileError::Parse { format, .. } => assert_eq!(format, "JSON"),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[test]
fn array_root_is_rejected_as_not_an_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("array.json");
    std::fs::File::create(&path).unwrap().write_all(b"[1, 2, 3]").unwrap();

    #[derive(Debug, Deserialize)]
    struct Anything {}

    let options = ComposeOptions::new().no_env().source(SourceDescriptor::file(path));
    let schema = SerdeSchema::<Anything>::new();
    let err = ConfigComposer::compose(&options, &schema).unwrap_err();
    assert!(err.to_string().contains("object"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::File::create(&path).unwrap().write_all(b"a = 1").unwrap();
    assert!(FileFormat::from_path(&path).is_none());
}

#[test]
fn missing_required_source_is_surfaced_not_swallowed() {
    #[derive(Debug, Deserialize)]
    struct Anything {}

    let options = ComposeOptions::new()
        .no_env()
        .source(SourceDescriptor::file("/tmp/envcompose-definitely-does-not-exist.json"));
    let schema = SerdeSchema::<Anything>::new();
    let err = ConfigComposer::compose(&options, &schema).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn inline_non_object_source_is_rejected() {
    #[derive(Debug, Deserialize)]
    struct Anything {}

    let options = ComposeOptions::new().no_env().source(SourceDescriptor::inline(json!([1, 2, 3])));
    let schema = SerdeSchema::<Anything>::new();
    let err = ConfigComposer::compose(&options, &schema).unwrap_err();
    assert!(err.to_string().contains("object"));
}
