//! Error messages name the offending variable, file, or path, never a bare
//! "something went wrong".

#![allow(clippy::pedantic)]

use envcompose::dotenv::DotenvLexer;
use envcompose::{ComposeOptions, ConfigComposer, SerdeSchema, SourceDescriptor};
use serde::Deserialize;
use serde_json::json;
use serial_test::serial;

#[test]
#[serial]
fn missing_env_error_names_the_variable() {
    // SAFETY: serialized by #[serial].
    unsafe { std::env::remove_var("ERRQ_MISSING_VAR") };

    #[derive(Debug, Deserialize)]
    struct Anything {
        #[allow(dead_code)]
        key: String,
    }

    let options = ComposeOptions::new()
        .no_env()
        .source(SourceDescriptor::inline(json!({"key": "%env(ERRQ_MISSING_VAR)%"})));
    let schema = SerdeSchema::<Anything>::new();
    let err = ConfigComposer::compose(&options, &schema).unwrap_err();

    assert!(err.to_string().contains("ERRQ_MISSING_VAR"));
}

#[test]
fn format_error_carries_line_and_column() {
    let err = DotenvLexer::parse("FOO=bar\nBAZ QUX=1\n", "two-line.env").unwrap_err();
    let envcompose::dotenv::Error::Format { line, column, path, .. } = err else {
        panic!("expected a Format error");
    };
    assert_eq!(line, 2);
    assert!(column >= 1);
    assert_eq!(path, "two-line.env");
}

#[test]
fn not_found_error_names_the_path() {
    #[derive(Debug, Deserialize)]
    struct Anything {}

    let options = ComposeOptions::new()
        .no_env()
        .source(SourceDescriptor::file("/tmp/errq-definitely-absent.json"));
    let schema = SerdeSchema::<Anything>::new();
    let err = ConfigComposer::compose(&options, &schema).unwrap_err();
    assert!(err.to_string().contains("errq-definitely-absent.json"));
}

#[test]
fn validation_error_reports_every_failing_field() {
    #[derive(Debug, Deserialize)]
    struct Strict {
        #[allow(dead_code)]
        port: u16,
    }

    let options = ComposeOptions::new()
        .no_env()
        .source(SourceDescriptor::inline(json!({"port": "not-a-number"})));
    let schema = SerdeSchema::<Strict>::new();
    let err = ConfigComposer::compose(&options, &schema).unwrap_err();

    let envcompose::ConfigError::Validation { issues } = err else {
        panic!("expected a Validation error");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, "port");
}
