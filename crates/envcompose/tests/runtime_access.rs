//! `EnvAccessor`'s registered-keys bookkeeping, exercised end-to-end
//! through a composer run.

#![allow(clippy::pedantic)]

use envcompose::{ComposeOptions, ConfigComposer, EnvAccessor, EnvOptions, SerdeSchema, SourceDescriptor};
use serde::Deserialize;
use serde_json::json;
use serial_test::serial;

#[derive(Debug, Deserialize)]
struct Anything {
    #[allow(dead_code)]
    key: Option<String>,
}

#[test]
#[serial]
fn composer_returns_an_accessor_with_resolved_keys_registered() {
    // SAFETY: serialized by #[serial].
    unsafe { std::env::set_var("RUNTIME_ACCESS_KEY", "value") };

    let options = ComposeOptions::new()
        .no_env()
        .source(SourceDescriptor::inline(json!({"key": "%env(RUNTIME_ACCESS_KEY)%"})));
    let schema = SerdeSchema::<Anything>::new();
    let composed = ConfigComposer::compose(&options, &schema).unwrap();

    assert!(composed.env.registered().contains("RUNTIME_ACCESS_KEY"));
    assert!(composed.env.has("RUNTIME_ACCESS_KEY"));

    // SAFETY: serialized by #[serial].
    unsafe { std::env::remove_var("RUNTIME_ACCESS_KEY") };
}

#[test]
#[serial]
fn known_keys_are_registered_even_without_being_read() {
    let options = ComposeOptions::new()
        .env(EnvOptions {
            enabled: false,
            known_keys: vec!["DECLARED_BUT_UNREAD".to_string()],
            ..Default::default()
        })
        .source(SourceDescriptor::inline(json!({"key": serde_json::Value::Null})));
    let schema = SerdeSchema::<Anything>::new();
    let composed = ConfigComposer::compose(&options, &schema).unwrap();

    assert!(!composed.env.registered().contains("DECLARED_BUT_UNREAD"));
}

#[test]
fn has_considers_process_env_even_for_unregistered_names() {
    // SAFETY: process-global read only, no mutation race.
    let accessor = EnvAccessor::new();
    assert!(!accessor.has("RUNTIME_ACCESS_TOTALLY_UNSET_NAME"));
}

#[test]
fn keys_unions_registered_and_process_env() {
    let mut accessor = EnvAccessor::new();
    accessor.register(["CUSTOM_REGISTERED_ONLY"]);
    let keys = accessor.keys();
    assert!(keys.contains("CUSTOM_REGISTERED_ONLY"));
}
