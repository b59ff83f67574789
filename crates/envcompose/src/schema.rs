//! The caller-supplied validation boundary: a `safeParse(value) ->
//! Result<Output, Vec<ValidationIssue>>` contract any schema representation
//! can implement, with a concrete `validator`-crate-backed adapter kept
//! behind the `validator` feature.

use serde::de::DeserializeOwned;

use crate::tree::Tree;

/// One validation failure, in a form independent of the validator crate
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path into the merged tree (e.g. `"database.port"`), or an
    /// empty string for a whole-value failure.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A caller-supplied validator: `safeParse(value) -> {ok, data} | {err, issues}`.
///
/// `Schema::Output` is the typed configuration value `ConfigComposer`
/// returns on success.
pub trait Schema {
    type Output;

    /// Validates (and optionally transforms) `tree`, the fully merged and
    /// placeholder-resolved configuration.
    fn safe_parse(&self, tree: &Tree) -> Result<Self::Output, Vec<ValidationIssue>>;
}

/// A [`Schema`] built from any `Deserialize` type, reporting failures with
/// the exact field path `serde_path_to_error` finds.
pub struct SerdeSchema<T> {
    _marker: std::marker::PhantomData<T>,
}

impl<T> SerdeSchema<T> {
    pub fn new() -> Self {
        SerdeSchema { _marker: std::marker::PhantomData }
    }
}

impl<T> Default for SerdeSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Schema for SerdeSchema<T> {
    type Output = T;

    fn safe_parse(&self, tree: &Tree) -> Result<T, Vec<ValidationIssue>> {
        serde_path_to_error::deserialize(tree).map_err(|err| {
            vec![ValidationIssue::new(err.path().to_string(), err.inner().to_string())]
        })
    }
}

/// A [`Schema`] that layers `validator`-crate field rules on top of a
/// `Deserialize` type.
#[cfg(feature = "validator")]
pub struct ValidatorSchema<T> {
    _marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "validator")]
impl<T> ValidatorSchema<T> {
    pub fn new() -> Self {
        ValidatorSchema { _marker: std::marker::PhantomData }
    }
}

#[cfg(feature = "validator")]
impl<T> Default for ValidatorSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "validator")]
impl<T: DeserializeOwned + validator::Validate> Schema for ValidatorSchema<T> {
    type Output = T;

    fn safe_parse(&self, tree: &Tree) -> Result<T, Vec<ValidationIssue>> {
        let value: T = serde_path_to_error::deserialize(tree)
            .map_err(|err| vec![ValidationIssue::new(err.path().to_string(), err.inner().to_string())])?;

        value.validate().map_err(validation_errors_to_issues)?;
        Ok(value)
    }
}

#[cfg(feature = "validator")]
fn validation_errors_to_issues(errors: validator::ValidationErrors) -> Vec<ValidationIssue> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed validation: {}", e.code));
                ValidationIssue::new(field.to_string(), message)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct DatabaseConfig {
        host: String,
        port: u16,
    }

    #[test]
    fn serde_schema_reports_path_aware_errors() {
        let schema = SerdeSchema::<DatabaseConfig>::new();
        let err = schema.safe_parse(&json!({"host": "localhost", "port": "not-a-number"})).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].path, "port");
    }

    #[test]
    fn serde_schema_succeeds_on_matching_shape() {
        let schema = SerdeSchema::<DatabaseConfig>::new();
        let value = schema.safe_parse(&json!({"host": "localhost", "port": 5432})).unwrap();
        assert_eq!(value, DatabaseConfig { host: "localhost".to_string(), port: 5432 });
    }
}
