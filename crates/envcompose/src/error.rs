//! The crate-root error type, wrapping every subsystem's own error.
//!
//! Subsystem errors are wrapped with `#[diagnostic(transparent)]` so miette
//! renders their own span and snippet unchanged. [`ConfigError::Validation`]
//! is the one accumulating variant, since schema validation is the only
//! point in the pipeline that reports more than one failure at a time.

use miette::Diagnostic;
use thiserror::Error;

use crate::dotenv;
use crate::file::FileError;
use crate::schema::ValidationIssue;

/// Everything that can go wrong composing a configuration value.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An environment variable required by a placeholder or the cascade
    /// itself was not set and carried no default.
    #[error("missing environment variable: {name}")]
    #[diagnostic(
        code(envcompose::missing_env),
        help("set {name} in your environment or .env file")
    )]
    MissingEnv {
        /// The variable name that was looked up.
        name: String,
    },

    /// A `.env` file failed to parse, or the cascade's base path could not
    /// be read.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Dotenv(#[from] dotenv::Error),

    /// A structured configuration file (JSON/YAML/INI) failed to load or
    /// parse, or its root was not an object.
    #[error(transparent)]
    #[diagnostic(transparent)]
    File(#[from] FileError),

    /// The merged, placeholder-resolved tree failed the caller-supplied
    /// schema's `safe_parse`.
    #[error("{} validation error(s)", issues.len())]
    #[diagnostic(
        code(envcompose::validation),
        help("fix the validation errors listed below")
    )]
    Validation {
        /// Every issue the schema reported, in the order it reported them.
        issues: Vec<ValidationIssue>,
    },
}
