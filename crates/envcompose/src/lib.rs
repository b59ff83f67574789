//! Layered, placeholder-aware configuration loading with a Symfony-style
//! dotenv cascade.
//!
//! Two subsystems compose a typed configuration value for a long-lived
//! server process:
//!
//! 1. [`dotenv`] — a hand-written lexer for shell-flavoured `.env` syntax
//!    (quoting, escaping, `:-`/`:=` interpolation, optional command
//!    substitution) and the multi-file precedence cascade
//!    (`.env`, `.env.local`, `.env.<env>`, `.env.<env>.local`, `.env.dist`).
//! 2. [`compose`] — a placeholder-aware deep merger over JSON/YAML/INI
//!    sources, typed `%env(TYPE:NAME)%` substitution, and schema-gated
//!    validation via [`schema::Schema`].
//!
//! ```rust,ignore
//! use envcompose::{ComposeOptions, ConfigComposer, SerdeSchema, SourceDescriptor};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AppConfig { database: Database }
//! #[derive(Deserialize)]
//! struct Database { host: String, port: u16 }
//!
//! let options = ComposeOptions::new()
//!     .source(SourceDescriptor::file("config.json"));
//! let schema = SerdeSchema::<AppConfig>::new();
//! let composed = ConfigComposer::compose(&options, &schema)?;
//! # Ok::<(), envcompose::ConfigError>(())
//! ```

pub mod compose;
pub mod dotenv;
pub mod env_accessor;
pub mod error;
pub mod file;
pub mod loader;
pub mod merge;
pub mod placeholder;
pub mod schema;
pub mod source;
pub mod tree;

pub use compose::{ComposeOptions, Composed, ConfigComposer, EnvOptions};
pub use env_accessor::EnvAccessor;
pub use error::ConfigError;
pub use file::{FileError, FileFormat};
pub use merge::merge;
pub use placeholder::PlaceholderResolver;
pub use schema::{Schema, SerdeSchema, ValidationIssue};
pub use source::{ConfigSources, SourceDescriptor, SourceOrigin};
pub use tree::Tree;

#[cfg(feature = "validator")]
pub use schema::ValidatorSchema;
