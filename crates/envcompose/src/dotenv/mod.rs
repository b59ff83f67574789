//! Dotenv parsing and the multi-file precedence cascade.
//!
//! [`lexer::DotenvLexer`] tokenises and evaluates one file's text in
//! isolation; [`cascade::DotenvCascade`] resolves a base path into the
//! ordered set of cascade members and populates process environment from
//! them, tracking which keys it owns via the [`cascade::VARS_SENTINEL`]
//! process-env sentinel.

pub mod cascade;
pub mod error;
pub mod lexer;

pub use cascade::{CascadeOptions, DotenvCascade};
pub use error::Error;
pub use lexer::DotenvLexer;
