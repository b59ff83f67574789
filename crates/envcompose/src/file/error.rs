//! File error types with rich diagnostics.

use miette::{Diagnostic, NamedSource, SourceSpan};

/// Errors raised while loading one configuration source: the file is
/// missing, unreadable, has an unrecognized extension, fails to parse, or
/// parses to something other than an object.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum FileError {
    /// A required (non-optional) configuration file does not exist.
    #[error("configuration file not found: {path}")]
    #[diagnostic(
        code(envcompose::file::not_found),
        help("ensure the file exists, or mark this source optional")
    )]
    NotFound {
        /// Path to the missing file.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("failed to read configuration file: {path}")]
    #[diagnostic(
        code(envcompose::file::read_error),
        help("check file permissions and ensure it's readable")
    )]
    ReadError {
        /// Path to the file.
        path: String,

        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The path's extension does not map to a known, enabled format.
    #[error("unknown configuration file format: .{extension}")]
    #[diagnostic(
        code(envcompose::file::unknown_format),
        help("supported formats: .json, .yaml, .yml, .ini")
    )]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// The underlying format parser rejected the file's content.
    #[error("{format} parse error in {path}")]
    #[diagnostic(code(envcompose::file::parse_error))]
    Parse {
        /// Format name (JSON, YAML, INI).
        format: &'static str,

        /// Path to the file.
        path: String,

        /// The source file content, for miette's snippet rendering.
        #[source_code]
        src: NamedSource<String>,

        /// The location of the error, when the underlying parser reports
        /// one; otherwise a zero-length span at the start of the file.
        #[label("{message}")]
        span: SourceSpan,

        /// Description of what went wrong.
        message: String,
    },

    /// The parsed root was not an object (e.g. an array or scalar at the
    /// top level).
    #[error("configuration root in {path} must be an object, found {found}")]
    #[diagnostic(
        code(envcompose::file::not_an_object),
        help("wrap the top-level value in an object, or use a different source")
    )]
    NotAnObject {
        /// Path to the file (or a synthetic label for inline sources).
        path: String,

        /// What the root actually was (`"array"`, `"null"`, `"string"`, ...).
        found: &'static str,
    },
}
