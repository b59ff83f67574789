//! Error types for the dotenv lexer and cascade.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while tokenising or evaluating a single `.env` file.
///
/// Every variant carries the file, line, and column of the offending byte:
/// format errors always surface exact position information, never retried.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The input violated the dotenv grammar.
    #[error("{message}")]
    #[diagnostic(code(envcompose::dotenv::format))]
    Format {
        /// What rule was violated, in plain language.
        message: String,

        /// Path the offending text was read from (or a synthetic label for
        /// in-memory parses).
        path: String,

        /// 1-indexed line of the offending byte.
        line: usize,

        /// 1-indexed column of the offending byte.
        column: usize,

        /// The file's full text, for miette's source snippet rendering.
        #[source_code]
        src: NamedSource<String>,

        /// The byte span to underline.
        #[label("{message}")]
        span: SourceSpan,
    },

    /// The dotenv cascade's base path could not be read: missing (and not
    /// optional) or a directory rather than a file.
    #[error("cannot read dotenv base path {path}: {reason}")]
    #[diagnostic(code(envcompose::dotenv::path))]
    Path {
        /// The path the cascade tried to read.
        path: String,

        /// Why it could not be read.
        reason: String,
    },
}

impl Error {
    /// Builds a [`Error::Format`] from a byte offset within `text`,
    /// translating it to a 1-indexed line/column pair.
    pub(super) fn format_at(
        path: &str,
        text: &str,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let (line, column) = line_col_at(text, offset);
        let span_len = text[offset.min(text.len())..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);

        Error::Format {
            message,
            path: path.to_string(),
            line,
            column,
            src: NamedSource::new(path.to_string(), text.to_string()),
            span: SourceSpan::new(offset.into(), span_len),
        }
    }
}

/// Translates a byte offset into a 1-indexed `(line, column)` pair.
fn line_col_at(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let mut line = 1;
    let mut col = 1;

    for ch in text[..offset].chars() {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
