//! Resolves one [`SourceDescriptor`] into a raw [`Tree`]: reads a file path
//! or record path, dispatching on extension, or passes an inline tree
//! through unchanged.

use std::path::Path;

use crate::file::{self, FileError, FileFormat};
use crate::source::SourceDescriptor;
use crate::tree::{self, Tree};

/// Loads the tree a single [`SourceDescriptor`] describes.
pub struct SourceLoader;

impl SourceLoader {
    /// Resolves `descriptor` relative to `cwd`.
    ///
    /// Returns `Ok(None)` only for an optional, absent [`SourceDescriptor::FileRecord`];
    /// every other shape either produces a tree or an error.
    pub fn load(descriptor: &SourceDescriptor, cwd: &Path) -> Result<Option<Tree>, FileError> {
        match descriptor {
            SourceDescriptor::FilePath(path) => Self::load_file(&cwd.join(path), None, false),
            SourceDescriptor::FileRecord { path, format, optional } => {
                Self::load_file(&cwd.join(path), *format, *optional)
            }
            SourceDescriptor::Inline(value) => {
                if !tree::is_plain_object(value) {
                    return Err(FileError::NotAnObject {
                        path: "<inline>".to_string(),
                        found: tree_kind(value),
                    });
                }
                Ok(Some(value.clone()))
            }
        }
    }

    fn load_file(path: &Path, format: Option<FileFormat>, optional: bool) -> Result<Option<Tree>, FileError> {
        let parsed = match format {
            Some(format) => {
                if !path.exists() {
                    if optional {
                        return Ok(None);
                    }
                    return Err(FileError::NotFound {
                        path: path.display().to_string(),
                    });
                }
                let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadError {
                    path: path.display().to_string(),
                    source,
                })?;
                Some(file::parse_str(&content, format, path)?)
            }
            None => file::read_source(path, !optional)?.map(|(value, _content)| value),
        };

        let Some(value) = parsed else {
            return Ok(None);
        };

        if !tree::is_plain_object(&value) {
            return Err(FileError::NotAnObject {
                path: path.display().to_string(),
                found: tree_kind(&value),
            });
        }

        Ok(Some(value))
    }
}

fn tree_kind(value: &Tree) -> &'static str {
    match value {
        Tree::Null => "null",
        Tree::Bool(_) => "boolean",
        Tree::Number(_) => "number",
        Tree::String(_) => "string",
        Tree::Array(_) => "array",
        Tree::Object(_) => "object",
    }
}
