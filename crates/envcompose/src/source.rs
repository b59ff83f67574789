//! Source descriptors and per-source attribution.
//!
//! [`SourceDescriptor`] is a tagged source value: a file path, an embedded
//! record path, or an inline tree. [`SourceOrigin`] and [`ConfigSources`]
//! track which descriptor contributed which top-level source, for callers
//! who want to know where a merged value came from.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use crate::file::FileFormat;
use crate::tree::Tree;

/// A single configuration source, as accepted by [`crate::compose::ComposeOptions`].
#[derive(Clone, Debug)]
pub enum SourceDescriptor {
    /// A path; format is inferred from the extension.
    FilePath(PathBuf),

    /// A path with an explicit format and/or optionality.
    FileRecord {
        path: PathBuf,
        format: Option<FileFormat>,
        optional: bool,
    },

    /// A plain object tree supplied directly by the caller.
    Inline(Tree),
}

impl SourceDescriptor {
    /// Builds a required file source, inferring its format from the path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceDescriptor::FilePath(path.into())
    }

    /// Builds an optional file source, inferring its format from the path.
    pub fn file_optional(path: impl Into<PathBuf>) -> Self {
        SourceDescriptor::FileRecord {
            path: path.into(),
            format: None,
            optional: true,
        }
    }

    /// Builds an inline source from any JSON-serializable value.
    pub fn inline(value: Tree) -> Self {
        SourceDescriptor::Inline(value)
    }
}

/// Identifies which descriptor a merged tree's value came from, for
/// attribution display. Distinct from [`SourceDescriptor`] in that it
/// records enough to describe a source after loading, without holding the
/// tree it produced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceOrigin {
    /// A file that was read.
    File(PathBuf),
    /// A file source that was declared optional and absent.
    MissingOptionalFile(PathBuf),
    /// An inline object literal.
    Inline,
    /// The `defaults` option.
    Defaults,
}

impl Display for SourceOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::File(path) => write!(f, "file ({})", path.display()),
            SourceOrigin::MissingOptionalFile(path) => write!(f, "absent, optional ({})", path.display()),
            SourceOrigin::Inline => write!(f, "inline source"),
            SourceOrigin::Defaults => write!(f, "defaults"),
        }
    }
}

/// Records which [`SourceOrigin`] contributed the tree that was merged at
/// each step of a [`crate::compose::ConfigComposer`] run, in merge order.
///
/// This does not change merge semantics — it is read-only bookkeeping for
/// diagnosing "which file set this key" questions.
#[derive(Clone, Debug, Default)]
pub struct ConfigSources {
    entries: Vec<SourceOrigin>,
}

impl ConfigSources {
    pub fn new() -> Self {
        ConfigSources::default()
    }

    pub fn push(&mut self, origin: SourceOrigin) {
        self.entries.push(origin);
    }

    pub fn entries(&self) -> &[SourceOrigin] {
        &self.entries
    }
}

impl Display for ConfigSources {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration sources (merge order):")?;
        for (i, origin) in self.entries.iter().enumerate() {
            writeln!(f, "  {}. {origin}", i + 1)?;
        }
        Ok(())
    }
}
