//! Format-specific text-to-[`Tree`] parsing.

use std::path::Path;

use miette::{NamedSource, SourceSpan};

use super::error::FileError;
use super::format::FileFormat;
use crate::tree::Tree;

/// Reads and parses `path`, dispatching on its [`FileFormat`].
///
/// Returns `Ok(None)` when the file is absent and `required` is `false`;
/// otherwise missing files raise [`FileError::NotFound`].
pub fn read_source(path: &Path, required: bool) -> Result<Option<(Tree, String)>, FileError> {
    if !path.exists() {
        if required {
            return Err(FileError::NotFound {
                path: path.display().to_string(),
            });
        }
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadError {
        path: path.display().to_string(),
        source,
    })?;

    let format = FileFormat::from_path(path).ok_or_else(|| FileError::UnknownFormat {
        extension: path.extension().and_then(|e| e.to_str()).unwrap_or("").to_string(),
    })?;

    let value = parse_str(&content, format, path)?;
    Ok(Some((value, content)))
}

/// Parses `content` as `format`, attributing diagnostics to `path`.
pub fn parse_str(content: &str, format: FileFormat, path: &Path) -> Result<Tree, FileError> {
    match format {
        FileFormat::Json => serde_json::from_str(content).map_err(|e| json_parse_error(e, content, path)),

        #[cfg(feature = "yaml")]
        FileFormat::Yaml => serde_saphyr::from_str(content).map_err(|e| yaml_parse_error(e, content, path)),

        #[cfg(feature = "ini")]
        FileFormat::Ini => parse_ini(content, path),
    }
}

fn json_parse_error(e: serde_json::Error, content: &str, path: &Path) -> FileError {
    let offset = line_col_to_offset(content, e.line(), e.column());
    FileError::Parse {
        format: "JSON",
        path: path.display().to_string(),
        src: NamedSource::new(path.display().to_string(), content.to_string()),
        span: offset_to_span(offset, content),
        message: e.to_string(),
    }
}

#[cfg(feature = "yaml")]
fn yaml_parse_error(e: serde_saphyr::Error, content: &str, path: &Path) -> FileError {
    let message = e.to_string();
    let offset = extract_yaml_location(&message)
        .map(|(line, col)| line_col_to_offset(content, line, col))
        .unwrap_or(0);
    FileError::Parse {
        format: "YAML",
        path: path.display().to_string(),
        src: NamedSource::new(path.display().to_string(), content.to_string()),
        span: offset_to_span(offset, content),
        message,
    }
}

#[cfg(feature = "yaml")]
fn extract_yaml_location(msg: &str) -> Option<(usize, usize)> {
    let line_idx = msg.find("line ")?;
    let after_line = &msg[(line_idx + 5)..];
    let line_end = after_line.find(|c: char| !c.is_ascii_digit())?;
    let line = after_line[..line_end].parse::<usize>().ok()?;

    let col_idx = after_line.find("column ")?;
    let after_col = &after_line[(col_idx + 7)..];
    let col_end = after_col.find(|c: char| !c.is_ascii_digit()).unwrap_or(after_col.len());
    let col = after_col[..col_end].parse::<usize>().ok()?;

    Some((line, col))
}

#[cfg(feature = "ini")]
fn parse_ini(content: &str, path: &Path) -> Result<Tree, FileError> {
    let ini = ini::Ini::load_from_str(content).map_err(|e| FileError::Parse {
        format: "INI",
        path: path.display().to_string(),
        src: NamedSource::new(path.display().to_string(), content.to_string()),
        span: SourceSpan::new(0.into(), content.len().min(1)),
        message: e.to_string(),
    })?;

    let mut root = serde_json::Map::new();
    for (section, properties) in ini.iter() {
        let mut entries = serde_json::Map::new();
        for (key, value) in properties.iter() {
            entries.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        }
        match section {
            Some(name) => {
                root.insert(name.to_string(), serde_json::Value::Object(entries));
            }
            None => root.extend(entries),
        }
    }
    Ok(serde_json::Value::Object(root))
}

/// Converts a byte offset to a [`SourceSpan`] ending at the next delimiter,
/// so the highlighted region reads naturally instead of spanning to EOF.
fn offset_to_span(offset: usize, content: &str) -> SourceSpan {
    let remaining = &content[offset.min(content.len())..];
    let len = remaining
        .find(|c: char| c.is_whitespace() || matches!(c, ',' | '}' | ']'))
        .unwrap_or(remaining.len().min(20))
        .max(1);
    SourceSpan::new(offset.into(), len)
}

fn line_col_to_offset(content: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, l) in content.lines().enumerate() {
        if i + 1 == line {
            return offset + col.saturating_sub(1);
        }
        offset += l.len() + 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_object() {
        let value = parse_str(r#"{"a": 1}"#, FileFormat::Json, Path::new("x.json")).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn json_syntax_error_carries_a_span() {
        let err = parse_str("{not json", FileFormat::Json, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, FileError::Parse { .. }));
    }

    #[cfg(feature = "ini")]
    #[test]
    fn ini_sections_become_nested_objects() {
        let value = parse_str("[database]\nhost=localhost\nport=5432\n", FileFormat::Ini, Path::new("x.ini")).unwrap();
        assert_eq!(value["database"]["host"], serde_json::json!("localhost"));
        // INI scalars are kept as strings; the schema layer is the right
        // place to parse "5432" into a number if the caller's type demands one.
        assert_eq!(value["database"]["port"], serde_json::json!("5432"));
    }
}
