//! File format detection and representation.

use std::path::Path;

/// Structured configuration file formats this crate understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileFormat {
    /// JSON format (`.json`). Always available.
    Json,

    /// YAML format (`.yaml`, `.yml`). Requires the `yaml` feature.
    #[cfg(feature = "yaml")]
    Yaml,

    /// INI format (`.ini`). Requires the `ini` feature. Sections become
    /// nested objects keyed by section name.
    #[cfg(feature = "ini")]
    Ini,
}

impl FileFormat {
    /// Detects the format from a path's extension, case-insensitively.
    /// Returns `None` for an unrecognized or disabled extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),

            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(FileFormat::Yaml),

            #[cfg(feature = "ini")]
            "ini" => Some(FileFormat::Ini),

            _ => None,
        }
    }

    /// The format's display name, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",

            #[cfg(feature = "yaml")]
            FileFormat::Yaml => "YAML",

            #[cfg(feature = "ini")]
            FileFormat::Ini => "INI",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json() {
        assert_eq!(FileFormat::from_path(Path::new("config.json")), Some(FileFormat::Json));
    }

    #[test]
    fn rejects_unknown_extension() {
        assert_eq!(FileFormat::from_path(Path::new("config.txt")), None);
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(FileFormat::from_path(Path::new("config.JSON")), Some(FileFormat::Json));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn detects_yaml_both_extensions() {
        assert_eq!(FileFormat::from_path(Path::new("config.yaml")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("config.yml")), Some(FileFormat::Yaml));
    }

    #[cfg(feature = "ini")]
    #[test]
    fn detects_ini() {
        assert_eq!(FileFormat::from_path(Path::new("config.ini")), Some(FileFormat::Ini));
    }
}
