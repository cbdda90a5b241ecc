//! Supported data formats.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::MudflowError;

/// Serialization format of a data document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Json,
    Yaml,
    Toml,
    Ron,
}

impl DataFormat {
    /// All formats, in the order they are listed in help output.
    pub const ALL: [DataFormat; 4] = [
        DataFormat::Json,
        DataFormat::Yaml,
        DataFormat::Toml,
        DataFormat::Ron,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Yaml => "yaml",
            DataFormat::Toml => "toml",
            DataFormat::Ron => "ron",
        }
    }

    /// Uppercase label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            DataFormat::Json => "JSON",
            DataFormat::Yaml => "YAML",
            DataFormat::Toml => "TOML",
            DataFormat::Ron => "RON",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<DataFormat> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataFormat {
    type Err = MudflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DataFormat::Json),
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            "toml" => Ok(DataFormat::Toml),
            "ron" => Ok(DataFormat::Ron),
            _ => Err(MudflowError::UnknownFormat(s.to_string())),
        }
    }
}
