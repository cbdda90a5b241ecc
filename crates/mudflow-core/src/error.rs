//! Error types for mudflow-core

use std::path::PathBuf;

use thiserror::Error;

use crate::format::DataFormat;

/// Errors that can occur while loading documents and rendering templates
#[derive(Error, Debug)]
pub enum MudflowError {
    /// Reading or writing a file failed. The OS error is part of the
    /// message rather than a separate source, so reporters print it once.
    #[error("IO: {}: {error}", path.display())]
    Io { path: PathBuf, error: std::io::Error },

    /// Reading standard input failed
    #[error("IO: <stdin>: {0}")]
    Stdin(std::io::Error),

    /// Input document could not be parsed
    #[error("Failed {} deserialization: {message}", format.label())]
    Deserialization { format: DataFormat, message: String },

    /// Document could not be written in the requested format
    #[error("Failed {} serialization: {message}", format.label())]
    Serialization { format: DataFormat, message: String },

    /// Tera reported a parse or render failure
    #[error("Template render: {0}")]
    Template(String),

    /// Document root cannot be used as a template context
    #[error("Template context must be a map at the top level, got {0}")]
    InvalidContext(&'static str),

    /// Malformed `KEY=VALUE` override
    #[error("Invalid override {0:?}: expected KEY=VALUE with a non-empty dotted key")]
    InvalidOverride(String),

    /// Unrecognised format name
    #[error("Unknown data format {0:?} (expected one of: json, yaml, toml, ron)")]
    UnknownFormat(String),
}

impl MudflowError {
    pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        MudflowError::Io {
            path: path.into(),
            error,
        }
    }

    pub(crate) fn de(format: DataFormat, err: impl std::fmt::Display) -> Self {
        MudflowError::Deserialization {
            format,
            message: err.to_string(),
        }
    }

    pub(crate) fn ser(format: DataFormat, err: impl std::fmt::Display) -> Self {
        MudflowError::Serialization {
            format,
            message: err.to_string(),
        }
    }
}

impl From<tera::Error> for MudflowError {
    fn from(err: tera::Error) -> Self {
        // Tera's Display is only the outermost message ("Failed to render
        // 'x'"); the actual cause lives in the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push('\n');
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        MudflowError::Template(message)
    }
}

/// Result type for mudflow-core operations
pub type Result<T> = std::result::Result<T, MudflowError>;
