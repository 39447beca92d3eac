//! Error types for filter description operations.

use fijo_core::FilterError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, writing, or building filter
/// descriptions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line in the native text format could not be parsed
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number in the source text.
        line: usize,
        /// What went wrong on that line.
        message: String,
    },

    /// Unknown node type in a description
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// A global default was given more than once
    #[error("'{0}' must not be specified more than once")]
    DuplicateGlobal(&'static str),

    /// A node is missing a setting with no global default to fall back on
    #[error("node '{node}': '{field}' not specified and no global default given")]
    MissingField {
        /// Name of the incomplete node.
        node: String,
        /// The missing setting.
        field: &'static str,
    },

    /// No node carries the input flag
    #[error("no input node specified")]
    NoInput,

    /// No node carries the output flag
    #[error("no output node specified")]
    NoOutput,

    /// More than one node carries the input flag
    #[error("more than one input node specified")]
    MultipleInputs,

    /// More than one node carries the output flag
    #[error("more than one output node specified")]
    MultipleOutputs,

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The description is structurally invalid
    #[error("invalid filter description: {0}")]
    Filter(#[from] FilterError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a line parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            line,
            message: message.into(),
        }
    }
}
