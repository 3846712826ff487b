//! Configuration error types.
//!
//! Every variant carries the path of the file involved so a fatal load error
//! can be diagnosed from the message alone.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, decoding, or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not one of `.json`, `.yaml`, `.yml`.
    #[error("unsupported file format: {extension:?} for {} (use .json, .yaml, or .yml)", path.display())]
    UnsupportedFormat {
        /// Offending file.
        path: PathBuf,
        /// Extension found, empty if none.
        extension: String,
    },

    /// Malformed JSON or a JSON document of the wrong shape.
    #[error("failed to parse JSON in {}: {source}", path.display())]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Malformed YAML or a YAML document of the wrong shape.
    #[error("failed to parse YAML in {}: {source}", path.display())]
    Yaml {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Evaluator kind selector that names no known evaluator.
    #[error("unknown evaluation type: {0:?} (use 'strict' or 'json')")]
    UnknownEvalKind(String),
}

impl ConfigError {
    /// Create an unsupported-format error.
    pub fn unsupported_format(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Create an unknown-evaluator error.
    pub fn unknown_eval_kind(kind: impl Into<String>) -> Self {
        Self::UnknownEvalKind(kind.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
