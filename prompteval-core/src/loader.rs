//! Loading and saving configuration files.
//!
//! The decoder is chosen from the file extension: `.json` for JSON, `.yaml`
//! or `.yml` for YAML. Anything else is rejected before the file is read.

use crate::case::TestCase;
use crate::errors::{ConfigError, ConfigResult};
use crate::plan::EvalPlan;
use crate::spec::InvocationSpec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// On-disk configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => {
                let shown = if extension.is_empty() {
                    String::new()
                } else {
                    format!(".{}", extension)
                };
                Err(ConfigError::unsupported_format(path, shown))
            }
        }
    }

    /// Decode a document in this format.
    pub fn decode<T: DeserializeOwned>(&self, path: &Path, content: &str) -> ConfigResult<T> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Self::Yaml => serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Encode a value in this format.
    pub fn encode<T: Serialize>(&self, path: &Path, value: &T) -> ConfigResult<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Self::Yaml => serde_yaml::to_string(value).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, bytes = content.len(), "loading config");
    format.decode(path, &content)
}

/// Load an invocation spec.
pub fn load_invocation_spec(path: impl AsRef<Path>) -> ConfigResult<InvocationSpec> {
    load(path.as_ref())
}

/// Load a test-case list.
pub fn load_test_cases(path: impl AsRef<Path>) -> ConfigResult<Vec<TestCase>> {
    load(path.as_ref())
}

/// Load an eval plan, resolving relative suite paths against the plan's
/// directory.
pub fn load_plan(path: impl AsRef<Path>) -> ConfigResult<EvalPlan> {
    let path = path.as_ref();
    let plan: EvalPlan = load(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(plan.resolved_against(base))
}

/// Write a test-case list, overwriting the file, in the format its extension
/// names.
pub fn save_test_cases(path: impl AsRef<Path>, cases: &[TestCase]) -> ConfigResult<()> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let mut content = format.encode(path, &cases)?;
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), cases = cases.len(), "saved test cases");
    Ok(())
}
