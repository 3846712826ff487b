//! Evaluation errors.

use prompteval_core::ConfigError;
use prompteval_models::ModelError;
use std::fmt;
use thiserror::Error;

/// Errors that abort an evaluation command.
///
/// Provider and evaluator failures inside a suite never surface here; they
/// are recorded on the failing [`RunResult`](crate::RunResult) instead.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A configuration file could not be loaded or written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider failure where no per-case recovery is possible.
    #[error("model request failed: {0}")]
    Model(#[from] ModelError),

    /// Case index outside the loaded case list.
    #[error("index {index} out of range ({})", range_label(.len))]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of cases available.
        len: usize,
    },

    /// The generated batch was not a JSON array of test cases.
    #[error("failed to parse generated test cases: {message}")]
    GenerationParse {
        /// Decoder error.
        message: String,
        /// Raw provider output, for diagnosis.
        raw: String,
    },

    /// Requested a non-positive number of generated cases.
    #[error("invalid case count {0}: must be at least 1")]
    InvalidCount(usize),
}

fn range_label(len: &usize) -> String {
    match *len {
        0 => "no test cases loaded".to_string(),
        n => format!("0-{}", n - 1),
    }
}

impl EvalError {
    /// Create an index-out-of-range error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a generation parse error.
    pub fn generation_parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::GenerationParse {
            message: message.into(),
            raw: raw.into(),
        }
    }
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Which side of a comparison failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonSide {
    /// The expected value from the case file.
    Expected,
    /// The model's output.
    Actual,
}

impl fmt::Display for JsonSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => f.write_str("expected"),
            Self::Actual => f.write_str("actual"),
        }
    }
}

/// An evaluator could not reach a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationFailure {
    /// One side is not valid JSON.
    #[error("failed to parse {side} JSON: {message}")]
    MalformedJson {
        /// Side that failed.
        side: JsonSide,
        /// Decoder error.
        message: String,
    },
}

impl EvaluationFailure {
    /// Create a malformed-JSON failure.
    pub fn malformed_json(side: JsonSide, message: impl Into<String>) -> Self {
        Self::MalformedJson {
            side,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_range_display() {
        let err = EvalError::index_out_of_range(5, 3);
        assert_eq!(err.to_string(), "index 5 out of range (0-2)");

        let err = EvalError::index_out_of_range(0, 0);
        assert_eq!(err.to_string(), "index 0 out of range (no test cases loaded)");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: EvalError = ConfigError::unknown_eval_kind("fuzzy").into();
        assert!(err.to_string().contains("fuzzy"));
    }

    #[test]
    fn test_malformed_json_display() {
        let failure = EvaluationFailure::malformed_json(JsonSide::Actual, "expected value");
        assert_eq!(
            failure.to_string(),
            "failed to parse actual JSON: expected value"
        );
    }
}
