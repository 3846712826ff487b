//! Evaluator trait and evaluator selection.

use crate::error::EvaluationFailure;
use crate::scorers::{ExactMatchScorer, JsonEqualityScorer};
use prompteval_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verdict of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationResult {
    /// Output matches the expectation.
    Pass,
    /// Output does not match.
    Fail {
        /// Human-readable description of the mismatch.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diagnostic: Option<String>,
    },
}

impl EvaluationResult {
    /// Create a pass result.
    pub fn pass() -> Self {
        Self::Pass
    }

    /// Create a fail result without a diagnostic.
    pub fn fail() -> Self {
        Self::Fail { diagnostic: None }
    }

    /// Create a fail result with a diagnostic.
    pub fn fail_with(diagnostic: impl Into<String>) -> Self {
        Self::Fail {
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Check if passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Mismatch description, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail { diagnostic } => diagnostic.as_deref(),
        }
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail { diagnostic: None } => write!(f, "FAIL"),
            Self::Fail {
                diagnostic: Some(d),
            } => write!(f, "FAIL: {}", d),
        }
    }
}

/// A judging strategy.
///
/// Implementations are pure: the verdict depends only on the two strings, so
/// repeated calls with the same arguments return the same result. Runners
/// depend on this trait alone, so new strategies plug in without touching
/// them.
pub trait Evaluator: Send + Sync {
    /// Evaluator name, used in reports.
    fn name(&self) -> &str;

    /// Compare an expected value against the model's output.
    fn evaluate(&self, expected: &str, actual: &str)
        -> Result<EvaluationResult, EvaluationFailure>;
}

/// Boxed evaluator for dynamic dispatch.
pub type BoxedEvaluator = Box<dyn Evaluator>;

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(
        &self,
        expected: &str,
        actual: &str,
    ) -> Result<EvaluationResult, EvaluationFailure> {
        (**self).evaluate(expected, actual)
    }
}

/// Built-in evaluator selector, as written in config files and flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalKind {
    /// Trimmed, case-insensitive string equality.
    #[default]
    Strict,
    /// Structural JSON equality.
    Json,
}

impl EvalKind {
    /// Selector string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Json => "json",
        }
    }

    /// Build the evaluator for this kind.
    #[must_use]
    pub fn evaluator(&self) -> BoxedEvaluator {
        match self {
            Self::Strict => Box::new(ExactMatchScorer::new()),
            Self::Json => Box::new(JsonEqualityScorer::new()),
        }
    }
}

impl FromStr for EvalKind {
    type Err = ConfigError;

    /// Parse a selector; blank selects [`EvalKind::Strict`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "strict" => Ok(Self::Strict),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::unknown_eval_kind(other)),
        }
    }
}

impl fmt::Display for EvalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
