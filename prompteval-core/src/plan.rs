//! Multi-suite evaluation plans.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Evaluator selector used when a suite does not name one.
pub const DEFAULT_EVAL_TYPE: &str = "strict";

/// One suite entry of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDefinition {
    /// Suite name used in reports. Not required to be unique.
    pub name: String,
    /// Path to the invocation-spec file.
    pub prompt: PathBuf,
    /// Path to the test-case file.
    pub samples: PathBuf,
    /// Evaluator selector (`strict` or `json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_type: Option<String>,
}

impl SuiteDefinition {
    /// Create a suite entry using the default evaluator.
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<PathBuf>,
        samples: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            samples: samples.into(),
            eval_type: None,
        }
    }

    /// Set the evaluator selector.
    #[must_use]
    pub fn with_eval_type(mut self, eval_type: impl Into<String>) -> Self {
        self.eval_type = Some(eval_type.into());
        self
    }

    /// Evaluator selector, with absent or blank values mapped to `strict`.
    #[must_use]
    pub fn eval_type(&self) -> &str {
        match self.eval_type.as_deref().map(str::trim) {
            Some(kind) if !kind.is_empty() => kind,
            _ => DEFAULT_EVAL_TYPE,
        }
    }

    fn resolve_against(&mut self, base: &Path) {
        if self.prompt.is_relative() {
            self.prompt = base.join(&self.prompt);
        }
        if self.samples.is_relative() {
            self.samples = base.join(&self.samples);
        }
    }
}

/// A named, ordered collection of suites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalPlan {
    /// Plan name.
    pub name: String,
    /// Suites, in execution and reporting order.
    pub tests: Vec<SuiteDefinition>,
}

impl EvalPlan {
    /// Create an empty plan.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Append a suite.
    #[must_use]
    pub fn with_suite(mut self, suite: SuiteDefinition) -> Self {
        self.tests.push(suite);
        self
    }

    /// Get number of suites.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Rewrite relative suite paths to be relative to `base` instead of the
    /// working directory.
    #[must_use]
    pub fn resolved_against(mut self, base: &Path) -> Self {
        for suite in &mut self.tests {
            suite.resolve_against(base);
        }
        self
    }
}
