//! Per-case, per-suite, and per-plan results.
//!
//! Aggregate counts are computed from the stored results, so
//! `passed == results that passed` and `total == results.len()` hold by
//! construction.

use crate::error::EvaluationFailure;
use crate::evaluator::{EvalKind, EvaluationResult};
use prompteval_core::TestCase;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// How a case ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Evaluator accepted the output.
    Passed,
    /// Evaluator rejected the output.
    Failed,
    /// The provider call failed; no output was judged.
    ProviderError,
    /// The evaluator could not reach a verdict.
    EvaluationError,
}

/// Result for a single case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Zero-based position in the case list.
    pub index: usize,
    /// Case input.
    pub input: String,
    /// Expected output.
    pub expected: String,
    /// Trimmed model output; `None` when the provider call failed.
    pub actual: Option<String>,
    /// Whether the case passed.
    pub passed: bool,
    /// How the case ended.
    pub status: CaseStatus,
    /// Mismatch description or failure cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    /// Time spent on the provider call and evaluation.
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl RunResult {
    /// Result for a judged output.
    pub fn judged(
        index: usize,
        case: &TestCase,
        actual: impl Into<String>,
        verdict: EvaluationResult,
        duration: Duration,
    ) -> Self {
        let (status, diagnostic) = match verdict {
            EvaluationResult::Pass => (CaseStatus::Passed, None),
            EvaluationResult::Fail { diagnostic } => (CaseStatus::Failed, diagnostic),
        };
        Self::build(index, case, Some(actual.into()), status, diagnostic, duration)
    }

    /// Result for an output the evaluator could not judge.
    pub fn evaluation_failed(
        index: usize,
        case: &TestCase,
        actual: impl Into<String>,
        failure: &EvaluationFailure,
        duration: Duration,
    ) -> Self {
        Self::build(
            index,
            case,
            Some(actual.into()),
            CaseStatus::EvaluationError,
            Some(failure.to_string()),
            duration,
        )
    }

    /// Result for a failed provider call.
    pub fn provider_failed(
        index: usize,
        case: &TestCase,
        error: impl fmt::Display,
        duration: Duration,
    ) -> Self {
        Self::build(
            index,
            case,
            None,
            CaseStatus::ProviderError,
            Some(error.to_string()),
            duration,
        )
    }

    fn build(
        index: usize,
        case: &TestCase,
        actual: Option<String>,
        status: CaseStatus,
        diagnostic: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            index,
            input: case.input.clone(),
            expected: case.expected.clone(),
            actual,
            passed: status == CaseStatus::Passed,
            status,
            diagnostic,
            duration,
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed { "✓" } else { "✗" };
        write!(f, "{} Test case {} {:?}", mark, self.index, self.status)?;
        if let Some(ref d) = self.diagnostic {
            write!(f, ": {}", d)?;
        }
        Ok(())
    }
}

/// Results of one suite, in case order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteResult {
    results: Vec<RunResult>,
}

impl SuiteResult {
    /// Create an empty suite result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a case result.
    pub fn push(&mut self, result: RunResult) {
        self.results.push(result);
    }

    /// Case results, in case order.
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    /// Number of passed cases.
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of cases run.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of failed cases.
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Fraction of cases passed; zero for an empty suite.
    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.passed() as f64 / self.total() as f64
        }
    }

    /// Check if every case passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<RunResult> for SuiteResult {
    fn from_iter<I: IntoIterator<Item = RunResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl Serialize for SuiteResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SuiteResult", 4)?;
        state.serialize_field("passed", &self.passed())?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("pass_rate", &self.pass_rate())?;
        state.serialize_field("results", &self.results)?;
        state.end()
    }
}

impl fmt::Display for SuiteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} tests passed", self.passed(), self.total())
    }
}

/// One suite's entry in a plan result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Suite name from the plan.
    pub name: String,
    /// Evaluator used.
    pub eval_type: EvalKind,
    /// Suite outcome.
    pub result: SuiteResult,
}

/// Results of a whole plan, in plan order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// Plan name.
    pub name: String,
    suites: Vec<SuiteReport>,
}

impl PlanResult {
    /// Create an empty plan result.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suites: Vec::new(),
        }
    }

    /// Append a suite's result.
    pub fn push(&mut self, name: impl Into<String>, eval_type: EvalKind, result: SuiteResult) {
        self.suites.push(SuiteReport {
            name: name.into(),
            eval_type,
            result,
        });
    }

    /// Suite results, in plan order.
    pub fn suites(&self) -> &[SuiteReport] {
        &self.suites
    }

    /// Passed cases across all suites.
    pub fn passed(&self) -> usize {
        self.suites.iter().map(|s| s.result.passed()).sum()
    }

    /// Cases run across all suites.
    pub fn total(&self) -> usize {
        self.suites.iter().map(|s| s.result.total()).sum()
    }

    /// Fraction of all cases passed; zero for an empty plan.
    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passed() as f64 / total as f64,
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for PlanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PlanResult", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("passed", &self.passed())?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("pass_rate", &self.pass_rate())?;
        state.serialize_field("suites", &self.suites)?;
        state.end()
    }
}

impl fmt::Display for PlanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan: {}", self.name)?;
        for suite in &self.suites {
            writeln!(
                f,
                "  {} (eval: {}): {}",
                suite.name, suite.eval_type, suite.result
            )?;
        }
        write!(
            f,
            "Total: {}/{} tests passed across {} suites ({:.1}%)",
            self.passed(),
            self.total(),
            self.suites.len(),
            self.pass_rate() * 100.0
        )
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    duration.as_secs_f64().serialize(serializer)
}
