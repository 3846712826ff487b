//! Progress reporting hooks.
//!
//! The runner reports every case through a [`RunListener`]. The binary uses
//! [`ConsoleListener`] to print the human-readable transcript; library callers
//! and tests default to [`SilentListener`].

use crate::evaluator::EvalKind;
use crate::report::{CaseStatus, RunResult, SuiteResult};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Observer of a run's progress.
///
/// Every method has an empty default.
pub trait RunListener: Send + Sync {
    /// A plan suite is about to start.
    fn on_suite_start(&self, _name: &str, _eval_type: EvalKind, _cases: usize) {}

    /// A case inside a suite is about to run.
    fn on_case_start(&self, _index: usize) {}

    /// A case finished.
    fn on_case_finish(&self, _result: &RunResult) {}

    /// A plan suite finished.
    fn on_suite_finish(&self, _name: &str, _result: &SuiteResult) {}
}

/// Listener that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentListener;

impl RunListener for SilentListener {}

/// Listener that writes a plain-text transcript.
#[derive(Debug)]
pub struct ConsoleListener<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleListener<io::Stdout> {
    /// Write to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleListener<W> {
    /// Write to the given sink.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Take the sink back.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, write: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = write(&mut *out).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write report output");
        }
    }
}

impl<W: Write + Send> RunListener for ConsoleListener<W> {
    fn on_suite_start(&self, name: &str, eval_type: EvalKind, cases: usize) {
        self.emit(|out| {
            writeln!(
                out,
                "=== Suite: {} ({} test cases, eval: {}) ===\n",
                name, cases, eval_type
            )
        });
    }

    fn on_case_start(&self, index: usize) {
        self.emit(|out| writeln!(out, "Test {}:", index + 1));
    }

    fn on_case_finish(&self, result: &RunResult) {
        self.emit(|out| {
            let Some(ref actual) = result.actual else {
                return writeln!(
                    out,
                    "  ERROR: {}\n",
                    result.diagnostic.as_deref().unwrap_or("provider call failed")
                );
            };

            writeln!(out, "Input: {}", result.input)?;
            writeln!(out, "Expected: {}", result.expected)?;
            writeln!(out, "Got: {}", actual)?;

            match (result.status, result.diagnostic.as_deref()) {
                (CaseStatus::EvaluationError, Some(d)) => writeln!(out, "EVAL ERROR: {}\n", d),
                (_, Some(d)) => writeln!(out, "PASSED: {}\n{}\n", result.passed, d),
                (_, None) => writeln!(out, "PASSED: {}\n", result.passed),
            }
        });
    }

    fn on_suite_finish(&self, name: &str, result: &SuiteResult) {
        self.emit(|out| {
            writeln!(
                out,
                "{}: {}/{} passed\n",
                name,
                result.passed(),
                result.total()
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluationResult;
    use prompteval_core::TestCase;
    use std::time::Duration;

    fn transcript(f: impl FnOnce(&ConsoleListener<Vec<u8>>)) -> String {
        let listener = ConsoleListener::new(Vec::new());
        f(&listener);
        String::from_utf8(listener.into_inner()).unwrap()
    }

    #[test]
    fn test_console_case_block() {
        let case = TestCase::new("Hello", "Bonjour");
        let result = RunResult::judged(0, &case, "Bonjour", EvaluationResult::pass(), Duration::ZERO);

        let text = transcript(|l| {
            l.on_case_start(0);
            l.on_case_finish(&result);
        });

        assert_eq!(
            text,
            "Test 1:\nInput: Hello\nExpected: Bonjour\nGot: Bonjour\nPASSED: true\n\n"
        );
    }

    #[test]
    fn test_console_provider_error() {
        let case = TestCase::new("Hello", "Bonjour");
        let result = RunResult::provider_failed(0, &case, "timed out", Duration::ZERO);

        let text = transcript(|l| l.on_case_finish(&result));
        assert_eq!(text, "  ERROR: timed out\n\n");
    }

    #[test]
    fn test_console_suite_lines() {
        let text = transcript(|l| {
            l.on_suite_start("greetings", EvalKind::Json, 2);
            l.on_suite_finish("greetings", &SuiteResult::new());
        });

        assert!(text.starts_with("=== Suite: greetings (2 test cases, eval: json) ==="));
        assert!(text.contains("greetings: 0/0 passed"));
    }
}
