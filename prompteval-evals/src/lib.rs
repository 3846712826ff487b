//! # prompteval-evals
//!
//! Evaluation engine for the prompteval harness.
//!
//! ## Core Concepts
//!
//! - **[`Evaluator`]**: Judges an actual output against an expected one
//! - **[`EvalRunner`]**: Runs cases and suites against a completion provider
//! - **[`EvalOrchestrator`]**: Runs a multi-suite [`EvalPlan`](prompteval_core::EvalPlan)
//! - **[`CaseGenerator`]**: Synthesizes new cases from a spec's system prompt
//! - **[`RunListener`]**: Observes progress (console transcript, or nothing)
//!
//! ## Built-in Evaluators
//!
//! - **[`ExactMatchScorer`]**: Trimmed, case-insensitive string equality (`strict`)
//! - **[`JsonEqualityScorer`]**: Structural JSON equality (`json`); object key
//!   order is ignored, array order is not
//!
//! ## Example
//!
//! ```ignore
//! use prompteval_evals::{EvalKind, EvalRunner};
//! use prompteval_core::{load_invocation_spec, load_test_cases};
//! use std::sync::Arc;
//!
//! let spec = load_invocation_spec("prompt.yaml")?;
//! let cases = load_test_cases("cases.json")?;
//! let runner = EvalRunner::new(Arc::new(model));
//!
//! let evaluator = EvalKind::Strict.evaluator();
//! let suite = runner.run_suite(&cases, &spec, evaluator.as_ref()).await;
//! println!("Results: {}", suite);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod generate;
pub mod listener;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod scorers;

// Re-exports
pub use error::{EvalError, EvalResult, EvaluationFailure, JsonSide};
pub use evaluator::{BoxedEvaluator, EvalKind, EvaluationResult, Evaluator};
pub use generate::{CaseGenerator, DEFAULT_CASE_COUNT, DEFAULT_GENERATOR_MODEL};
pub use listener::{ConsoleListener, RunListener, SilentListener};
pub use orchestrator::EvalOrchestrator;
pub use report::{CaseStatus, PlanResult, RunResult, SuiteReport, SuiteResult};
pub use runner::EvalRunner;
pub use scorers::{ExactMatchScorer, JsonEqualityScorer};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        CaseGenerator, EvalError, EvalKind, EvalOrchestrator, EvalResult, EvalRunner,
        EvaluationResult, Evaluator, ExactMatchScorer, JsonEqualityScorer, PlanResult,
        RunListener, RunResult, SuiteResult,
    };
}
