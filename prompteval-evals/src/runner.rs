//! Case and suite execution.

use crate::error::{EvalError, EvalResult};
use crate::evaluator::Evaluator;
use crate::listener::{RunListener, SilentListener};
use crate::report::{RunResult, SuiteResult};
use prompteval_core::{InvocationSpec, TestCase};
use prompteval_models::SharedModel;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs cases against a completion provider, one at a time.
///
/// Provider and evaluator failures are recorded on the case's
/// [`RunResult`] and never stop the suite.
#[derive(Clone)]
pub struct EvalRunner {
    model: SharedModel,
    listener: Arc<dyn RunListener>,
}

impl EvalRunner {
    /// Create a runner that reports nothing.
    pub fn new(model: SharedModel) -> Self {
        Self {
            model,
            listener: Arc::new(SilentListener),
        }
    }

    /// Set the progress listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn RunListener>) -> Self {
        self.listener = listener;
        self
    }

    /// The provider handle.
    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    /// The progress listener.
    pub fn listener(&self) -> &dyn RunListener {
        self.listener.as_ref()
    }

    /// Run one case.
    pub async fn run_case(
        &self,
        index: usize,
        case: &TestCase,
        spec: &InvocationSpec,
        evaluator: &dyn Evaluator,
    ) -> RunResult {
        let request = spec.to_request(&case.input);
        let start = Instant::now();

        let result = match self.model.request(&request).await {
            Err(e) => {
                warn!(index, model = %spec.model, error = %e, "provider call failed, recording failure");
                RunResult::provider_failed(index, case, &e, start.elapsed())
            }
            Ok(response) => {
                if let Some(ref usage) = response.usage {
                    debug!(
                        index,
                        request_tokens = ?usage.request_tokens,
                        response_tokens = ?usage.response_tokens,
                        "completion received"
                    );
                }
                if response.finish_reason.is_some_and(|r| r.is_truncated()) {
                    warn!(index, model = %spec.model, "completion hit the token limit");
                }
                let actual = response.text.trim();
                match evaluator.evaluate(&case.expected, actual) {
                    Ok(verdict) => RunResult::judged(index, case, actual, verdict, start.elapsed()),
                    Err(failure) => {
                        warn!(index, evaluator = evaluator.name(), error = %failure, "evaluation failed");
                        RunResult::evaluation_failed(index, case, actual, &failure, start.elapsed())
                    }
                }
            }
        };

        self.listener.on_case_finish(&result);
        result
    }

    /// Run every case in order.
    pub async fn run_suite(
        &self,
        cases: &[TestCase],
        spec: &InvocationSpec,
        evaluator: &dyn Evaluator,
    ) -> SuiteResult {
        info!(cases = cases.len(), model = %spec.model, evaluator = evaluator.name(), "running suite");

        let mut suite = SuiteResult::new();
        for (index, case) in cases.iter().enumerate() {
            self.listener.on_case_start(index);
            suite.push(self.run_case(index, case, spec, evaluator).await);
        }

        info!(passed = suite.passed(), total = suite.total(), "suite finished");
        suite
    }

    /// Run the case at `index`.
    ///
    /// The index is checked before any provider call.
    pub async fn run_single(
        &self,
        cases: &[TestCase],
        index: usize,
        spec: &InvocationSpec,
        evaluator: &dyn Evaluator,
    ) -> EvalResult<RunResult> {
        let case = cases
            .get(index)
            .ok_or_else(|| EvalError::index_out_of_range(index, cases.len()))?;
        Ok(self.run_case(index, case, spec, evaluator).await)
    }
}

impl std::fmt::Debug for EvalRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalRunner")
            .field("model", &self.model.system())
            .finish_non_exhaustive()
    }
}
