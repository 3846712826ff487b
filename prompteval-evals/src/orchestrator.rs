//! Multi-suite plan execution.

use crate::error::EvalResult;
use crate::evaluator::EvalKind;
use crate::report::PlanResult;
use crate::runner::EvalRunner;
use prompteval_core::{
    load_invocation_spec, load_plan, load_test_cases, EvalPlan, InvocationSpec, SuiteDefinition,
    TestCase,
};
use std::path::Path;
use tracing::info;

struct ResolvedSuite {
    name: String,
    spec: InvocationSpec,
    cases: Vec<TestCase>,
    kind: EvalKind,
}

impl ResolvedSuite {
    fn load(suite: &SuiteDefinition) -> EvalResult<Self> {
        Ok(Self {
            name: suite.name.clone(),
            spec: load_invocation_spec(&suite.prompt)?,
            cases: load_test_cases(&suite.samples)?,
            kind: suite.eval_type().parse()?,
        })
    }
}

/// Runs every suite of an [`EvalPlan`] in order and totals the results.
///
/// A suite whose spec, cases, or evaluator selector cannot be resolved aborts
/// the whole plan before anything runs.
#[derive(Debug, Clone)]
pub struct EvalOrchestrator {
    runner: EvalRunner,
}

impl EvalOrchestrator {
    /// Create an orchestrator driving the given runner.
    pub fn new(runner: EvalRunner) -> Self {
        Self { runner }
    }

    /// The runner used for each suite.
    pub fn runner(&self) -> &EvalRunner {
        &self.runner
    }

    /// Load a plan file and run it.
    pub async fn run_plan_file(&self, path: impl AsRef<Path>) -> EvalResult<PlanResult> {
        let plan = load_plan(path)?;
        self.run_plan(&plan).await
    }

    /// Run a plan.
    ///
    /// Every suite is resolved before the first one runs, so a bad file
    /// aborts the plan without any provider call.
    pub async fn run_plan(&self, plan: &EvalPlan) -> EvalResult<PlanResult> {
        info!(plan = %plan.name, suites = plan.len(), "running plan");
        let suites = plan
            .tests
            .iter()
            .map(ResolvedSuite::load)
            .collect::<EvalResult<Vec<_>>>()?;

        let mut result = PlanResult::new(plan.name.clone());
        let listener = self.runner.listener();
        for suite in suites {
            let evaluator = suite.kind.evaluator();
            listener.on_suite_start(&suite.name, suite.kind, suite.cases.len());
            let suite_result = self
                .runner
                .run_suite(&suite.cases, &suite.spec, evaluator.as_ref())
                .await;
            listener.on_suite_finish(&suite.name, &suite_result);

            result.push(suite.name, suite.kind, suite_result);
        }

        info!(
            plan = %plan.name,
            passed = result.passed(),
            total = result.total(),
            "plan finished"
        );
        Ok(result)
    }
}
