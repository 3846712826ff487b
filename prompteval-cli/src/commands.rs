//! Command implementations.
//!
//! Each command takes a [`CommandContext`] so it can run against a stand-in
//! provider in tests.

use anyhow::{Context, Result};
use prompteval_core::{
    load_invocation_spec, load_test_cases, save_test_cases, FileFormat, InvocationSpec, TestCase,
};
use prompteval_evals::{
    CaseGenerator, EvalError, EvalKind, EvalOrchestrator, EvalRunner, PlanResult, RunListener,
    RunResult, SuiteResult,
};
use prompteval_models::SharedModel;
use std::path::Path;
use std::sync::Arc;

/// Provider handle and progress listener shared by every command.
#[derive(Clone)]
pub struct CommandContext {
    model: SharedModel,
    listener: Arc<dyn RunListener>,
}

impl CommandContext {
    /// Bundle the provider handle with the listener that prints progress.
    pub fn new(model: SharedModel, listener: Arc<dyn RunListener>) -> Self {
        Self { model, listener }
    }

    fn runner(&self) -> EvalRunner {
        EvalRunner::new(self.model.clone()).with_listener(self.listener.clone())
    }
}

/// Counts reported by `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Cases already in the file before generation.
    pub existing: usize,
    /// Cases added by this run.
    pub generated: usize,
    /// Cases written back to the file.
    pub total: usize,
}

fn parse_eval_kind(eval: &str) -> Result<EvalKind> {
    Ok(eval.parse::<EvalKind>()?)
}

fn load_suite_inputs(
    prompt: &Path,
    testcases: &Path,
) -> Result<(InvocationSpec, Vec<TestCase>)> {
    let spec = load_invocation_spec(prompt)
        .with_context(|| format!("loading prompt file {}", prompt.display()))?;
    let cases = load_test_cases(testcases)
        .with_context(|| format!("loading test cases from {}", testcases.display()))?;
    Ok((spec, cases))
}

fn write_report(path: &Path, json: serde_json::Result<String>) -> Result<()> {
    let json = json.context("serializing report")?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("writing report to {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

/// Generate `num` cases from the spec's system prompt and append them to the
/// case file, creating it when absent.
///
/// The file is left untouched if generation fails.
pub async fn cmd_generate(
    ctx: &CommandContext,
    prompt: &Path,
    testcases: &Path,
    num: usize,
    generator_model: &str,
) -> Result<GenerateSummary> {
    let spec = load_invocation_spec(prompt)
        .with_context(|| format!("loading prompt file {}", prompt.display()))?;
    // reject an unwritable extension before spending a provider call
    FileFormat::from_path(testcases)?;

    let existing = if testcases.exists() {
        let cases = load_test_cases(testcases)
            .with_context(|| format!("loading test cases from {}", testcases.display()))?;
        println!("Found {} existing test cases", cases.len());
        cases
    } else {
        Vec::new()
    };

    println!("Generating {} new test cases...", num);
    let generator = CaseGenerator::new(ctx.model.clone()).with_generator_model(generator_model);
    let all = generator
        .generate(&spec, &existing, num)
        .await
        .context("generating test cases")?;

    save_test_cases(testcases, &all)?;

    let summary = GenerateSummary {
        existing: existing.len(),
        generated: all.len() - existing.len(),
        total: all.len(),
    };
    tracing::info!(
        existing = summary.existing,
        generated = summary.generated,
        path = %testcases.display(),
        "test cases saved"
    );
    println!(
        "Generated {} new test cases and saved {} total to {}",
        summary.generated,
        summary.total,
        testcases.display()
    );
    Ok(summary)
}

/// Run every case in `testcases` and print the transcript and totals.
///
/// Provider and evaluation failures count as failed cases; only config
/// errors are returned.
pub async fn cmd_test(
    ctx: &CommandContext,
    prompt: &Path,
    testcases: &Path,
    eval: &str,
    report: Option<&Path>,
) -> Result<SuiteResult> {
    let kind = parse_eval_kind(eval)?;
    let (spec, cases) = load_suite_inputs(prompt, testcases)?;

    println!(
        "Running {} test cases with prompt from {} (eval: {}):\n",
        cases.len(),
        prompt.display(),
        kind
    );

    let evaluator = kind.evaluator();
    let suite = ctx
        .runner()
        .run_suite(&cases, &spec, evaluator.as_ref())
        .await;

    println!("Results: {}", suite);
    if let Some(path) = report {
        write_report(path, suite.to_json())?;
    }
    Ok(suite)
}

/// Run the case at zero-based `index`.
///
/// An out-of-range index fails before any provider call.
pub async fn cmd_run(
    ctx: &CommandContext,
    prompt: &Path,
    testcases: &Path,
    index: usize,
    eval: &str,
) -> Result<RunResult> {
    let kind = parse_eval_kind(eval)?;
    let (spec, cases) = load_suite_inputs(prompt, testcases)?;
    if index >= cases.len() {
        return Err(EvalError::index_out_of_range(index, cases.len()).into());
    }

    println!("Running test case {} (eval: {}):", index, kind);
    let evaluator = kind.evaluator();
    let result = ctx
        .runner()
        .run_single(&cases, index, &spec, evaluator.as_ref())
        .await?;

    if result.passed {
        println!("✓ Test case {} PASSED", index);
    } else {
        println!("✗ Test case {} FAILED", index);
    }
    Ok(result)
}

/// Run an eval plan file and print per-suite and grand totals.
pub async fn cmd_eval(
    ctx: &CommandContext,
    file: &Path,
    report: Option<&Path>,
) -> Result<PlanResult> {
    let orchestrator = EvalOrchestrator::new(ctx.runner());
    let result = orchestrator
        .run_plan_file(file)
        .await
        .with_context(|| format!("running eval plan {}", file.display()))?;

    println!("{}", result);
    if let Some(path) = report {
        write_report(path, result.to_json())?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prompteval_core::ModelResponse;
    use prompteval_evals::SilentListener;
    use prompteval_models::{FunctionModel, MockModel};
    use std::fs;

    fn context(model: impl prompteval_models::Model + 'static) -> CommandContext {
        CommandContext::new(Arc::new(model), Arc::new(SilentListener))
    }

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    const SPEC: &str = r#"{
        "$schema": "./prompt.schema.json",
        "model": "gpt-4o-mini",
        "messages": [{"role": "system", "content": "Reply with the capital city."}],
        "temperature": 0
    }"#;

    const CASES: &str = r#"[
  {"input": "France", "expected": "Paris"},
  {"input": "Japan", "expected": "Tokyo"},
  {"input": "Peru", "expected": "Lima"}
]"#;

    fn capitals() -> FunctionModel {
        FunctionModel::new(|req| {
            let answer = match req.last_user_prompt().unwrap_or_default() {
                "France" => "paris",
                "Japan" => "Tokyo ",
                _ => "unknown",
            };
            Ok(ModelResponse::text(answer))
        })
    }

    #[tokio::test]
    async fn test_cmd_test_counts() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases = write(dir.path(), "cases.json", CASES);
        let report = dir.path().join("report.json");

        let suite = cmd_test(&context(capitals()), &prompt, &cases, "strict", Some(&report))
            .await
            .unwrap();

        assert_eq!((suite.passed(), suite.total()), (2, 3));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["passed"], 2);
        assert_eq!(json["results"][2]["actual"], "unknown");
    }

    #[tokio::test]
    async fn test_cmd_test_unknown_eval_fails_before_calls() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases = write(dir.path(), "cases.json", CASES);
        let mock = MockModel::new();

        let err = cmd_test(&context(mock.clone()), &prompt, &cases, "regex", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("unknown evaluation type"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cmd_test_missing_prompt_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let cases = write(dir.path(), "cases.json", CASES);

        let err = cmd_test(
            &context(MockModel::new()),
            &dir.path().join("absent.yaml"),
            &cases,
            "strict",
            None,
        )
        .await
        .unwrap_err();

        assert!(format!("{:#}", err).contains("absent.yaml"));
    }

    #[tokio::test]
    async fn test_cmd_run_index_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases = write(dir.path(), "cases.json", CASES);
        let mock = MockModel::new();

        let err = cmd_run(&context(mock.clone()), &prompt, &cases, 3, "strict")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EvalError>(),
            Some(EvalError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cmd_run_single_case() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases = write(dir.path(), "cases.json", CASES);

        let result = cmd_run(&context(capitals()), &prompt, &cases, 1, "strict")
            .await
            .unwrap();

        assert_eq!(result.index, 1);
        assert!(result.passed);
        assert_eq!(result.actual.as_deref(), Some("Tokyo"));
    }

    #[tokio::test]
    async fn test_cmd_generate_appends_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases_path = write(dir.path(), "cases.json", CASES);
        let mock = MockModel::new().with_text_response(
            r#"[{"input": "Kenya", "expected": "Nairobi"}, {"input": "Chile", "expected": "Santiago"}]"#,
        );

        let summary = cmd_generate(&context(mock), &prompt, &cases_path, 2, "gpt-4.1")
            .await
            .unwrap();

        assert_eq!(
            summary,
            GenerateSummary {
                existing: 3,
                generated: 2,
                total: 5
            }
        );
        let saved = load_test_cases(&cases_path).unwrap();
        let original: Vec<TestCase> = serde_json::from_str(CASES).unwrap();
        assert_eq!(&saved[..3], &original[..]);
        assert_eq!(saved[3], TestCase::new("Kenya", "Nairobi"));
        assert_eq!(saved[4], TestCase::new("Chile", "Santiago"));
    }

    #[tokio::test]
    async fn test_cmd_generate_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases_path = dir.path().join("new-cases.yaml");
        let mock = MockModel::new()
            .with_text_response(r#"[{"input": "Italy", "expected": "Rome"}]"#);

        let summary = cmd_generate(&context(mock), &prompt, &cases_path, 1, "gpt-4.1")
            .await
            .unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(
            load_test_cases(&cases_path).unwrap(),
            vec![TestCase::new("Italy", "Rome")]
        );
    }

    #[tokio::test]
    async fn test_cmd_generate_parse_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let cases_path = write(dir.path(), "cases.json", CASES);
        let mock = MockModel::new().with_text_response("I cannot do that.");

        let err = cmd_generate(&context(mock), &prompt, &cases_path, 2, "gpt-4.1")
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("failed to parse generated test cases"));
        assert_eq!(fs::read_to_string(&cases_path).unwrap(), CASES);
    }

    #[tokio::test]
    async fn test_cmd_generate_rejects_bad_extension_before_call() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write(dir.path(), "prompt.json", SPEC);
        let mock = MockModel::new();

        let err = cmd_generate(
            &context(mock.clone()),
            &prompt,
            &dir.path().join("cases.csv"),
            2,
            "gpt-4.1",
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("unsupported file format"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cmd_eval_plan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "prompt.json", SPEC);
        write(dir.path(), "cases.json", CASES);
        let plan = write(
            dir.path(),
            "plan.json",
            r#"{"name": "capitals", "tests": [
                {"name": "first", "prompt": "prompt.json", "samples": "cases.json"},
                {"name": "again", "prompt": "prompt.json", "samples": "cases.json", "eval_type": ""}
            ]}"#,
        );

        let result = cmd_eval(&context(capitals()), &plan, None).await.unwrap();

        assert_eq!((result.passed(), result.total()), (4, 6));
        assert_eq!(result.suites()[1].name, "again");
    }
}
