//! Synthesizing test cases from a spec's system prompt.

use crate::error::{EvalError, EvalResult};
use prompteval_core::{InvocationSpec, Message, ModelRequest, TestCase};
use prompteval_models::SharedModel;
use tracing::{debug, info, warn};

/// Model used for generation unless overridden.
pub const DEFAULT_GENERATOR_MODEL: &str = "gpt-4.1";

/// Default number of cases to generate.
pub const DEFAULT_CASE_COUNT: usize = 10;

/// Build the instruction asking for `count` cases.
pub fn generation_prompt(system_prompt: &str, count: usize) -> String {
    format!(
        r#"Given this system prompt: "{system_prompt}"

Generate {count} diverse test cases as JSON array in this exact format:
[
  {{
    "input": "example input text",
    "expected": "expected output"
  }}
]

Make the test cases varied and realistic. Include edge cases and different scenarios that would test the system prompt thoroughly.

Respond with the JSON array only, without any other text."#
    )
}

/// Generates new cases with a completion provider.
#[derive(Clone)]
pub struct CaseGenerator {
    model: SharedModel,
    generator_model: String,
}

impl CaseGenerator {
    /// Create a generator using [`DEFAULT_GENERATOR_MODEL`].
    pub fn new(model: SharedModel) -> Self {
        Self {
            model,
            generator_model: DEFAULT_GENERATOR_MODEL.to_string(),
        }
    }

    /// Set the model id sent with generation requests.
    #[must_use]
    pub fn with_generator_model(mut self, model: impl Into<String>) -> Self {
        self.generator_model = model.into();
        self
    }

    /// Model id sent with generation requests.
    pub fn generator_model(&self) -> &str {
        &self.generator_model
    }

    /// Build the generation request for a spec.
    ///
    /// A spec without a system message yields an empty quoted prompt.
    pub fn build_request(&self, spec: &InvocationSpec, count: usize) -> ModelRequest {
        let system_prompt = spec.system_prompt().unwrap_or_default();
        ModelRequest::new(
            self.generator_model.clone(),
            vec![
                Message::developer(system_prompt),
                Message::user(generation_prompt(system_prompt, count)),
            ],
        )
    }

    /// Generate up to `count` new cases.
    pub async fn generate_cases(
        &self,
        spec: &InvocationSpec,
        count: usize,
    ) -> EvalResult<Vec<TestCase>> {
        if count == 0 {
            return Err(EvalError::InvalidCount(count));
        }

        let request = self.build_request(spec, count);
        debug!(model = %self.generator_model, count, "requesting generated cases");
        let response = self.model.request(&request).await?;

        let raw = response.text.trim();
        let mut cases: Vec<TestCase> = serde_json::from_str(raw)
            .map_err(|e| EvalError::generation_parse(e.to_string(), raw))?;

        if cases.len() > count {
            warn!(
                requested = count,
                received = cases.len(),
                "provider returned more cases than requested, truncating"
            );
            cases.truncate(count);
        }
        Ok(cases)
    }

    /// Generate new cases and append them after `existing`.
    ///
    /// Existing cases are returned unchanged and in their original order.
    pub async fn generate(
        &self,
        spec: &InvocationSpec,
        existing: &[TestCase],
        count: usize,
    ) -> EvalResult<Vec<TestCase>> {
        let new_cases = self.generate_cases(spec, count).await?;
        info!(
            existing = existing.len(),
            generated = new_cases.len(),
            "generated test cases"
        );

        let mut all = Vec::with_capacity(existing.len() + new_cases.len());
        all.extend_from_slice(existing);
        all.extend(new_cases);
        Ok(all)
    }
}

impl std::fmt::Debug for CaseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseGenerator")
            .field("model", &self.model.system())
            .field("generator_model", &self.generator_model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prompteval_core::Role;
    use prompteval_models::{MockModel, ModelError};
    use std::sync::Arc;

    fn spec() -> InvocationSpec {
        InvocationSpec::new("gpt-4o-mini")
            .with_message(Message::system("Classify sentiment as positive or negative."))
    }

    fn existing() -> Vec<TestCase> {
        vec![
            TestCase::new("I love it", "positive"),
            TestCase::new("Terrible", "negative"),
            TestCase::new("Great value", "positive"),
        ]
    }

    const BATCH: &str = r#"
        [
          {"input": "Worst purchase ever", "expected": "negative"},
          {"input": "Would buy again", "expected": "positive"}
        ]
    "#;

    #[tokio::test]
    async fn test_generate_appends_after_existing() {
        let mock = MockModel::new().with_text_response(BATCH);
        let generator = CaseGenerator::new(Arc::new(mock));

        let all = generator.generate(&spec(), &existing(), 2).await.unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(&all[..3], &existing()[..]);
        assert_eq!(all[3], TestCase::new("Worst purchase ever", "negative"));
        assert_eq!(all[4], TestCase::new("Would buy again", "positive"));
    }

    #[tokio::test]
    async fn test_generation_request_shape() {
        let mock = MockModel::new().with_text_response(BATCH);
        let generator =
            CaseGenerator::new(Arc::new(mock.clone())).with_generator_model("gpt-4o");

        generator.generate_cases(&spec(), 2).await.unwrap();

        let request = &mock.recorded_requests()[0];
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages[0].role, Role::Developer);
        assert_eq!(
            request.messages[0].content,
            "Classify sentiment as positive or negative."
        );
        assert_eq!(request.messages[1].role, Role::User);
        assert!(request.messages[1].content.contains(
            "Given this system prompt: \"Classify sentiment as positive or negative.\""
        ));
        assert!(request.messages[1].content.contains("Generate 2 diverse test cases"));
    }

    #[tokio::test]
    async fn test_missing_system_prompt_is_tolerated() {
        let mock = MockModel::new().with_text_response(BATCH);
        let generator = CaseGenerator::new(Arc::new(mock.clone()));
        let spec = InvocationSpec::new("m").with_message(Message::user("hi"));

        let cases = generator.generate(&spec, &[], 2).await.unwrap();

        assert_eq!(cases.len(), 2);
        let request = &mock.recorded_requests()[0];
        assert_eq!(request.messages[0].content, "");
        assert!(request.messages[1]
            .content
            .contains("Given this system prompt: \"\""));
    }

    #[tokio::test]
    async fn test_unparseable_batch_is_fatal() {
        let mock = MockModel::new().with_text_response("Here are some cases: [...]");
        let generator = CaseGenerator::new(Arc::new(mock));

        let err = generator.generate(&spec(), &existing(), 2).await.unwrap_err();
        match err {
            EvalError::GenerationParse { raw, .. } => {
                assert_eq!(raw, "Here are some cases: [...]")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_oversized_batch_truncated() {
        let mock = MockModel::new().with_text_response(BATCH);
        let generator = CaseGenerator::new(Arc::new(mock));

        let cases = generator.generate_cases(&spec(), 1).await.unwrap();
        assert_eq!(cases, vec![TestCase::new("Worst purchase ever", "negative")]);
    }

    #[tokio::test]
    async fn test_zero_count_rejected_without_call() {
        let mock = MockModel::new();
        let generator = CaseGenerator::new(Arc::new(mock.clone()));

        let err = generator.generate(&spec(), &[], 0).await.unwrap_err();
        assert!(matches!(err, EvalError::InvalidCount(0)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_is_fatal() {
        let mock = MockModel::new().with_error(ModelError::auth("bad key"));
        let generator = CaseGenerator::new(Arc::new(mock));

        let err = generator.generate(&spec(), &[], 3).await.unwrap_err();
        assert!(matches!(err, EvalError::Model(ModelError::Authentication(_))));
    }
}
