//! OpenAI Chat Completions model implementation.

use super::types::*;
use crate::error::ModelError;
use crate::model::Model;
use async_trait::async_trait;
use prompteval_core::{FinishReason, ModelRequest, ModelResponse, RequestUsage};
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI Chat Completions model.
///
/// The model identifier is taken from each request, so one instance serves
/// every spec in a run.
#[derive(Debug, Clone)]
pub struct OpenAIChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    organization: Option<String>,
    default_timeout: Duration,
}

impl OpenAIChatModel {
    /// Create a new OpenAI chat model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            default_timeout: Duration::from_secs(120),
        }
    }

    /// Create from `OPENAI_API_KEY`, plus `OPENAI_ORG_ID` when set.
    ///
    /// A blank key counts as unset.
    pub fn from_env() -> Result<Self, ModelError> {
        let mut model = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| {
                ModelError::configuration("OPENAI_API_KEY environment variable not set")
            })?;
        if let Some(org) = std::env::var("OPENAI_ORG_ID")
            .ok()
            .filter(|org| !org.trim().is_empty())
        {
            model = model.with_organization(org);
        }
        Ok(model)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Build the request body.
    fn build_request(&self, req: &ModelRequest) -> ChatCompletionRequest {
        let mut body = ChatCompletionRequest::new(
            req.model.clone(),
            req.messages.iter().map(ChatMessage::from).collect(),
        );
        body.temperature = req.settings.temperature;
        body.top_p = req.settings.top_p;
        body.max_tokens = req.settings.max_tokens;
        body.stop = req.settings.stop.clone();
        body.response_format = req.response_format.clone();
        body
    }

    /// Parse OpenAI response to our format.
    fn parse_response(&self, resp: ChatCompletionResponse) -> Result<ModelResponse, ModelError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::invalid_response("No choices in response"))?;

        // Check for refusal
        if let Some(refusal) = choice.message.refusal {
            return Err(ModelError::ContentFiltered(refusal));
        }

        let finish_reason = choice.finish_reason.map(|r| match r.as_str() {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            "tool_calls" => FinishReason::ToolCall,
            _ => FinishReason::Stop,
        });

        let usage = resp.usage.map(|u| RequestUsage {
            request_tokens: Some(u.prompt_tokens),
            response_tokens: Some(u.completion_tokens),
            total_tokens: Some(u.total_tokens),
        });

        Ok(ModelResponse {
            text: choice.message.content.unwrap_or_default(),
            model_name: Some(resp.model).filter(|m| !m.is_empty()),
            finish_reason,
            usage,
        })
    }

    fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Handle API error response.
    fn handle_error_response(&self, status: u16, body: &str, headers: &HeaderMap) -> ModelError {
        // Try to parse as OpenAI error
        if let Ok(err) = serde_json::from_str::<OpenAIError>(body) {
            let code = err.error.code.clone();

            if status == 401 {
                return ModelError::auth(err.error.message);
            }
            if status == 429 {
                return ModelError::rate_limited(Self::parse_retry_after(headers));
            }
            if status == 404 {
                return ModelError::NotFound(err.error.message);
            }

            return ModelError::Api {
                message: err.error.message,
                code,
            };
        }

        if status == 429 {
            return ModelError::rate_limited(Self::parse_retry_after(headers));
        }

        ModelError::http(status, body)
    }
}

#[async_trait]
impl Model for OpenAIChatModel {
    fn system(&self) -> &str {
        "openai"
    }

    async fn request(&self, req: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let body = self.build_request(req);
        debug!(model = %body.model, messages = body.messages.len(), "sending chat completion");

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.default_timeout);

        if let Some(ref org) = self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.default_timeout)
            } else {
                ModelError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(self.handle_error_response(status, &body, &headers));
        }

        let resp: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(e.to_string()))?;

        self.parse_response(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompteval_core::{Message, ModelSettings};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> ModelRequest {
        ModelRequest::new(
            "gpt-4o-mini",
            vec![Message::system("Capital city only."), Message::user("France")],
        )
        .with_settings(ModelSettings::new().temperature(0.0))
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10}
        })
    }

    #[test]
    fn test_openai_model_builder() {
        let model = OpenAIChatModel::new("sk-test-key")
            .with_base_url("https://custom.api.com/v1/")
            .with_organization("org-123")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(model.system(), "openai");
        assert_eq!(model.base_url, "https://custom.api.com/v1");
        assert_eq!(model.organization, Some("org-123".to_string()));
        assert_eq!(model.default_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_build_request() {
        let model = OpenAIChatModel::new("key");
        let body = model.build_request(&sample_request());

        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.temperature, Some(0.0));
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[1].role, "user");
        assert_eq!(body.messages[1].content, "France");
    }

    #[tokio::test]
    async fn test_request_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": "Capital city only."},
                    {"role": "user", "content": "France"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Paris")))
            .expect(1)
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("sk-test").with_base_url(server.uri());
        let resp = model.request(&sample_request()).await.unwrap();

        assert_eq!(resp.text, "Paris");
        assert_eq!(resp.finish_reason, Some(FinishReason::Stop));
        assert_eq!(resp.usage.and_then(|u| u.total_tokens), Some(10));
    }

    #[tokio::test]
    async fn test_request_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("bad").with_base_url(server.uri());
        let err = model.request(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ModelError::Authentication(m) if m.contains("Incorrect API key")));
    }

    #[tokio::test]
    async fn test_request_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("slow down"),
            )
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("sk").with_base_url(server.uri());
        let err = model.request(&sample_request()).await.unwrap_err();
        assert!(matches!(
            err,
            ModelError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(7)
        ));
    }

    #[tokio::test]
    async fn test_request_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("sk").with_base_url(server.uri());
        let err = model.request(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ModelError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_request_no_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "x", "model": "m", "choices": []
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("sk").with_base_url(server.uri());
        let err = model.request(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_request_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "x",
                "model": "m",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": null, "refusal": "I can't help with that."},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("sk").with_base_url(server.uri());
        let err = model.request(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ModelError::ContentFiltered(_)));
    }

    #[tokio::test]
    async fn test_request_sends_organization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("OpenAI-Organization", "org-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Lima")))
            .expect(1)
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("sk")
            .with_base_url(server.uri())
            .with_organization("org-42");
        let resp = model.request(&sample_request()).await.unwrap();
        assert_eq!(resp.text, "Lima");
    }
}
