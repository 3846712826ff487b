//! Invocation specs: the declarative description of one model call.

use crate::messages::{Message, ModelRequest, Role};
use crate::settings::ModelSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Structured-output descriptor.
///
/// Carried through to the provider verbatim; never interpreted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Format type (`text`, `json_object`, `json_schema`).
    #[serde(rename = "type")]
    pub format_type: String,
    /// JSON schema for structured output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchemaFormat>,
}

impl ResponseFormat {
    /// JSON schema format.
    pub fn json_schema(name: impl Into<String>, schema: JsonValue, strict: bool) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: Some(JsonSchemaFormat {
                name: name.into(),
                description: None,
                schema,
                strict,
            }),
        }
    }
}

/// Named JSON schema for structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    /// Schema name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The JSON schema object.
    pub schema: JsonValue,
    /// Whether the provider must follow the schema exactly.
    #[serde(default)]
    pub strict: bool,
}

/// One model invocation: model, message sequence, sampling controls.
///
/// Read-only once loaded. Every per-case request is built from a copy of
/// `messages`, so a single spec can be reused across cases and suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationSpec {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation prefix.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Nucleus sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Structured-output descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl InvocationSpec {
    /// Create a spec with no messages and default sampling.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            stop: None,
            response_format: None,
        }
    }

    /// Append a message to the prefix.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace all sampling controls.
    #[must_use]
    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.temperature = settings.temperature;
        self.max_tokens = settings.max_tokens;
        self.top_p = settings.top_p;
        self.stop = settings.stop;
        self
    }

    /// Set the response format.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Sampling controls as a settings value.
    #[must_use]
    pub fn settings(&self) -> ModelSettings {
        ModelSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            stop: self.stop.clone(),
        }
    }

    /// Content of the first system-role message.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// A copy of the message prefix extended with one user turn.
    #[must_use]
    pub fn messages_with_input(&self, input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend(self.messages.iter().cloned());
        messages.push(Message::user(input));
        messages
    }

    /// Build the outbound request for one case input.
    #[must_use]
    pub fn to_request(&self, input: &str) -> ModelRequest {
        let request = ModelRequest::new(self.model.clone(), self.messages_with_input(input))
            .with_settings(self.settings());

        match &self.response_format {
            Some(format) => request.with_response_format(format.clone()),
            None => request,
        }
    }
}
