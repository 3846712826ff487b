//! Mock and function-based models for testing.
//!
//! - [`MockModel`]: a queue of canned responses (or failures)
//! - [`FunctionModel`]: a model driven by a closure over the request
//!
//! # Examples
//!
//! ```rust
//! use prompteval_models::MockModel;
//!
//! let model = MockModel::new()
//!     .with_text_response("positive")
//!     .with_text_response("negative");
//! ```

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use async_trait::async_trait;
use prompteval_core::{ModelRequest, ModelResponse};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Text returned once the queue is exhausted.
pub const DEFAULT_MOCK_RESPONSE: &str = "Mock response";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Canned {
    Response(ModelResponse),
    Error(ModelError),
}

/// A mock model that returns pre-configured responses in order.
///
/// Clones share the queue and the request log, so a test can hand one clone
/// to the code under test and inspect the other.
#[derive(Clone, Default)]
pub struct MockModel {
    responses: Arc<Mutex<VecDeque<Canned>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl std::fmt::Debug for MockModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockModel")
            .field("queued", &lock(&self.responses).len())
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockModel {
    /// Create a new mock model with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    #[must_use]
    pub fn with_response(self, response: ModelResponse) -> Self {
        lock(&self.responses).push_back(Canned::Response(response));
        self
    }

    /// Queue a plain text response.
    #[must_use]
    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_response(ModelResponse::text(text).with_model_name("mock"))
    }

    /// Queue a failure.
    #[must_use]
    pub fn with_error(self, error: ModelError) -> Self {
        lock(&self.responses).push_back(Canned::Error(error));
        self
    }

    /// Requests received so far, in call order.
    pub fn recorded_requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl Model for MockModel {
    fn system(&self) -> &str {
        "mock"
    }

    async fn request(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        lock(&self.requests).push(request.clone());

        match lock(&self.responses).pop_front() {
            Some(Canned::Response(response)) => Ok(response),
            Some(Canned::Error(error)) => Err(error),
            None => Ok(ModelResponse::text(DEFAULT_MOCK_RESPONSE).with_model_name("mock")),
        }
    }
}

/// Callback type for [`FunctionModel`].
pub type FunctionDef = Box<dyn Fn(&ModelRequest) -> ModelResult<ModelResponse> + Send + Sync>;

/// A model controlled by a local function.
///
/// Unlike [`MockModel`], the answer can depend on the request, which suits
/// tests that run many cases through one handle.
///
/// ```rust
/// use prompteval_models::FunctionModel;
/// use prompteval_core::ModelResponse;
///
/// let model = FunctionModel::new(|req| {
///     let input = req.last_user_prompt().unwrap_or_default();
///     Ok(ModelResponse::text(input.to_uppercase()))
/// });
/// ```
pub struct FunctionModel {
    function: FunctionDef,
}

impl FunctionModel {
    /// Create a function model.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&ModelRequest) -> ModelResult<ModelResponse> + Send + Sync + 'static,
    {
        Self {
            function: Box::new(function),
        }
    }

    /// A model that always answers with the same text.
    pub fn constant_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(ModelResponse::text(text.clone())))
    }

    /// A model that repeats the last user message back.
    pub fn echo() -> Self {
        Self::new(|req| {
            Ok(ModelResponse::text(
                req.last_user_prompt().unwrap_or_default(),
            ))
        })
    }
}

impl std::fmt::Debug for FunctionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionModel").finish_non_exhaustive()
    }
}

#[async_trait]
impl Model for FunctionModel {
    fn system(&self) -> &str {
        "function"
    }

    async fn request(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        (self.function)(request)
    }
}
