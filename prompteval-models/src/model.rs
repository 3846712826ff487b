//! Core model trait.
//!
//! This module defines the `Model` trait, the interface to a completion
//! provider. A single handle is created per process and shared by reference;
//! implementations keep no per-request state.

use async_trait::async_trait;
use prompteval_core::{ModelRequest, ModelResponse};
use std::sync::Arc;

use crate::error::ModelError;

/// Completion provider.
///
/// The model identifier travels inside each [`ModelRequest`], so one handle
/// serves every invocation spec in a run.
#[async_trait]
pub trait Model: Send + Sync {
    /// Provider name (openai, mock, ...).
    fn system(&self) -> &str;

    /// Issue one completion and wait for the answer.
    async fn request(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;
}

/// Boxed model for dynamic dispatch.
pub type BoxedModel = Box<dyn Model>;

/// Shared model handle.
pub type SharedModel = Arc<dyn Model>;

#[async_trait]
impl<M: Model + ?Sized> Model for Arc<M> {
    fn system(&self) -> &str {
        (**self).system()
    }

    async fn request(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        (**self).request(request).await
    }
}

#[async_trait]
impl<M: Model + ?Sized> Model for Box<M> {
    fn system(&self) -> &str {
        (**self).system()
    }

    async fn request(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        (**self).request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockModel;
    use prompteval_core::Message;

    #[tokio::test]
    async fn test_shared_model_delegates() {
        let mock = MockModel::new().with_text_response("pong");
        let shared: SharedModel = Arc::new(mock.clone());

        let req = ModelRequest::new("m", vec![Message::user("ping")]);
        let resp = shared.request(&req).await.unwrap();

        assert_eq!(resp.text, "pong");
        assert_eq!(shared.system(), "mock");
        assert_eq!(mock.call_count(), 1);
    }
}
