//! # prompteval-models
//!
//! Completion provider trait and implementations for prompteval.
//!
//! This crate provides the `Model` trait, the single seam through which the
//! harness talks to a remote completion service, plus:
//!
//! - **OpenAI**: Chat Completions over HTTP (feature: `openai`, default)
//! - **Mock models**: [`MockModel`] and [`FunctionModel`] for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use prompteval_core::{InvocationSpec, Message};
//! use prompteval_models::{Model, OpenAIChatModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = OpenAIChatModel::from_env()?;
//!     let spec = InvocationSpec::new("gpt-4o-mini")
//!         .with_message(Message::system("Reply in French."));
//!
//!     let response = model.request(&spec.to_request("Good morning")).await?;
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod model;

/// OpenAI models (GPT-4o, GPT-4.1, o-series).
#[cfg(feature = "openai")]
#[cfg_attr(docsrs, doc(cfg(feature = "openai")))]
pub mod openai;

// Mock for testing
pub mod mock;

// Re-exports
pub use error::{ModelError, ModelResult};
pub use mock::{FunctionModel, MockModel};
pub use model::{BoxedModel, Model, SharedModel};

#[cfg(feature = "openai")]
pub use openai::OpenAIChatModel;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BoxedModel, FunctionModel, MockModel, Model, ModelError, ModelResult, SharedModel,
    };

    #[cfg(feature = "openai")]
    pub use crate::openai::OpenAIChatModel;
}
