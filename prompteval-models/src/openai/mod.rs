//! OpenAI model implementation.
//!
//! - [`OpenAIChatModel`]: Chat Completions (gpt-4o, gpt-4.1, o-series, ...)
//!
//! ## Example
//!
//! ```rust,ignore
//! use prompteval_models::openai::OpenAIChatModel;
//! use prompteval_models::Model;
//!
//! let model = OpenAIChatModel::new(std::env::var("OPENAI_API_KEY")?);
//! let response = model.request(&request).await?;
//! ```

pub mod chat;
pub mod types;

// Re-exports
pub use chat::{OpenAIChatModel, DEFAULT_BASE_URL};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Usage};

