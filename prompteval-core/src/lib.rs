//! # prompteval-core
//!
//! Core types and configuration loading for the prompteval harness.
//!
//! This crate provides the foundational types used throughout prompteval:
//!
//! - **Messages**: Role-tagged chat messages and the request/response pair
//!   exchanged with a completion provider
//! - **Settings**: Sampling controls (temperature, max tokens, top-p, stop)
//! - **Invocation specs**: The declarative description of one model call
//! - **Test cases and plans**: Input/expected pairs and multi-suite plans
//! - **Loading**: JSON/YAML decoding keyed on file extension
//!
//! ## Example
//!
//! ```rust
//! use prompteval_core::{InvocationSpec, Message, ModelSettings};
//!
//! let spec = InvocationSpec::new("gpt-4o-mini")
//!     .with_message(Message::system("Reply with the capital city only."))
//!     .with_settings(ModelSettings::new().temperature(0.0));
//!
//! let request = spec.to_request("France");
//! assert_eq!(request.messages.len(), 2);
//! assert_eq!(spec.messages.len(), 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod case;
pub mod errors;
pub mod loader;
pub mod messages;
pub mod plan;
pub mod settings;
pub mod spec;

pub use case::TestCase;
pub use errors::{ConfigError, ConfigResult};
pub use loader::{
    load_invocation_spec, load_plan, load_test_cases, save_test_cases, FileFormat,
};
pub use messages::{FinishReason, Message, ModelRequest, ModelResponse, RequestUsage, Role};
pub use plan::{EvalPlan, SuiteDefinition};
pub use settings::ModelSettings;
pub use spec::{InvocationSpec, JsonSchemaFormat, ResponseFormat};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ConfigError, ConfigResult, EvalPlan, InvocationSpec, Message, ModelRequest,
        ModelResponse, ModelSettings, Role, SuiteDefinition, TestCase,
    };
}
