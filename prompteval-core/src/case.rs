//! Test case definitions.

use serde::{Deserialize, Serialize};

/// One input/expected-output pair.
///
/// Cases have no identity beyond their position in the owning sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Text sent as the final user turn.
    pub input: String,
    /// Output the evaluator compares against.
    pub expected: String,
}

impl TestCase {
    /// Create a new case.
    pub fn new(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
        }
    }
}
