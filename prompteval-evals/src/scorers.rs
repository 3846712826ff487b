//! Built-in evaluators.

use crate::error::{EvaluationFailure, JsonSide};
use crate::evaluator::{EvaluationResult, Evaluator};
use serde_json::{Number, Value};

/// Evaluator that checks for string equality.
///
/// By default both sides are trimmed and compared case-insensitively.
#[derive(Debug, Clone)]
pub struct ExactMatchScorer {
    /// Whether to ignore case.
    pub ignore_case: bool,
    /// Whether to trim whitespace.
    pub trim: bool,
}

impl Default for ExactMatchScorer {
    fn default() -> Self {
        Self {
            ignore_case: true,
            trim: true,
        }
    }
}

impl ExactMatchScorer {
    /// Create a new exact match scorer (trimmed, case-insensitive).
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare case-sensitively.
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    /// Compare without trimming.
    #[must_use]
    pub fn untrimmed(mut self) -> Self {
        self.trim = false;
        self
    }
}

impl Evaluator for ExactMatchScorer {
    fn name(&self) -> &str {
        "ExactMatch"
    }

    fn evaluate(
        &self,
        expected: &str,
        actual: &str,
    ) -> Result<EvaluationResult, EvaluationFailure> {
        let (exp, out) = if self.trim {
            (expected.trim(), actual.trim())
        } else {
            (expected, actual)
        };

        let matches = if self.ignore_case {
            equal_fold(exp, out)
        } else {
            exp == out
        };

        Ok(if matches {
            EvaluationResult::pass()
        } else {
            EvaluationResult::fail()
        })
    }
}

/// Char-by-char simple case folding: `ς`, `σ` and `Σ` all match, while
/// `ß` does not match `SS`.
fn equal_fold(a: &str, b: &str) -> bool {
    fn fold_eq(x: char, y: char) -> bool {
        x == y
            || x.to_lowercase().eq(y.to_lowercase())
            || x.to_uppercase().eq(y.to_uppercase())
    }

    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| fold_eq(x, y))
}

/// Evaluator that compares two JSON documents structurally.
///
/// Object keys are compared as a set, array elements by position. Numbers
/// compare by value, so `1` equals `1.0`; values of different JSON types
/// never compare equal.
#[derive(Debug, Clone, Default)]
pub struct JsonEqualityScorer {
    /// Cap on the number of diff lines reported.
    pub max_diff_lines: Option<usize>,
}

impl JsonEqualityScorer {
    /// Create a new JSON equality scorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many differences are listed in a diagnostic.
    #[must_use]
    pub fn max_diff_lines(mut self, limit: usize) -> Self {
        self.max_diff_lines = Some(limit);
        self
    }
}

impl Evaluator for JsonEqualityScorer {
    fn name(&self) -> &str {
        "JsonEquality"
    }

    fn evaluate(
        &self,
        expected: &str,
        actual: &str,
    ) -> Result<EvaluationResult, EvaluationFailure> {
        let expected_json = parse(expected, JsonSide::Expected)?;
        let actual_json = parse(actual, JsonSide::Actual)?;

        let mut diffs = Vec::new();
        json_diff("$", &expected_json, &actual_json, &mut diffs);

        if diffs.is_empty() {
            return Ok(EvaluationResult::pass());
        }

        let total = diffs.len();
        if let Some(limit) = self.max_diff_lines {
            diffs.truncate(limit);
        }
        let mut diagnostic = String::from("JSON mismatch:");
        for line in &diffs {
            diagnostic.push_str("\n  ");
            diagnostic.push_str(line);
        }
        if diffs.len() < total {
            diagnostic.push_str(&format!("\n  ... and {} more", total - diffs.len()));
        }
        Ok(EvaluationResult::fail_with(diagnostic))
    }
}

fn parse(text: &str, side: JsonSide) -> Result<Value, EvaluationFailure> {
    serde_json::from_str(text).map_err(|e| EvaluationFailure::malformed_json(side, e.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Collect human-readable differences between two JSON values.
///
/// Paths use `$` for the root, `.key` for object members and `[i]` for
/// array elements.
pub fn json_diff(path: &str, expected: &Value, actual: &Value, out: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_value) in exp {
                let child = format!("{}.{}", path, key);
                match act.get(key) {
                    Some(act_value) => json_diff(&child, exp_value, act_value, out),
                    None => out.push(format!("{}: missing (expected {})", child, exp_value)),
                }
            }
            for (key, act_value) in act {
                if !exp.contains_key(key) {
                    out.push(format!("{}.{}: unexpected key (got {})", path, key, act_value));
                }
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            if exp.len() != act.len() {
                out.push(format!(
                    "{}: expected {} elements, got {}",
                    path,
                    exp.len(),
                    act.len()
                ));
            }
            for (i, (e, a)) in exp.iter().zip(act.iter()).enumerate() {
                json_diff(&format!("{}[{}]", path, i), e, a, out);
            }
        }
        (Value::Number(e), Value::Number(a)) => {
            if !numbers_equal(e, a) {
                out.push(format!("{}: expected {}, got {}", path, e, a));
            }
        }
        (e, a) if type_name(e) != type_name(a) => {
            out.push(format!(
                "{}: expected {} {}, got {} {}",
                path,
                type_name(e),
                e,
                type_name(a),
                a
            ));
        }
        (e, a) => {
            if e != a {
                out.push(format!("{}: expected {}, got {}", path, e, a));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(" Cba ", "cBA", true)]
    #[case("Paris", "paris\n", true)]
    #[case("positive", "Positive.", false)]
    #[case("", "   ", true)]
    #[case("ÉTÉ", "été", true)]
    #[case("ς", "Σ", true)]
    #[case("ΟΔΟΣ", "οδος", true)]
    #[case("straße", "STRASSE", false)]
    #[case("\u{212A}elvin", "kelvin", true)]
    fn test_exact_match(#[case] expected: &str, #[case] actual: &str, #[case] pass: bool) {
        let result = ExactMatchScorer::new().evaluate(expected, actual).unwrap();
        assert_eq!(result.is_pass(), pass);
        assert!(result.diagnostic().is_none());
    }

    #[test]
    fn test_exact_match_options() {
        let scorer = ExactMatchScorer::new().case_sensitive().untrimmed();
        assert!(!scorer.evaluate("Yes", "yes").unwrap().is_pass());
        assert!(!scorer.evaluate("yes", " yes").unwrap().is_pass());
        assert!(scorer.evaluate("yes", "yes").unwrap().is_pass());
    }

    #[rstest]
    #[case(r#"{"a":1,"b":2}"#, r#"{"b":2,"a":1}"#)]
    #[case(r#"{"a":{"x":[1,2]}}"#, r#"{ "a" : { "x" : [1, 2] } }"#)]
    #[case("1", "1.0")]
    #[case("null", "null")]
    #[case(r#""text""#, r#""text""#)]
    fn test_json_equal(#[case] expected: &str, #[case] actual: &str) {
        let result = JsonEqualityScorer::new().evaluate(expected, actual).unwrap();
        assert!(result.is_pass(), "{} vs {}: {}", expected, actual, result);
    }

    #[rstest]
    #[case("[1,2]", "[2,1]", "$[0]: expected 1, got 2")]
    #[case(r#"{"a":1}"#, r#"{"a":"1"}"#, "$.a: expected number 1, got string \"1\"")]
    #[case(r#"{"a":1}"#, r#"{}"#, "$.a: missing (expected 1)")]
    #[case(r#"{}"#, r#"{"z":true}"#, "$.z: unexpected key (got true)")]
    #[case("[1,2,3]", "[1,2]", "$: expected 3 elements, got 2")]
    #[case("false", "0", "$: expected boolean false, got number 0")]
    fn test_json_mismatch(#[case] expected: &str, #[case] actual: &str, #[case] line: &str) {
        let result = JsonEqualityScorer::new().evaluate(expected, actual).unwrap();
        assert!(!result.is_pass());
        let diagnostic = result.diagnostic().unwrap();
        assert!(
            diagnostic.contains(line),
            "diagnostic {:?} lacks {:?}",
            diagnostic,
            line
        );
    }

    #[test]
    fn test_json_malformed_expected() {
        let err = JsonEqualityScorer::new()
            .evaluate("not json", "{}")
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluationFailure::MalformedJson {
                side: JsonSide::Expected,
                ..
            }
        ));
    }

    #[test]
    fn test_json_malformed_actual() {
        let err = JsonEqualityScorer::new()
            .evaluate("{}", "Sure! Here is the JSON: {}")
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluationFailure::MalformedJson {
                side: JsonSide::Actual,
                ..
            }
        ));
    }

    #[test]
    fn test_json_diff_limit() {
        let scorer = JsonEqualityScorer::new().max_diff_lines(1);
        let result = scorer
            .evaluate(r#"{"a":1,"b":2,"c":3}"#, r#"{"a":0,"b":0,"c":0}"#)
            .unwrap();
        let diagnostic = result.diagnostic().unwrap();
        assert!(diagnostic.contains("$.a"));
        assert!(!diagnostic.contains("$.b"));
        assert!(diagnostic.contains("... and 2 more"));
    }

    #[test]
    fn test_evaluators_are_deterministic() {
        let json = JsonEqualityScorer::new();
        let exact = ExactMatchScorer::new();
        let pairs = [
            ("[1,2]", "[2,1]"),
            (r#"{"a":1}"#, r#"{"a":1}"#),
            ("not json", "{}"),
        ];

        for (expected, actual) in pairs {
            assert_eq!(
                json.evaluate(expected, actual),
                json.evaluate(expected, actual)
            );
            assert_eq!(
                exact.evaluate(expected, actual),
                exact.evaluate(expected, actual)
            );
        }
    }
}
