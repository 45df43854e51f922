//! Expectation and outcome types for non-tabular extraction.
//!
//! An extraction call walks an ordered attribute list. Each attribute
//! either captures a value (fill mode, no expectation) or validates the
//! captured value against an expectation. The per-call result is an
//! [`ExtractionOutcome`]; the values actually resolved form an
//! [`ExtractionRecord`] kept in the result cache.

use std::fmt;

/// A value an extraction is expected to produce.
///
/// Numeric expectations trigger string→number coercion of the capture
/// before comparison, so `Integer(100)` matches the captured text `"100"`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedValue {
    /// Exact text comparison.
    Text(String),
    /// Integer comparison after coercing the capture.
    Integer(i64),
    /// Float comparison after coercing the capture.
    Float(f64),
}

impl ExpectedValue {
    /// Compares a captured string against this expectation, coercing
    /// numerically where the expectation is numeric.
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            ExpectedValue::Text(expected) => expected == actual,
            ExpectedValue::Integer(expected) => {
                actual.trim().parse::<i64>().is_ok_and(|n| n == *expected)
            }
            ExpectedValue::Float(expected) => {
                actual.trim().parse::<f64>().is_ok_and(|n| n == *expected)
            }
        }
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedValue::Text(v) => write!(f, "{v}"),
            ExpectedValue::Integer(v) => write!(f, "{v}"),
            ExpectedValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(v: &str) -> Self {
        ExpectedValue::Text(v.to_string())
    }
}

impl From<String> for ExpectedValue {
    fn from(v: String) -> Self {
        ExpectedValue::Text(v)
    }
}

impl From<i64> for ExpectedValue {
    fn from(v: i64) -> Self {
        ExpectedValue::Integer(v)
    }
}

impl From<i32> for ExpectedValue {
    fn from(v: i32) -> Self {
        ExpectedValue::Integer(i64::from(v))
    }
}

impl From<u32> for ExpectedValue {
    fn from(v: u32) -> Self {
        ExpectedValue::Integer(i64::from(v))
    }
}

impl From<f64> for ExpectedValue {
    fn from(v: f64) -> Self {
        ExpectedValue::Float(v)
    }
}

/// What an attribute asks of the extraction engine.
///
/// # Examples
///
/// ```
/// use showparse_core::types::Expectation;
///
/// assert!(Expectation::Fill.matches("anything"));
/// assert!(Expectation::eq(100).matches("100"));
/// assert!(Expectation::one_of(["Established", "Idle"]).matches("Idle"));
/// assert!(!Expectation::eq("up").matches("down"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Expectation {
    /// Capture whatever the pattern yields (fill mode).
    #[default]
    Fill,
    /// The capture must equal this value.
    Eq(ExpectedValue),
    /// The capture must equal one of these values.
    OneOf(Vec<ExpectedValue>),
}

impl Expectation {
    /// Expectation of equality with `value`.
    pub fn eq(value: impl Into<ExpectedValue>) -> Self {
        Expectation::Eq(value.into())
    }

    /// Expectation of membership in `values`.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ExpectedValue>,
    {
        Expectation::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for fill mode.
    pub fn is_fill(&self) -> bool {
        matches!(self, Expectation::Fill)
    }

    /// Compares a captured value against the expectation. Fill mode
    /// accepts anything.
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Expectation::Fill => true,
            Expectation::Eq(expected) => expected.matches(actual),
            Expectation::OneOf(values) => values.iter().any(|v| v.matches(actual)),
        }
    }

    /// Human-readable form of the expected value(s), used in diff output.
    pub fn describe(&self) -> String {
        match self {
            Expectation::Fill => "<fill>".to_string(),
            Expectation::Eq(v) => v.to_string(),
            Expectation::OneOf(values) => values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// Per-tag outcome of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    /// Fill mode captured this value.
    Filled(String),
    /// Validate mode captured this value and it met the expectation.
    Verified(String),
    /// Validate mode captured a value that did not meet the expectation.
    Mismatch {
        /// Rendered expectation.
        expected: String,
        /// Captured value.
        actual: String,
    },
    /// No candidate matched; the attribute was skipped cleanly.
    Skipped,
    /// No candidate matched and skipping was not requested.
    Unmatched,
}

impl TagOutcome {
    /// The captured value, if one was resolved.
    pub fn value(&self) -> Option<&str> {
        match self {
            TagOutcome::Filled(v) | TagOutcome::Verified(v) => Some(v),
            TagOutcome::Mismatch { actual, .. } => Some(actual),
            TagOutcome::Skipped | TagOutcome::Unmatched => None,
        }
    }

    /// Whether this outcome counts toward overall success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TagOutcome::Filled(_) | TagOutcome::Verified(_) | TagOutcome::Skipped
        )
    }
}

/// Ordered tag→value mapping of the values an extraction resolved.
///
/// Skipped and unmatched tags are absent. Insertion order is preserved;
/// re-inserting a tag replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionRecord {
    entries: Vec<(String, String)>,
}

impl ExtractionRecord {
    /// Stores a value, replacing any previous value for the tag.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        let tag = tag.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, v)) => *v = value,
            None => self.entries.push((tag, value)),
        }
    }

    /// Looks up a tag's value.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the tag resolved a value.
    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    /// Number of resolved tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no tags resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one non-tabular extraction call.
///
/// `success` is `true` when every attribute either resolved as expected
/// or was cleanly skipped. `diff` lists only mismatches, one
/// `- tag = expected` / `+ tag = actual` pair per mismatching tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// Overall success flag.
    pub success: bool,
    per_tag: Vec<(String, TagOutcome)>,
    /// Mismatch diff, empty on success.
    pub diff: String,
}

impl ExtractionOutcome {
    /// Builds an outcome from per-tag results, deriving the success flag
    /// and the mismatch diff.
    pub fn from_outcomes(per_tag: Vec<(String, TagOutcome)>) -> Self {
        let success = per_tag.iter().all(|(_, o)| o.is_success());
        let mut diff = String::new();
        for (tag, outcome) in &per_tag {
            if let TagOutcome::Mismatch { expected, actual } = outcome {
                diff.push_str(&format!("- {tag} = {expected}\n+ {tag} = {actual}\n"));
            }
        }
        Self {
            success,
            per_tag,
            diff,
        }
    }

    /// Outcome for a specific tag.
    pub fn outcome(&self, tag: &str) -> Option<&TagOutcome> {
        self.per_tag
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, o)| o)
    }

    /// Iterates per-tag outcomes in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagOutcome)> {
        self.per_tag.iter().map(|(t, o)| (t.as_str(), o))
    }

    /// Number of attributes that produced an outcome.
    pub fn len(&self) -> usize {
        self.per_tag.len()
    }

    /// Returns `true` when no attribute produced an outcome.
    pub fn is_empty(&self) -> bool {
        self.per_tag.is_empty()
    }

    /// The resolved tag→value pairs (mismatched captures included,
    /// skipped/unmatched tags absent).
    pub fn record(&self) -> ExtractionRecord {
        let mut record = ExtractionRecord::default();
        for (tag, outcome) in &self.per_tag {
            if let Some(value) = outcome.value() {
                record.insert(tag.clone(), value);
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert!(ExpectedValue::Integer(63).matches("63"));
        assert!(ExpectedValue::Integer(63).matches(" 63 "));
        assert!(!ExpectedValue::Integer(63).matches("64"));
        assert!(!ExpectedValue::Integer(63).matches("63x"));
        assert!(ExpectedValue::Float(1.5).matches("1.5"));
    }

    #[test]
    fn test_one_of_membership() {
        let expect = Expectation::one_of(["Established", "Active"]);
        assert!(expect.matches("Active"));
        assert!(!expect.matches("Idle"));
        assert_eq!(expect.describe(), "Established | Active");
    }

    #[test]
    fn test_outcome_diff_lists_only_mismatches() {
        let outcome = ExtractionOutcome::from_outcomes(vec![
            ("bgp.as".to_string(), TagOutcome::Verified("100".to_string())),
            (
                "bgp.router-id".to_string(),
                TagOutcome::Mismatch {
                    expected: "10.0.0.1".to_string(),
                    actual: "10.0.0.2".to_string(),
                },
            ),
        ]);
        assert!(!outcome.success);
        assert_eq!(
            outcome.diff,
            "- bgp.router-id = 10.0.0.1\n+ bgp.router-id = 10.0.0.2\n"
        );
        assert!(!outcome.diff.contains("bgp.as ="));
    }

    #[test]
    fn test_record_includes_resolved_excludes_skipped() {
        let outcome = ExtractionOutcome::from_outcomes(vec![
            ("a".to_string(), TagOutcome::Filled("1".to_string())),
            ("b".to_string(), TagOutcome::Skipped),
            (
                "c".to_string(),
                TagOutcome::Mismatch {
                    expected: "x".to_string(),
                    actual: "y".to_string(),
                },
            ),
        ]);
        let record = outcome.record();
        assert_eq!(record.get("a"), Some("1"));
        assert!(!record.contains("b"));
        assert_eq!(record.get("c"), Some("y"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = ExtractionRecord::default();
        record.insert("x", "1");
        record.insert("y", "2");
        record.insert("x", "3");
        let tags: Vec<&str> = record.iter().map(|(t, _)| t).collect();
        assert_eq!(tags, ["x", "y"]);
        assert_eq!(record.get("x"), Some("3"));
    }
}
