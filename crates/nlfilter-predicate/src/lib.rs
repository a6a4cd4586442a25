//! Predicate grammar for natural-language filter translation
//!
//! The fixed operator vocabulary, the shape every predicate must satisfy,
//! and the deterministic cache fingerprint. All types serialize to the
//! wire shape consumed by the external query-applier:
//! `{"column": ..., "operator": ..., "value": ...}`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod value;
pub use value::FilterValue;

/// Filter operator vocabulary.
///
/// The declaration order here is canonical: it is the order operators are
/// advertised to the model and the order `OperatorSet::all()` iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    Between,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    DateEquals,
    DateBefore,
    DateAfter,
    DateBetween,
}

/// Required shape of a predicate's value for a given operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A single scalar (string or number).
    Scalar,
    /// Exactly a 2-element ordered pair.
    Pair,
    /// A non-empty ordered sequence.
    Sequence,
    /// No value required; an omitted or null value is accepted.
    Valueless,
}

impl FilterOperator {
    /// All operators, in canonical order.
    pub const ALL: [FilterOperator; 16] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::Between,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
        FilterOperator::DateEquals,
        FilterOperator::DateBefore,
        FilterOperator::DateAfter,
        FilterOperator::DateBetween,
    ];

    /// Wire name, e.g. `starts_with`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
            FilterOperator::DateEquals => "date_equals",
            FilterOperator::DateBefore => "date_before",
            FilterOperator::DateAfter => "date_after",
            FilterOperator::DateBetween => "date_between",
        }
    }

    /// The value shape this operator requires.
    pub fn value_shape(&self) -> ValueShape {
        match self {
            FilterOperator::Between | FilterOperator::DateBetween => ValueShape::Pair,
            FilterOperator::In | FilterOperator::NotIn => ValueShape::Sequence,
            FilterOperator::IsNull | FilterOperator::IsNotNull => ValueShape::Valueless,
            _ => ValueShape::Scalar,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown filter operator: {0}")]
pub struct UnknownOperator(String);

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// The enabled subset of operators, preserving canonical order.
///
/// A single `OperatorSet` value feeds both the prompt builder and the
/// response validator, so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSet {
    operators: Vec<FilterOperator>,
}

impl OperatorSet {
    /// The full canonical set.
    pub fn all() -> Self {
        Self {
            operators: FilterOperator::ALL.to_vec(),
        }
    }

    /// A subset, re-ordered into canonical order and de-duplicated.
    pub fn from_subset(subset: &[FilterOperator]) -> Self {
        Self {
            operators: FilterOperator::ALL
                .iter()
                .copied()
                .filter(|op| subset.contains(op))
                .collect(),
        }
    }

    pub fn contains(&self, op: FilterOperator) -> bool {
        self.operators.contains(&op)
    }

    pub fn iter(&self) -> impl Iterator<Item = FilterOperator> + '_ {
        self.operators.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Wire names of the enabled operators, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.operators.iter().map(|op| op.as_str()).collect()
    }

    /// The comma-joined operator list as advertised to the model.
    pub fn as_prompt_list(&self) -> String {
        self.names().join(", ")
    }
}

impl Default for OperatorSet {
    fn default() -> Self {
        Self::all()
    }
}

/// One structured filter condition emitted by the translation pipeline.
///
/// Constructed only by the response parser; immutable once produced. The
/// `value` may be omitted on the wire for `is_null`/`is_not_null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "FilterValue::is_null")]
    pub value: FilterValue,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    /// Whether the value satisfies the operator's required shape.
    pub fn shape_ok(&self) -> bool {
        match self.operator.value_shape() {
            ValueShape::Pair => self.value.as_list().map(|l| l.len()) == Some(2),
            ValueShape::Sequence => self.value.as_list().is_some(),
            // A stray value on a valueless operator is ignored, not rejected.
            ValueShape::Valueless => true,
            ValueShape::Scalar => self.value.is_scalar(),
        }
    }
}

/// Deterministic cache key for a translation request.
///
/// SHA-256 over the trimmed query, the JSON-serialized column list and the
/// locale tag, hex-encoded and namespaced by `prefix`.
pub fn fingerprint(query: &str, columns: &[String], locale_tag: &str, prefix: &str) -> String {
    let columns_json =
        serde_json::to_string(columns).expect("a string list should always serialize");
    let mut hasher = Sha256::new();
    hasher.update(query.trim().as_bytes());
    hasher.update(columns_json.as_bytes());
    hasher.update(locale_tag.as_bytes());
    format!("{}:{:x}", prefix, hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for op in FilterOperator::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
            let back: FilterOperator = serde_json::from_str(&json).unwrap();
            assert_eq!(back, op);
            assert_eq!(op.as_str().parse::<FilterOperator>().unwrap(), op);
        }
        assert!("bogus_op".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_value_shapes() {
        assert_eq!(FilterOperator::Contains.value_shape(), ValueShape::Scalar);
        assert_eq!(FilterOperator::Between.value_shape(), ValueShape::Pair);
        assert_eq!(FilterOperator::DateBetween.value_shape(), ValueShape::Pair);
        assert_eq!(FilterOperator::In.value_shape(), ValueShape::Sequence);
        assert_eq!(FilterOperator::NotIn.value_shape(), ValueShape::Sequence);
        assert_eq!(FilterOperator::IsNull.value_shape(), ValueShape::Valueless);
    }

    #[test]
    fn test_shape_ok() {
        let pair = Predicate::new(
            "age",
            FilterOperator::Between,
            FilterValue::List(vec![FilterValue::Int(18), FilterValue::Int(30)]),
        );
        assert!(pair.shape_ok());

        let not_pair = Predicate::new("age", FilterOperator::Between, FilterValue::Int(5));
        assert!(!not_pair.shape_ok());

        let triple = Predicate::new(
            "age",
            FilterOperator::Between,
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Int(2),
                FilterValue::Int(3),
            ]),
        );
        assert!(!triple.shape_ok());

        let valueless = Predicate::new("deleted_at", FilterOperator::IsNull, FilterValue::Null);
        assert!(valueless.shape_ok());
    }

    #[test]
    fn test_predicate_value_optional_on_wire() {
        let p: Predicate =
            serde_json::from_str(r#"{"column":"deleted_at","operator":"is_null"}"#).unwrap();
        assert!(p.value.is_null());
        assert!(p.shape_ok());

        // Null value is dropped again on serialize.
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"column":"deleted_at","operator":"is_null"}"#);
    }

    #[test]
    fn test_operator_set_subset_order() {
        let set = OperatorSet::from_subset(&[
            FilterOperator::Between,
            FilterOperator::Equals,
            FilterOperator::Contains,
        ]);
        // Canonical order, not insertion order.
        assert_eq!(set.names(), vec!["equals", "contains", "between"]);
        assert!(set.contains(FilterOperator::Equals));
        assert!(!set.contains(FilterOperator::In));
    }

    #[test]
    fn test_prompt_list_matches_names() {
        let set = OperatorSet::all();
        assert_eq!(set.len(), 16);
        assert_eq!(set.as_prompt_list(), set.names().join(", "));
        assert!(set.as_prompt_list().starts_with("equals, not_equals"));
        assert!(set.as_prompt_list().ends_with("date_between"));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let cols = vec!["id".to_string(), "name".to_string()];
        let a = fingerprint("name contains john", &cols, "en", "nl_filter");
        let b = fingerprint("name contains john", &cols, "en", "nl_filter");
        assert_eq!(a, b);
        assert!(a.starts_with("nl_filter:"));

        // Any input change changes the key.
        assert_ne!(a, fingerprint("name contains jane", &cols, "en", "nl_filter"));
        assert_ne!(
            a,
            fingerprint("name contains john", &["id".to_string()], "en", "nl_filter")
        );
        assert_ne!(a, fingerprint("name contains john", &cols, "ar", "nl_filter"));

        // Surrounding whitespace is normalized away.
        assert_eq!(
            a,
            fingerprint("  name contains john  ", &cols, "en", "nl_filter")
        );
    }
}
