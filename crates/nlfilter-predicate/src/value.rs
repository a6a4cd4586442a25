//! JSON value model for predicate values

use serde::{Deserialize, Serialize};

/// A filter value as it appears on the wire.
///
/// Untagged: scalars, pairs and sequences all decode from plain JSON
/// without a discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<FilterValue>),
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Null
    }
}

impl FilterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    /// The elements when this value is a sequence.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for single scalar values (not null, not a sequence).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FilterValue::Bool(_) | FilterValue::Int(_) | FilterValue::Float(_) | FilterValue::Text(_)
        )
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_decode() {
        let v: FilterValue = serde_json::from_str("\"john\"").unwrap();
        assert_eq!(v, FilterValue::Text("john".to_string()));

        let v: FilterValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, FilterValue::Int(42));

        let v: FilterValue = serde_json::from_str("[18, 30]").unwrap();
        assert_eq!(
            v,
            FilterValue::List(vec![FilterValue::Int(18), FilterValue::Int(30)])
        );

        let v: FilterValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_scalar_classification() {
        assert!(FilterValue::from("x").is_scalar());
        assert!(FilterValue::from(1).is_scalar());
        assert!(!FilterValue::Null.is_scalar());
        assert!(!FilterValue::List(vec![]).is_scalar());
    }
}
