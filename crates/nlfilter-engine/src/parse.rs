//! Response parsing and validation
//!
//! Turns raw model text into a validated predicate list. Models wrap JSON
//! in markdown fences or surrounding prose often enough that both are
//! tolerated here. A malformed response is a recoverable condition logged
//! as a warning, never an error surfaced to the caller; individually
//! invalid elements are dropped without invalidating the rest.

use nlfilter_predicate::{FilterOperator, FilterValue, OperatorSet, Predicate, ValueShape};
use serde_json::Value;
use thiserror::Error;

/// Why an individual element was dropped. Logged per violation so the
/// distinction between "no filters needed" and "model produced garbage"
/// stays inspectable.
#[derive(Debug, Error)]
enum Violation {
    #[error("element is not an object")]
    NotAnObject,

    #[error("missing key: {0}")]
    MissingKey(&'static str),

    #[error("column is not a non-empty string")]
    BadColumn,

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("value does not satisfy the {0:?} shape required by {1}")]
    BadShape(ValueShape, FilterOperator),
}

/// Parse raw model output into the surviving predicates, in original order.
pub fn parse_predicates(raw: &str, operators: &OperatorSet) -> Vec<Predicate> {
    let body = extract_array_text(raw);

    let decoded: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, response = raw, "failed to parse model response as JSON");
            return Vec::new();
        }
    };

    let elements = match decoded {
        Value::Array(elements) => elements,
        other => {
            tracing::warn!(response = %other, "model response is not a JSON array");
            return Vec::new();
        }
    };

    let mut predicates = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match validate_element(element, operators) {
            Ok(predicate) => predicates.push(predicate),
            Err(violation) => {
                tracing::warn!(index, %violation, element = %element, "dropping invalid filter from model response");
            }
        }
    }
    predicates
}

/// Trim, strip an optional markdown fence, and cut the first `[` .. last
/// `]` span when prose surrounds the array.
fn extract_array_text(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence line ("```json" or bare "```").
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.strip_prefix("json").unwrap_or(rest),
        };
        text = text.trim();
        if let Some(body) = text.strip_suffix("```") {
            text = body.trim();
        }
    }

    // Greedy span from the first '[' to the last ']' cuts away any prose
    // the model added around the array.
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    text.to_string()
}

fn validate_element(element: &Value, operators: &OperatorSet) -> Result<Predicate, Violation> {
    let object = element.as_object().ok_or(Violation::NotAnObject)?;

    let column = object
        .get("column")
        .ok_or(Violation::MissingKey("column"))?
        .as_str()
        .filter(|name| !name.trim().is_empty())
        .ok_or(Violation::BadColumn)?;

    let operator_name = object
        .get("operator")
        .ok_or(Violation::MissingKey("operator"))?;
    let operator = operator_name
        .as_str()
        .and_then(|name| name.parse::<FilterOperator>().ok())
        .filter(|op| operators.contains(*op))
        .ok_or_else(|| Violation::UnsupportedOperator(operator_name.to_string()))?;

    let value = match object.get("value") {
        Some(value) => serde_json::from_value::<FilterValue>(value.clone())
            .map_err(|_| Violation::BadShape(operator.value_shape(), operator))?,
        // Tolerated only for is_null / is_not_null.
        None if operator.value_shape() == ValueShape::Valueless => FilterValue::Null,
        None => return Err(Violation::MissingKey("value")),
    };

    let predicate = Predicate::new(column, operator, value);
    if !predicate.shape_ok() {
        return Err(Violation::BadShape(operator.value_shape(), operator));
    }
    Ok(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> OperatorSet {
        OperatorSet::all()
    }

    #[test]
    fn test_plain_array_round_trip() {
        let raw = r#"[{"column":"name","operator":"contains","value":"john"}]"#;
        let predicates = parse_predicates(raw, &all());
        assert_eq!(
            predicates,
            vec![Predicate::new(
                "name",
                FilterOperator::Contains,
                FilterValue::from("john")
            )]
        );
    }

    #[test]
    fn test_markdown_fence_stripped() {
        let raw = "```json\n[{\"column\":\"name\",\"operator\":\"contains\",\"value\":\"john\"}]\n```";
        let predicates = parse_predicates(raw, &all());
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].column, "name");

        let bare_fence = "```\n[{\"column\":\"name\",\"operator\":\"equals\",\"value\":\"x\"}]\n```";
        assert_eq!(parse_predicates(bare_fence, &all()).len(), 1);
    }

    #[test]
    fn test_surrounding_prose_extracted() {
        let raw = r#"Here are your filters:
[{"column":"age","operator":"greater_than","value":25}]
Let me know if you need anything else."#;
        let predicates = parse_predicates(raw, &all());
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].operator, FilterOperator::GreaterThan);
        assert_eq!(predicates[0].value, FilterValue::Int(25));
    }

    #[test]
    fn test_malformed_json_yields_empty() {
        assert!(parse_predicates("not json at all", &all()).is_empty());
        assert!(parse_predicates("[{\"column\": \"name\",", &all()).is_empty());
        assert!(parse_predicates("", &all()).is_empty());
    }

    #[test]
    fn test_non_array_yields_empty() {
        assert!(parse_predicates(r#"{"column":"a","operator":"equals","value":1}"#, &all()).is_empty());
        assert!(parse_predicates("\"just a string\"", &all()).is_empty());
    }

    #[test]
    fn test_unknown_operator_dropped() {
        let raw = r#"[{"column":"age","operator":"bogus_op","value":5}]"#;
        assert!(parse_predicates(raw, &all()).is_empty());
    }

    #[test]
    fn test_disabled_operator_dropped() {
        let subset = OperatorSet::from_subset(&[FilterOperator::Equals]);
        let raw = r#"[{"column":"name","operator":"contains","value":"x"}]"#;
        assert!(parse_predicates(raw, &subset).is_empty());
    }

    #[test]
    fn test_between_shape_enforced() {
        let not_a_pair = r#"[{"column":"age","operator":"between","value":5}]"#;
        assert!(parse_predicates(not_a_pair, &all()).is_empty());

        let pair = r#"[{"column":"age","operator":"between","value":[18,30]}]"#;
        let predicates = parse_predicates(pair, &all());
        assert_eq!(predicates.len(), 1);
        assert_eq!(
            predicates[0].value,
            FilterValue::List(vec![FilterValue::Int(18), FilterValue::Int(30)])
        );
    }

    #[test]
    fn test_in_requires_sequence() {
        let scalar = r#"[{"column":"status","operator":"in","value":"active"}]"#;
        assert!(parse_predicates(scalar, &all()).is_empty());

        let sequence = r#"[{"column":"status","operator":"in","value":["active","pending"]}]"#;
        assert_eq!(parse_predicates(sequence, &all()).len(), 1);
    }

    #[test]
    fn test_valueless_operator_tolerates_missing_value() {
        let omitted = r#"[{"column":"deleted_at","operator":"is_null"}]"#;
        let predicates = parse_predicates(omitted, &all());
        assert_eq!(predicates.len(), 1);
        assert!(predicates[0].value.is_null());

        let null_value = r#"[{"column":"deleted_at","operator":"is_not_null","value":null}]"#;
        assert_eq!(parse_predicates(null_value, &all()).len(), 1);

        // Other operators still require the key.
        let missing = r#"[{"column":"name","operator":"contains"}]"#;
        assert!(parse_predicates(missing, &all()).is_empty());
    }

    #[test]
    fn test_partial_validity_keeps_order() {
        let raw = r#"[
            {"column":"name","operator":"contains","value":"john"},
            {"column":"age","operator":"bogus_op","value":5},
            {"operator":"equals","value":1},
            {"column":"email","operator":"ends_with","value":"@example.com"}
        ]"#;
        let predicates = parse_predicates(raw, &all());
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[0].column, "name");
        assert_eq!(predicates[1].column, "email");
    }

    #[test]
    fn test_extra_keys_ignored() {
        let raw = r#"[{"column":"name","operator":"equals","value":"x","confidence":0.9}]"#;
        assert_eq!(parse_predicates(raw, &all()).len(), 1);
    }
}
