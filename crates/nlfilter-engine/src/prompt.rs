//! Prompt construction for the model backend
//!
//! Two strings per request: a system instruction carrying the output
//! contract and the operator vocabulary, and a user instruction carrying
//! the literal query text. Both are deterministic given the operator set,
//! the locale and the inputs — no I/O, no clock, no randomness — so that
//! caching and tests stay tractable.

use crate::locale::Locale;
use nlfilter_predicate::OperatorSet;

/// System instruction: role, output-format contract, operator vocabulary,
/// multilingual handling rules and few-shot examples across scripts.
///
/// The operator list is interpolated from the same [`OperatorSet`] the
/// response validator uses, so the two can never disagree.
pub fn system_prompt(operators: &OperatorSet, locale: Locale) -> String {
    format!(
        r#"You are a database query assistant that converts natural language queries into structured filter arrays.

IMPORTANT RULES:
1. Return ONLY valid JSON array format
2. Each filter must have exactly these keys: 'column', 'operator', 'value'
3. Use only these operators: {operators}
4. For date operations, convert relative dates (yesterday, last week, etc.) to actual dates
5. Be flexible with column name matching (e.g., 'name' could match 'full_name', 'user_name', etc.)
6. Understand queries in ANY language and convert them appropriately
7. If the query is unclear or cannot be processed, return an empty array: []

RESPONSE FORMAT:
[{{"column": "column_name", "operator": "operator_type", "value": "filter_value"}}]

EXAMPLES (Multiple Languages):
- English: 'users created after 2023' -> [{{"column": "created_at", "operator": "date_after", "value": "2023-01-01"}}]
- Arabic: 'الاسم يحتوي على أحمد' -> [{{"column": "name", "operator": "contains", "value": "أحمد"}}]
- Spanish: 'usuarios con nombre juan' -> [{{"column": "name", "operator": "contains", "value": "juan"}}]
- French: 'nom contient marie' -> [{{"column": "name", "operator": "contains", "value": "marie"}}]
- German: 'benutzer erstellt nach 2023' -> [{{"column": "created_at", "operator": "date_after", "value": "2023-01-01"}}]
- Chinese: '姓名包含张三' -> [{{"column": "name", "operator": "contains", "value": "张三"}}]
- English range: 'age between 18 and 30' -> [{{"column": "age", "operator": "between", "value": [18, 30]}}]
- English null check: 'users without a deleted date' -> [{{"column": "deleted_at", "operator": "is_null"}}]

LANGUAGE HANDLING:
- Automatically detect and understand the input language
- Map language-specific keywords to operators (contains, equals, between, etc.)
- Preserve original values (names, text) in their original language
- Handle mixed-language queries naturally

Current locale: {locale}"#,
        operators = operators.as_prompt_list(),
        locale = locale.as_tag(),
    )
}

/// User instruction: the literal query, the advisory column list and the
/// JSON-only directive.
pub fn user_prompt(query: &str, columns: &[String]) -> String {
    let mut prompt = format!("Convert this natural language query to database filters: \"{query}\"");

    if !columns.is_empty() {
        prompt.push_str("\n\nAvailable database columns: ");
        prompt.push_str(&columns.join(", "));
        prompt.push_str("\nPlease use only these column names in your response.");
    }

    prompt.push_str("\n\nNote: The query may be in any language. Please understand the intent and map keywords to the appropriate operators automatically.");
    prompt.push_str("\n\nReturn only the JSON array, no additional text or explanation.");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_advertises_exact_operator_list() {
        let operators = OperatorSet::all();
        let prompt = system_prompt(&operators, Locale::En);
        // Byte-identical to what the validator accepts.
        assert!(prompt.contains(&operators.as_prompt_list()));
        assert!(prompt.contains("Current locale: en"));
    }

    #[test]
    fn test_system_prompt_deterministic() {
        let operators = OperatorSet::all();
        assert_eq!(
            system_prompt(&operators, Locale::Ar),
            system_prompt(&operators, Locale::Ar)
        );
        // Locale changes only the hint, not the contract.
        assert!(system_prompt(&operators, Locale::Ar).contains("Current locale: ar"));
    }

    #[test]
    fn test_system_prompt_spans_multiple_scripts() {
        let prompt = system_prompt(&OperatorSet::all(), Locale::En);
        assert!(prompt.contains("أحمد")); // Arabic
        assert!(prompt.contains("张三")); // Han
        assert!(prompt.contains("marie")); // Latin
    }

    #[test]
    fn test_user_prompt_includes_column_directive_only_when_present() {
        let with_columns = user_prompt(
            "name contains john",
            &["id".to_string(), "name".to_string(), "email".to_string()],
        );
        assert!(with_columns.contains("\"name contains john\""));
        assert!(with_columns.contains("id, name, email"));
        assert!(with_columns.contains("use only these column names"));

        let without_columns = user_prompt("name contains john", &[]);
        assert!(!without_columns.contains("Available database columns"));
        assert!(without_columns.contains("Return only the JSON array"));
    }
}
