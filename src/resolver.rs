use crate::record::Record;
use serde_json::Value;
use tracing::debug;

/// Fields tried after the configured one, in order
pub const FALLBACK_TEXT_FIELDS: [&str; 2] = ["text_content", "text_column"];

/// Find the text to analyze in a record.
///
/// Resolution order, first match wins:
/// 1. `preferred_field`, if it holds text
/// 2. each of [`FALLBACK_TEXT_FIELDS`], if it holds text
/// 3. the first text-valued field in insertion order
///
/// Empty strings do not count as text, so an empty preferred field falls through to
/// the next candidate rather than ending the search: `{"text_column": "", "title": "Foo"}`
/// resolves to `"Foo"`. Returns `None` when no field qualifies.
pub fn resolve_text<'a>(record: &'a Record, index: usize, preferred_field: &str) -> Option<&'a str> {
    let named = std::iter::once(preferred_field)
        .chain(FALLBACK_TEXT_FIELDS)
        .find_map(|field| record.get(field).and_then(non_empty_text));

    let text = named.or_else(|| record.values().find_map(non_empty_text));
    if text.is_none() {
        debug!(index, preferred_field, "no text field found in record");
    }
    text
}

fn non_empty_text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_preferred_field_wins() {
        let r = record(json!({"text_content": "fallback", "review": "preferred"}));
        assert_eq!(resolve_text(&r, 0, "review"), Some("preferred"));
    }

    #[test]
    fn test_text_content_before_text_column() {
        let r = record(json!({"text_column": "column", "text_content": "content"}));
        assert_eq!(resolve_text(&r, 0, "missing"), Some("content"));
    }

    #[test]
    fn test_text_column_fallback() {
        let r = record(json!({"other": "first", "text_column": "column"}));
        assert_eq!(resolve_text(&r, 0, "missing"), Some("column"));
    }

    #[test]
    fn test_non_text_preferred_field_is_skipped() {
        let r = record(json!({"review": 5, "text_column": "column"}));
        assert_eq!(resolve_text(&r, 0, "review"), Some("column"));
    }

    #[test]
    fn test_first_text_field_in_insertion_order() {
        let r = record(json!({"foo": 1, "notes": "hello"}));
        assert_eq!(resolve_text(&r, 0, "text_column"), Some("hello"));
    }

    #[test]
    fn test_insertion_order_not_alphabetical() {
        let r = record(json!({"zeta": "z", "alpha": "a"}));
        assert_eq!(resolve_text(&r, 0, "text_column"), Some("z"));
    }

    #[test]
    fn test_empty_string_is_not_text() {
        let r = record(json!({"text_column": "", "other": "x"}));
        assert_eq!(resolve_text(&r, 0, "text_column"), Some("x"));
    }

    #[test]
    fn test_empty_preferred_field_falls_through() {
        let r = record(json!({"text_column": "", "title": "Foo"}));
        assert_eq!(resolve_text(&r, 0, "text_column"), Some("Foo"));

        let only_empty = record(json!({"text_column": "", "text_content": ""}));
        assert_eq!(resolve_text(&only_empty, 0, "text_column"), None);
    }

    #[test]
    fn test_no_text_found() {
        let r = record(json!({"n": 1, "flag": true, "nested": {"s": "inner"}, "list": ["x"]}));
        assert_eq!(resolve_text(&r, 3, "text_column"), None);
    }
}
