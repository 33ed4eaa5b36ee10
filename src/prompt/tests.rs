use super::*;
use crate::record::Record;
use serde_json::json;

fn text_record(text: &str) -> Record {
    json!({ "text_column": text }).as_object().unwrap().clone()
}

/// Records whose packed entries ("Record n: " + text) have the given lengths
fn records_with_entry_lengths(lengths: &[usize]) -> Vec<Record> {
    lengths
        .iter()
        .enumerate()
        .map(|(i, len)| {
            let prefix_len = format!("Record {}: ", i + 1).len();
            text_record(&"x".repeat(len - prefix_len))
        })
        .collect()
}

#[test]
fn test_greedy_stops_at_first_overflow() {
    let records = records_with_entry_lengths(&[100, 100, 9000]);
    let packed = pack_summary(&records, "text_column", 100, 150);

    assert_eq!(packed.entries.len(), 1);
    assert_eq!(packed.entries[0].original_index, 0);
    assert_eq!(packed.total_chars, 100);
    assert!(!packed.truncated);
}

#[test]
fn test_no_backfill_from_later_short_records() {
    let records = records_with_entry_lengths(&[100, 9000, 20]);
    let packed = pack_summary(&records, "text_column", 100, 150);

    assert_eq!(packed.entries.len(), 1);
    assert_eq!(packed.entries[0].original_index, 0);
}

#[test]
fn test_separator_is_counted() {
    // 50 + 1 + 49 = 100 fits exactly, 50 + 1 + 50 does not
    let fits = pack_summary(&records_with_entry_lengths(&[50, 49]), "text_column", 100, 100);
    assert_eq!(fits.entries.len(), 2);
    assert_eq!(fits.total_chars, 100);

    let overflows = pack_summary(&records_with_entry_lengths(&[50, 50]), "text_column", 100, 100);
    assert_eq!(overflows.entries.len(), 1);
}

#[test]
fn test_entries_joined_with_newline() {
    let records = vec![text_record("alpha"), text_record("beta")];
    let packed = pack_summary(&records, "text_column", 100, 1000);

    assert_eq!(packed.combined_text, "Record 1: alpha\nRecord 2: beta");
    assert_eq!(packed.total_chars, packed.combined_text.len());
}

#[test]
fn test_records_without_text_keep_their_index() {
    let records = vec![
        json!({"n": 1}).as_object().unwrap().clone(),
        text_record("second"),
    ];
    let packed = pack_summary(&records, "text_column", 100, 1000);

    assert_eq!(packed.combined_text, "Record 2: second");
    assert_eq!(packed.entries[0].original_index, 1);
}

#[test]
fn test_max_records_is_a_hard_slice() {
    let records: Vec<Record> = (0..10).map(|i| text_record(&format!("t{i}"))).collect();
    let packed = pack_summary(&records, "text_column", 3, 10_000);

    assert_eq!(packed.entries.len(), 3);
    assert_eq!(packed.entries.last().unwrap().original_index, 2);
}

#[test]
fn test_oversized_first_record_is_truncated_to_budget() {
    let records = vec![text_record(&"y".repeat(500)), text_record("short")];
    let packed = pack_summary(&records, "text_column", 100, 50);

    assert_eq!(packed.entries.len(), 1);
    assert!(packed.truncated);
    assert_eq!(packed.total_chars, 50);
    assert_eq!(packed.combined_text.chars().count(), 50);
    assert!(packed.combined_text.starts_with("Record 1: yyy"));
}

#[test]
fn test_budget_smaller_than_prefix_packs_nothing() {
    let records = vec![text_record("some text"), text_record("more")];
    let packed = pack_summary(&records, "text_column", 100, 5);

    assert!(packed.is_empty());
    assert_eq!(packed.combined_text, "");
    assert_eq!(packed.total_chars, 0);
}

#[test]
fn test_no_text_anywhere_packs_nothing() {
    let records = vec![json!({"n": 1}).as_object().unwrap().clone()];
    assert!(pack_summary(&records, "text_column", 100, 1000).is_empty());
    assert!(pack_summary(&[], "text_column", 100, 1000).is_empty());
}

#[test]
fn test_lengths_are_counted_in_characters() {
    // "Record 1: " is 10 chars, the text is 5 chars but 15 bytes
    let records = vec![text_record("日本語テキ"), text_record("b")];
    let packed = pack_summary(&records, "text_column", 100, 15);

    assert_eq!(packed.entries.len(), 1);
    assert_eq!(packed.total_chars, 15);
    assert!(!packed.truncated);
}

#[test]
fn test_truncation_respects_char_boundaries() {
    let records = vec![text_record(&"é".repeat(100))];
    let packed = pack_summary(&records, "text_column", 100, 20);

    assert_eq!(packed.combined_text.chars().count(), 20);
    assert!(packed.combined_text.ends_with('é'));
}

#[test]
fn test_packed_text_never_exceeds_budget() {
    let lengths = [12, 40, 7, 90, 33, 18, 61, 5];
    for budget in [1, 10, 11, 25, 60, 100, 150, 400] {
        let records = records_with_entry_lengths(&lengths);
        let packed = pack_summary(&records, "text_column", 100, budget);
        assert!(
            packed.combined_text.chars().count() <= budget,
            "budget {budget} exceeded"
        );
        assert_eq!(packed.total_chars, packed.combined_text.chars().count());
    }
}

#[test]
fn test_per_record_prompt_embeds_text() {
    let prompt = per_record_prompt("great product");
    assert!(prompt.contains("single data point"));
    assert!(prompt.ends_with("Data Point: \"great product\""));
}

#[test]
fn test_summary_prompt_embeds_combined_text() {
    let prompt = summary_prompt("Record 1: a\nRecord 2: b");
    assert!(prompt.ends_with("Data Records:\nRecord 1: a\nRecord 2: b"));
}

#[test]
fn test_strategy_parsing() {
    assert_eq!("per_record".parse::<PromptStrategy>(), Ok(PromptStrategy::PerRecord));
    assert_eq!("SUMMARIZE_ALL".parse::<PromptStrategy>(), Ok(PromptStrategy::SummarizeAll));
    assert!("batch".parse::<PromptStrategy>().is_err());
    assert_eq!(PromptStrategy::SummarizeAll.to_string(), "summarize_all");
}
