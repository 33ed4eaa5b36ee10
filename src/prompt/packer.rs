use super::ENTRY_SEPARATOR;
use crate::record::Record;
use crate::resolver::resolve_text;
use tracing::warn;

/// One record's line in the packed summary text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEntry {
    /// Zero-based index of the source record
    pub original_index: usize,
    /// Full entry, `"Record {n}: {text}"`, possibly truncated
    pub text: String,
}

/// Result of packing records into a bounded summary text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPrompt {
    /// Entries in source order
    pub entries: Vec<PromptEntry>,
    /// Entries joined by [`ENTRY_SEPARATOR`], never longer than the budget
    pub combined_text: String,
    /// Length of `combined_text` in characters
    pub total_chars: usize,
    /// Whether any text was cut to fit the budget
    pub truncated: bool,
}

impl PackedPrompt {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Greedily pack record texts into a single summary text of at most `max_chars`.
///
/// Rules:
/// - Only the first `max_records` records are eligible; records without text are skipped
/// - Each entry costs its length plus one separator when it is not the first
/// - Entries are taken in order until the next one would overflow, then packing stops
/// - A first entry that overflows on its own is truncated to fill the budget exactly
///
/// Lengths are counted in characters, not bytes.
pub fn pack_summary(
    records: &[Record],
    preferred_field: &str,
    max_records: usize,
    max_chars: usize,
) -> PackedPrompt {
    let mut entries: Vec<PromptEntry> = Vec::new();
    let mut running_total = 0;
    let mut truncated = false;

    for (index, record) in records.iter().enumerate().take(max_records) {
        let Some(text) = resolve_text(record, index, preferred_field) else {
            continue;
        };

        let prefix = format!("Record {}: ", index + 1);
        let entry = format!("{prefix}{text}");
        let separator_cost = usize::from(!entries.is_empty());
        let candidate = entry.chars().count() + separator_cost;

        if running_total + candidate <= max_chars {
            running_total += candidate;
            entries.push(PromptEntry {
                original_index: index,
                text: entry,
            });
            continue;
        }

        if entries.is_empty() {
            let room = max_chars.saturating_sub(prefix.chars().count());
            if room > 0 {
                let cut = format!("{prefix}{}", take_chars(text, room));
                truncated = true;
                entries.push(PromptEntry {
                    original_index: index,
                    text: cut,
                });
                warn!(index, max_chars, "first summary record truncated to fit the budget");
            }
        } else {
            warn!(
                index,
                packed = entries.len(),
                max_chars,
                "stopped adding records to the summary to stay within the character budget"
            );
        }
        break;
    }

    let separator = ENTRY_SEPARATOR.to_string();
    let mut combined_text = entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(&separator);

    let mut total_chars = combined_text.chars().count();
    if total_chars > max_chars {
        combined_text = take_chars(&combined_text, max_chars).to_string();
        total_chars = max_chars;
        truncated = true;
        warn!(max_chars, "combined summary text truncated to the character budget");
    }

    PackedPrompt {
        entries,
        combined_text,
        total_chars,
        truncated,
    }
}

/// Longest prefix of `text` holding at most `n` characters
fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
