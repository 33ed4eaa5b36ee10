use super::{RecordParser, decode_utf8};
use crate::error::DatasetError;
use crate::record::{Record, record_from_pairs};
use serde_json::Value;

const FORMAT: &str = "txt";

pub const LINE_NUMBER_FIELD: &str = "line_number";
pub const TEXT_CONTENT_FIELD: &str = "text_content";

/// One record per non-blank line: `{line_number, text_content}`
///
/// Lines break on `\n`, `\r\n`, bare `\r` and the other Unicode line boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl RecordParser for TextParser {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError> {
        let text = decode_utf8(FORMAT, bytes)?;

        let mut records: Vec<Record> = text
            .split(is_line_boundary)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(i, line)| line_record(i + 1, line))
            .collect();

        // Single block with no surviving lines
        let trimmed = text.trim();
        if records.is_empty() && !trimmed.is_empty() {
            records.push(line_record(1, trimmed));
        }

        Ok(records)
    }
}

/// Every character that ends a line, `\r` and the Unicode separators included
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}'..='\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn line_record(line_number: usize, text: &str) -> Record {
    record_from_pairs([
        (LINE_NUMBER_FIELD, Value::from(line_number)),
        (TEXT_CONTENT_FIELD, Value::String(text.to_string())),
    ])
}
