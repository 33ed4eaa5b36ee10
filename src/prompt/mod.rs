mod packer;
mod templates;

#[cfg(test)]
mod tests;

pub use packer::{PackedPrompt, PromptEntry, pack_summary};
pub use templates::{SYSTEM_INSTRUCTION, per_record_prompt, summary_prompt};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Separator placed between packed summary entries
pub const ENTRY_SEPARATOR: char = '\n';

/// Default character budget for the packed summary text
pub const DEFAULT_MAX_CHARS_FOR_SUMMARY: usize = 15_000;

/// Default number of leading records eligible for the summary
pub const DEFAULT_MAX_RECORDS_FOR_SUMMARY: usize = 100;

/// How insights are requested for a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStrategy {
    /// One model call per record with text
    #[default]
    PerRecord,
    /// One model call over a packed digest of the leading records
    SummarizeAll,
}

impl PromptStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerRecord => "per_record",
            Self::SummarizeAll => "summarize_all",
        }
    }
}

impl fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_record" => Ok(Self::PerRecord),
            "summarize_all" => Ok(Self::SummarizeAll),
            other => Err(other.to_string()),
        }
    }
}
