use crate::insight::InsightError;
use crate::prompt::PromptStrategy;

/// Field receiving per-record insights
pub const INSIGHT_FIELD: &str = "ai_insight";
/// Field receiving the broadcast summary insight
pub const SUMMARY_FIELD: &str = "ai_overall_summary_insight";

pub const TEXT_NOT_FOUND: &str = "N/A - No suitable text field found";
pub const NOTHING_TO_SUMMARIZE: &str = "N/A - No text to summarize";

/// What a record (or the whole batch) gets written back
#[derive(Debug)]
pub enum Augmentation {
    Insight(String),
    TextNotFound,
    NothingToSummarize,
    ServiceError(InsightError),
}

impl Augmentation {
    /// Field name for the given strategy
    pub fn field(strategy: PromptStrategy) -> &'static str {
        match strategy {
            PromptStrategy::PerRecord => INSIGHT_FIELD,
            PromptStrategy::SummarizeAll => SUMMARY_FIELD,
        }
    }

    /// Stored field value: the insight, a sentinel, or an error marker
    pub fn render(&self, strategy: PromptStrategy) -> String {
        match (self, strategy) {
            (Self::Insight(text), _) => text.clone(),
            (Self::TextNotFound, _) => TEXT_NOT_FOUND.to_string(),
            (Self::NothingToSummarize, _) => NOTHING_TO_SUMMARIZE.to_string(),
            (Self::ServiceError(e), PromptStrategy::PerRecord) => format!("Error: {e}"),
            (Self::ServiceError(e), PromptStrategy::SummarizeAll) => {
                format!("Error generating summary: {e}")
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::ServiceError(_))
    }
}
