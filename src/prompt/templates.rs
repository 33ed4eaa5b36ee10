/// System message sent with every insight request
pub const SYSTEM_INSTRUCTION: &str = "You are an AI assistant that provides concise data insights.";

/// Prompt asking for an insight on a single data point
pub fn per_record_prompt(text: &str) -> String {
    format!(
        "Analyze the following single data point and give a concise, actionable insight. \
         Focus on key takeaways, potential implications, or notable observations. \
         The insight should be no more than 2-3 sentences.\n\n\
         Data Point: \"{text}\""
    )
}

/// Prompt asking for one synthesis across the packed records
pub fn summary_prompt(combined_text: &str) -> String {
    format!(
        "You are an expert data analyst. The following is a collection of individual data records. \
         Your task is to identify and synthesize the overarching themes, significant trends, \
         and key insights present across *all* these records. \
         Give a single, comprehensive summary that highlights the most important findings. \
         Avoid analyzing each record separately. Structure your response as a cohesive narrative. \
         Aim for a summary that is insightful and concise, ideally within 3-5 paragraphs.\n\n\
         Data Records:\n{combined_text}"
    )
}
