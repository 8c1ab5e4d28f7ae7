//! Prompt templates for the three model-backed services.

/// Instruction sent alongside the inline media for transcription.
pub const TRANSCRIBE_INSTRUCTION: &str = "Please transcribe this audio file completely. \
Provide only the transcribed text without any additional commentary or formatting.";

const EXTRACTION_SYSTEM: &str = "\
You are a business analyst expert. Analyze the meeting transcript and extract \
structured business requirements to create a comprehensive Business Requirements \
Document (BRD).

Extract and organize the following information:
1. Project title and overview
2. Business objectives
3. Scope (in-scope and out-of-scope items)
4. Functional requirements with IDs, titles, descriptions, and priorities
5. Non-functional requirements with categories
6. Stakeholders mentioned with their roles
7. Constraints and assumptions

Respond with a single JSON object and nothing else, using exactly these keys: \
title, subtitle, projectOverview, businessObjectives (array of strings), \
scope (object with inScope and outOfScope string arrays), \
functionalRequirements (array of {id, title, description, priority} where \
priority is \"high\", \"medium\" or \"low\"), \
nonFunctionalRequirements (array of {id, title, description, category}), \
stakeholders (array of {name, role, responsibility}), \
constraints (array of strings), assumptions (array of strings).";

/// Full extraction prompt for one transcript.
pub fn extraction_prompt(transcript: &str) -> String {
    format!(
        "{EXTRACTION_SYSTEM}\n\nPlease analyze this meeting transcript and extract \
business requirements:\n\n{transcript}"
    )
}

/// Prompt asking the model to rate extraction quality with a bare integer.
pub fn confidence_prompt(
    transcript_chars: usize,
    functional_count: usize,
    non_functional_count: usize,
) -> String {
    format!(
        "Analyze the quality and completeness of business requirements extraction.\n\n\
Original transcript length: {transcript_chars} characters\n\
Extracted requirements: {functional_count} functional, {non_functional_count} non-functional\n\n\
Rate the confidence score (0-100) based on:\n\
- Clarity of extracted requirements\n\
- Completeness of information\n\
- Relevance to business context\n\
- Quality of requirement descriptions\n\n\
Respond with only a number between 0 and 100."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_embeds_transcript() {
        let prompt = extraction_prompt("we need a customer portal");
        assert!(prompt.contains("we need a customer portal"));
        assert!(prompt.contains("functionalRequirements"));
    }

    #[test]
    fn confidence_prompt_reports_counts() {
        let prompt = confidence_prompt(1200, 4, 3);
        assert!(prompt.contains("1200 characters"));
        assert!(prompt.contains("4 functional, 3 non-functional"));
    }
}
