//! Input validation utilities.
//!
//! Caller input is checked here before any retrieval or model call is attempted.

use crate::prompt::PromptVariant;
use crate::TriageResult;
use triage_types::SymptomText;

/// Validates a symptom description.
///
/// # Errors
///
/// Returns a `TriageError::Validation` if the text is blank, shorter than 3 characters once
/// trimmed, or longer than 2000 characters.
pub fn validate_symptoms(symptoms: &str) -> TriageResult<SymptomText> {
    Ok(SymptomText::new(symptoms)?)
}

/// Parses a prompt variant name supplied by a caller.
///
/// # Errors
///
/// Returns a `TriageError::Validation` for anything other than `zero`, `few`, `chain` or
/// `role`.
pub fn parse_prompt_variant(name: &str) -> TriageResult<PromptVariant> {
    Ok(name.parse::<PromptVariant>()?)
}
