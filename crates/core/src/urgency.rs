//! Rule-based urgency gate.
//!
//! A fixed phrase scan that runs on every analysis, independently of the model. Its signal
//! survives model failures so urgent input is never dropped.

const URGENT_PHRASES: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "severe difficulty breathing",
    "can't breathe",
    "unconscious",
    "severe bleeding",
    "severe allergic reaction",
    "severe burn",
    "severe head injury",
    "severe abdominal pain",
    "severe pain",
    "loss of consciousness",
    "seizure",
    "choking",
    "severe trauma",
    "sudden severe headache",
    "thunderclap headache",
    "severe dizziness",
    "severe confusion",
    "severe weakness",
    "paralysis",
];

/// First urgent phrase found in `symptoms`, case-insensitively.
pub fn matched_phrase(symptoms: &str) -> Option<&'static str> {
    let lowered = symptoms.to_lowercase();
    let found = URGENT_PHRASES
        .iter()
        .copied()
        .find(|phrase| lowered.contains(phrase));
    if let Some(phrase) = found {
        tracing::warn!("Urgent phrase detected: {}", phrase);
    }
    found
}

pub fn is_urgent(symptoms: &str) -> bool {
    matched_phrase(symptoms).is_some()
}
