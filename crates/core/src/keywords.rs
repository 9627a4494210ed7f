//! Keyword extraction from free-text symptom descriptions.

use crate::constants::MAX_KEYWORDS;

/// Curated medical terms, matched as substrings in declaration order.
const MEDICAL_TERMS: &[&str] = &[
    "fever",
    "headache",
    "pain",
    "ache",
    "nausea",
    "vomiting",
    "diarrhea",
    "cough",
    "sore throat",
    "fatigue",
    "tired",
    "shortness of breath",
    "chest pain",
    "abdominal",
    "stomach",
    "rash",
    "itching",
    "swelling",
    "dizziness",
    "lightheaded",
    "chills",
    "sweating",
    "muscle",
    "joint",
    "stiffness",
    "numbness",
    "tingling",
    "weakness",
    "confusion",
    "anxiety",
    "depression",
    "mood",
    "sleep",
    "appetite",
    "weight",
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "i",
    "have", "had", "has", "been", "is", "are", "was", "were", "be", "being",
];

/// Extracts up to 20 distinct keywords from symptom text.
///
/// Known medical terms found anywhere in the lowercased text come first, in the order they are
/// declared. Every remaining word longer than three characters that is not a stop word follows
/// in text order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();

    let mut found: Vec<String> = MEDICAL_TERMS
        .iter()
        .filter(|term| lowered.contains(*term))
        .map(|term| (*term).to_owned())
        .collect();

    for word in lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
    {
        if found.len() >= MAX_KEYWORDS {
            break;
        }
        if word.chars().count() > 3
            && !STOP_WORDS.contains(&word)
            && !found.iter().any(|k| k == word)
        {
            found.push(word.to_owned());
        }
    }

    found.truncate(MAX_KEYWORDS);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_medical_terms_come_first_in_declaration_order() {
        let keywords = extract_keywords("Bad cough, then a FEVER and chest pain");
        assert_eq!(
            keywords,
            vec!["fever", "pain", "cough", "chest pain", "then", "chest"]
        );
    }

    #[test]
    fn test_short_words_and_stop_words_are_dropped() {
        let keywords = extract_keywords("I have been feeling odd for days");
        assert_eq!(keywords, vec!["feeling", "days"]);
    }

    #[test]
    fn test_no_duplicates() {
        let keywords = extract_keywords("nausea nausea nausea everywhere everywhere");
        assert_eq!(keywords, vec!["nausea", "everywhere"]);
    }

    #[test]
    fn test_output_is_capped_at_twenty() {
        let text = (0..40)
            .map(|i| format!("word{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = extract_keywords(&text);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "word00");
        assert_eq!(keywords[19], "word19");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Sore throat, muscle aches and a mild temperature since yesterday";
        let first = extract_keywords(text);
        assert_eq!(first, extract_keywords(text));
        assert!(first.len() <= MAX_KEYWORDS);
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        assert!(extract_keywords("   ").is_empty());
        assert!(extract_keywords("a an the").is_empty());
    }
}
