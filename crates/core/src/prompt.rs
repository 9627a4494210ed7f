//! Prompt construction for the triage model.
//!
//! Every prompt carries the same preamble, the verbatim symptom text, the retrieved facts and
//! the JSON schema the reply must follow. [`PromptVariant`] selects small additions on top.

use crate::models::MedicalFact;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prompting strategy requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// Plain instructions.
    #[default]
    Zero,
    /// Instructions plus one worked example.
    Few,
    /// Accepted for compatibility; currently renders exactly like `Zero`.
    Chain,
    /// Instructions framed as an experienced triage nurse.
    Role,
}

impl PromptVariant {
    pub const ALL: [PromptVariant; 4] = [
        PromptVariant::Zero,
        PromptVariant::Few,
        PromptVariant::Chain,
        PromptVariant::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::Zero => "zero",
            PromptVariant::Few => "few",
            PromptVariant::Chain => "chain",
            PromptVariant::Role => "role",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown prompt type {0:?} (expected one of: zero, few, chain, role)")]
pub struct UnknownPromptVariant(String);

impl FromStr for PromptVariant {
    type Err = UnknownPromptVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptVariant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownPromptVariant(s.to_owned()))
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ROLE_PREFIX: &str =
    "You are an experienced medical triage nurse with 20 years of experience. ";

const PREAMBLE: &str = "You are a medical triage assistant. Your role is to help users understand their symptoms and provide informed guidance. You are NOT a replacement for professional medical care.

IMPORTANT DISCLAIMERS:
- This is for informational purposes only
- Always recommend consulting healthcare professionals for proper diagnosis
- Never provide definitive diagnoses
- Flag urgent symptoms that require immediate medical attention
";

const SCHEMA_AND_GUIDELINES: &str = r#"Based on the symptoms and medical information above, provide a structured analysis in JSON format with the following structure:
{
    "conditions": [
        {
            "name": "Condition name",
            "confidence": "High/Medium/Low",
            "reasoning": "Brief explanation of why this condition is possible",
            "recommendation": "Recommended actions or next steps",
            "urgency": "Critical/Urgent/Moderate/Low",
            "related_symptoms": ["symptom1", "symptom2"]
        }
    ],
    "is_urgent": true/false,
    "urgency_level": "Critical/Urgent/Moderate/Low",
    "next_steps": ["step1", "step2", "step3"],
    "lifestyle_suggestions": ["suggestion1", "suggestion2"] (only if relevant)
}

Guidelines:
1. Provide 1-3 most likely conditions (not more)
2. Use confidence levels appropriately (High only for very clear cases)
3. Always include reasoning for each condition
4. Set is_urgent=true for symptoms requiring immediate care (chest pain, severe difficulty breathing, loss of consciousness, etc.)
5. Provide actionable next steps
6. Be conservative - when in doubt, recommend professional consultation
7. Output ONLY valid JSON, no additional text
"#;

const FEW_SHOT_EXAMPLE: &str = r#"{
  "conditions": [
    {
      "name": "Common Cold",
      "confidence": "Medium",
      "reasoning": "Symptoms match common viral infection patterns",
      "recommendation": "Rest, hydration, over-the-counter symptom relief",
      "urgency": "Low",
      "related_symptoms": [
        "cough",
        "sore throat"
      ]
    }
  ],
  "is_urgent": false,
  "urgency_level": "Low",
  "next_steps": [
    "Rest",
    "Stay hydrated",
    "Monitor symptoms"
  ]
}"#;

const LIFESTYLE_INSTRUCTION: &str =
    "Also provide general lifestyle and wellness suggestions that may help with symptom management.";

/// Renders the full prompt sent to the model.
pub fn build_prompt(
    symptoms: &str,
    facts: &[MedicalFact],
    variant: PromptVariant,
    include_lifestyle: bool,
) -> String {
    let facts_text = facts
        .iter()
        .map(|f| format!("- {}", f.fact))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = String::new();
    if variant == PromptVariant::Role {
        prompt.push_str(ROLE_PREFIX);
    }
    prompt.push_str(PREAMBLE);
    prompt.push_str(&format!(
        "\nUser Symptoms: {symptoms}\n\nRelevant Medical Information:\n{facts_text}\n\n"
    ));
    prompt.push_str(SCHEMA_AND_GUIDELINES);

    if variant == PromptVariant::Few {
        prompt.push_str("\n\nExample analysis:\n");
        prompt.push_str(FEW_SHOT_EXAMPLE);
    }

    if include_lifestyle {
        prompt.push_str("\n\n");
        prompt.push_str(LIFESTYLE_INSTRUCTION);
    }

    prompt
}

/// Renders facts as a numbered list with citations, for display to the user.
pub fn format_facts_for_listing(facts: &[MedicalFact]) -> String {
    if facts.is_empty() {
        return "No specific medical facts available.".to_owned();
    }

    let mut out = String::from("Medical Facts:\n");
    for (i, fact) in facts.iter().enumerate() {
        out.push_str(&format!("{}. {}", i + 1, fact.fact));
        if let Some(source) = &fact.source {
            out.push_str(&format!(" (Source: {source})"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> Vec<MedicalFact> {
        vec![
            MedicalFact {
                id: "a".into(),
                fact: "Fever is a sign of infection.".into(),
                category: "Fever".into(),
                keywords: vec!["fever".into()],
                source: Some("Mayo Clinic".into()),
                reliability_score: 0.95,
            },
            MedicalFact {
                id: "b".into(),
                fact: "Coughs usually pass.".into(),
                category: "Respiratory".into(),
                keywords: vec!["cough".into()],
                source: None,
                reliability_score: 0.9,
            },
        ]
    }

    #[test]
    fn test_plain_prompt_embeds_symptoms_facts_and_schema() {
        let prompt = build_prompt("fever and cough", &facts(), PromptVariant::Zero, false);
        assert!(prompt.starts_with("You are a medical triage assistant."));
        assert!(prompt.contains("User Symptoms: fever and cough\n"));
        assert!(prompt.contains(
            "Relevant Medical Information:\n- Fever is a sign of infection.\n- Coughs usually pass.\n"
        ));
        assert!(prompt.contains("\"related_symptoms\": [\"symptom1\", \"symptom2\"]"));
        assert!(prompt.contains("7. Output ONLY valid JSON, no additional text"));
        assert!(!prompt.contains("Example analysis"));
        assert!(!prompt.contains(LIFESTYLE_INSTRUCTION));
    }

    #[test]
    fn test_role_variant_prepends_framing() {
        let prompt = build_prompt("fever", &facts(), PromptVariant::Role, false);
        assert!(prompt.starts_with(
            "You are an experienced medical triage nurse with 20 years of experience. You are a medical triage assistant."
        ));
    }

    #[test]
    fn test_few_variant_appends_parseable_example() {
        let prompt = build_prompt("fever", &facts(), PromptVariant::Few, false);
        let (_, example) = prompt.split_once("Example analysis:\n").unwrap();
        let value: serde_json::Value = serde_json::from_str(example).unwrap();
        assert_eq!(value["conditions"][0]["name"], "Common Cold");
        assert_eq!(value["is_urgent"], false);
    }

    #[test]
    fn test_lifestyle_instruction_comes_last() {
        let prompt = build_prompt("fever", &facts(), PromptVariant::Few, true);
        assert!(prompt.ends_with(LIFESTYLE_INSTRUCTION));
    }

    #[test]
    fn test_chain_variant_renders_like_plain() {
        let plain = build_prompt("fever", &facts(), PromptVariant::Zero, true);
        let chain = build_prompt("fever", &facts(), PromptVariant::Chain, true);
        assert_eq!(plain, chain);
        assert_ne!(PromptVariant::Zero, PromptVariant::Chain);
    }

    #[test]
    fn test_variant_parsing() {
        for variant in PromptVariant::ALL {
            assert_eq!(variant.as_str().parse::<PromptVariant>(), Ok(variant));
        }
        assert!("ZERO".parse::<PromptVariant>().is_err());
        assert!("cot".parse::<PromptVariant>().is_err());
        assert_eq!(PromptVariant::default(), PromptVariant::Zero);
    }

    #[test]
    fn test_facts_listing_numbers_and_cites() {
        assert_eq!(
            format_facts_for_listing(&facts()),
            "Medical Facts:\n1. Fever is a sign of infection. (Source: Mayo Clinic)\n2. Coughs usually pass.\n"
        );
        assert_eq!(
            format_facts_for_listing(&[]),
            "No specific medical facts available."
        );
    }
}
