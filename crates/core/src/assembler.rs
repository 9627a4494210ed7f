//! Response assembly.
//!
//! Turns the model's structured reply and the rule-based urgency signal into a
//! [`DiagnosisResult`], and builds the "Analysis Unavailable" result used when the model could
//! not be reached at all.

use crate::constants::MEDICAL_DISCLAIMER;
use crate::gateway::{string_list, ModelReply};
use crate::models::{Condition, ConfidenceLevel, DiagnosisResult, UrgencyLevel};
use serde_json::{Map, Value};

fn text_field(entry: &Value, key: &str, default: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_owned()
}

fn condition_from_entry(entry: &Value) -> Condition {
    Condition {
        name: text_field(entry, "name", "Unknown Condition"),
        confidence: ConfidenceLevel::parse_or_default(
            entry.get("confidence").and_then(Value::as_str),
        ),
        reasoning: text_field(entry, "reasoning", "No reasoning provided"),
        recommendation: text_field(entry, "recommendation", "Consult a healthcare provider"),
        urgency: UrgencyLevel::parse_or_default(entry.get("urgency").and_then(Value::as_str)),
        related_symptoms: entry
            .get("related_symptoms")
            .map(string_list)
            .unwrap_or_default(),
    }
}

/// Builds the result for a reply the gateway delivered.
///
/// `flagged` starts from the reply's `is_urgent`. If that is false, the first condition with
/// `Critical` or `Urgent` urgency flags the result and sets its level. A rule-based match then
/// flags any result still unflagged, upgrading `Moderate` to `Urgent`; other levels are kept.
pub fn assemble(reply: &ModelReply, rule_based_urgent: bool, facts_count: usize) -> DiagnosisResult {
    let conditions: Vec<Condition> = reply.conditions().iter().map(condition_from_entry).collect();

    let mut flagged = reply.is_urgent();
    let mut urgency_level = UrgencyLevel::parse_or_default(reply.urgency_level());

    if !flagged {
        if let Some(first) = conditions.iter().find(|c| c.urgency.needs_attention()) {
            flagged = true;
            urgency_level = first.urgency;
        }
    }

    if rule_based_urgent && !flagged {
        flagged = true;
        if urgency_level == UrgencyLevel::Moderate {
            urgency_level = UrgencyLevel::Urgent;
        }
    }

    let mut metadata = Map::new();
    metadata.insert("conditions_count".into(), Value::from(conditions.len()));
    metadata.insert("rule_based_urgent".into(), Value::Bool(rule_based_urgent));
    metadata.insert("medical_facts_count".into(), Value::from(facts_count));

    tracing::info!(
        "Analysis complete: {} conditions, urgent={}",
        conditions.len(),
        flagged
    );

    DiagnosisResult {
        conditions,
        flagged,
        urgency_level,
        disclaimer: MEDICAL_DISCLAIMER.to_owned(),
        lifestyle_suggestions: reply.lifestyle_suggestions(),
        next_steps: reply.next_steps(),
        metadata,
    }
}

/// Safety-net result for a hard gateway failure.
///
/// Flagging comes from the rule-based gate alone; `error` is recorded in the metadata.
pub fn analysis_unavailable(rule_based_urgent: bool, error: &str) -> DiagnosisResult {
    let mut metadata = Map::new();
    metadata.insert("error".into(), Value::from(error));
    metadata.insert("rule_based_urgent".into(), Value::Bool(rule_based_urgent));

    DiagnosisResult {
        conditions: vec![Condition {
            name: "Analysis Unavailable".into(),
            confidence: ConfidenceLevel::Low,
            reasoning:
                "Unable to analyze symptoms at this time. Please consult a healthcare provider."
                    .into(),
            recommendation:
                "Please consult with a healthcare professional for proper evaluation.".into(),
            urgency: UrgencyLevel::Moderate,
            related_symptoms: Vec::new(),
        }],
        flagged: rule_based_urgent,
        urgency_level: if rule_based_urgent {
            UrgencyLevel::Urgent
        } else {
            UrgencyLevel::Moderate
        },
        disclaimer: MEDICAL_DISCLAIMER.to_owned(),
        lifestyle_suggestions: None,
        next_steps: vec![
            "Consult a healthcare provider".into(),
            "Monitor symptoms".into(),
        ],
        metadata,
    }
}
