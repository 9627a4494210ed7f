//! Data model for symptom analysis.
//!
//! Internal records ([`MedicalFact`], [`Condition`], [`DiagnosisResult`]) and the external
//! representation ([`DiagnosisReport`]) that CLI and HTTP collaborators render.
//!
//! Confidence and urgency values are closed enumerations with canonical, case-sensitive
//! spellings. Values coming from model output go through [`ConfidenceLevel::parse_or_default`]
//! and [`UrgencyLevel::parse_or_default`], which never fail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a canonical enumeration spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {kind} value: {value:?}")]
pub struct UnknownLevel {
    kind: &'static str,
    value: String,
}

/// How sure the model is about a candidate condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }

    /// Parses model output, falling back to `Low` for missing or unrecognised values.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(ConfidenceLevel::Low)
    }
}

impl FromStr for ConfidenceLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(ConfidenceLevel::High),
            "Medium" => Ok(ConfidenceLevel::Medium),
            "Low" => Ok(ConfidenceLevel::Low),
            other => Err(UnknownLevel {
                kind: "confidence",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly a condition, or the analysis as a whole, needs medical attention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum UrgencyLevel {
    Critical,
    Urgent,
    Moderate,
    Low,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Critical => "Critical",
            UrgencyLevel::Urgent => "Urgent",
            UrgencyLevel::Moderate => "Moderate",
            UrgencyLevel::Low => "Low",
        }
    }

    /// Parses model output, falling back to `Moderate` for missing or unrecognised values.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(UrgencyLevel::Moderate)
    }

    /// `Critical` and `Urgent` both require prompt attention.
    pub fn needs_attention(&self) -> bool {
        matches!(self, UrgencyLevel::Critical | UrgencyLevel::Urgent)
    }
}

impl FromStr for UrgencyLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Critical" => Ok(UrgencyLevel::Critical),
            "Urgent" => Ok(UrgencyLevel::Urgent),
            "Moderate" => Ok(UrgencyLevel::Moderate),
            "Low" => Ok(UrgencyLevel::Low),
            other => Err(UnknownLevel {
                kind: "urgency",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A knowledge-base record with its citation.
///
/// `keywords` are only used for matching and are expected to be lowercase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedicalFact {
    pub id: String,
    pub fact: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub source: Option<String>,
    /// Multiplicative weight in (0, 1].
    pub reliability_score: f64,
}

/// A candidate condition suggested by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
    pub confidence: ConfidenceLevel,
    pub reasoning: String,
    pub recommendation: String,
    pub urgency: UrgencyLevel,
    pub related_symptoms: Vec<String>,
}

/// The assembled outcome of one analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisResult {
    pub conditions: Vec<Condition>,
    /// Needs urgent attention.
    pub flagged: bool,
    pub urgency_level: UrgencyLevel,
    pub disclaimer: String,
    /// `None` when the model did not provide the field at all.
    pub lifestyle_suggestions: Option<Vec<String>>,
    pub next_steps: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl DiagnosisResult {
    /// Converts the result into its external representation.
    pub fn to_report(&self) -> DiagnosisReport {
        DiagnosisReport {
            possible_conditions: self.conditions.iter().map(ConditionReport::from).collect(),
            flagged: self.flagged,
            urgency_level: self.urgency_level,
            lifestyle_suggestions: self.lifestyle_suggestions.clone().unwrap_or_default(),
            next_steps: self.next_steps.clone(),
            disclaimer: self.disclaimer.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// External representation of a [`Condition`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConditionReport {
    pub condition: String,
    pub confidence: ConfidenceLevel,
    pub reasoning: String,
    pub recommendation: String,
    pub urgency: UrgencyLevel,
    pub related_symptoms: Vec<String>,
}

impl From<&Condition> for ConditionReport {
    fn from(c: &Condition) -> Self {
        ConditionReport {
            condition: c.name.clone(),
            confidence: c.confidence,
            reasoning: c.reasoning.clone(),
            recommendation: c.recommendation.clone(),
            urgency: c.urgency,
            related_symptoms: c.related_symptoms.clone(),
        }
    }
}

impl From<ConditionReport> for Condition {
    fn from(r: ConditionReport) -> Self {
        Condition {
            name: r.condition,
            confidence: r.confidence,
            reasoning: r.reasoning,
            recommendation: r.recommendation,
            urgency: r.urgency,
            related_symptoms: r.related_symptoms,
        }
    }
}

/// External representation of a [`DiagnosisResult`], as rendered by the CLI and served over
/// HTTP.
///
/// `lifestyle_suggestions` is always an array here; absence is not representable externally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DiagnosisReport {
    pub possible_conditions: Vec<ConditionReport>,
    pub flagged: bool,
    pub urgency_level: UrgencyLevel,
    pub lifestyle_suggestions: Vec<String>,
    pub next_steps: Vec<String>,
    pub disclaimer: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Map<String, Value>,
}

impl From<DiagnosisReport> for DiagnosisResult {
    fn from(report: DiagnosisReport) -> Self {
        DiagnosisResult {
            conditions: report
                .possible_conditions
                .into_iter()
                .map(Condition::from)
                .collect(),
            flagged: report.flagged,
            urgency_level: report.urgency_level,
            disclaimer: report.disclaimer,
            lifestyle_suggestions: Some(report.lifestyle_suggestions),
            next_steps: report.next_steps,
            metadata: report.metadata,
        }
    }
}
