use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_prompt_type() -> String {
    "zero".into()
}

/// Body of `POST /api/analyze`.
///
/// `symptoms` defaults to empty so a missing field is reported as a validation failure rather
/// than a JSON rejection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeReq {
    #[serde(default)]
    #[schema(example = "I have a headache and feel nauseous")]
    pub symptoms: String,
    /// One of `zero`, `few`, `chain`, `role`.
    #[serde(default = "default_prompt_type")]
    #[schema(example = "zero")]
    pub prompt_type: String,
    #[serde(default)]
    pub include_lifestyle: bool,
}

impl Default for AnalyzeReq {
    fn default() -> Self {
        Self {
            symptoms: String::new(),
            prompt_type: default_prompt_type(),
            include_lifestyle: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    /// `false` when the server started without a usable model configuration.
    pub configured: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    /// Rule-based urgency signal, present when the analysis got as far as computing it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_based_urgent: Option<bool>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            rule_based_urgent: None,
        }
    }
}
