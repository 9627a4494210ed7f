use crate::gateway::GatewayError;
use crate::retrieval::RetrievalError;

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("{source}")]
    Retrieval {
        #[source]
        source: RetrievalError,
        /// Outcome of the rule-based urgency gate, computed before retrieval ran.
        rule_based_urgent: bool,
    },
    #[error("{source}")]
    Gateway {
        #[source]
        source: GatewayError,
        rule_based_urgent: bool,
    },
}

impl TriageError {
    /// Rule-based urgency signal carried by the error, if the analysis got far enough to
    /// compute one.
    pub fn rule_based_urgent(&self) -> Option<bool> {
        match self {
            TriageError::Retrieval {
                rule_based_urgent, ..
            }
            | TriageError::Gateway {
                rule_based_urgent, ..
            } => Some(*rule_based_urgent),
            _ => None,
        }
    }
}

impl From<triage_types::SymptomTextError> for TriageError {
    fn from(err: triage_types::SymptomTextError) -> Self {
        TriageError::Validation(err.to_string())
    }
}

impl From<crate::prompt::UnknownPromptVariant> for TriageError {
    fn from(err: crate::prompt::UnknownPromptVariant) -> Self {
        TriageError::Validation(err.to_string())
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
