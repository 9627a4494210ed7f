//! The analysis entry point shared by the CLI and the REST server.
//!
//! One call runs validation, the rule-based urgency gate, fact retrieval, the model gateway
//! and response assembly, in that order, as a single blocking call chain.

use crate::assembler::{analysis_unavailable, assemble};
use crate::config::TriageConfig;
use crate::facts::FactStore;
use crate::gateway::{ModelGateway, TextGenerator};
use crate::gemini::GeminiClient;
use crate::models::DiagnosisResult;
use crate::prompt::PromptVariant;
use crate::retrieval::Retriever;
use crate::urgency;
use crate::validation::validate_symptoms;
use crate::{TriageError, TriageResult};
use serde_json::Value;
use std::sync::Arc;
use triage_types::SymptomText;

#[derive(Clone)]
pub struct DiagnosisAnalyzer {
    gateway: ModelGateway,
    retriever: Retriever,
}

impl DiagnosisAnalyzer {
    pub fn new(gateway: ModelGateway, retriever: Retriever) -> Self {
        tracing::info!("DiagnosisAnalyzer initialised");
        Self { gateway, retriever }
    }

    /// Wires the Gemini backend and the built-in fact table from `config`.
    ///
    /// # Errors
    /// Returns [`TriageError::Configuration`] if the Gemini client cannot be created.
    pub fn from_config(config: &TriageConfig) -> TriageResult<Self> {
        let client = GeminiClient::new(
            config.api_key(),
            config.base_url(),
            config.model(),
            config.timeout(),
        )?;
        let generator: Arc<dyn TextGenerator> = Arc::new(client);
        Ok(Self::new(
            ModelGateway::new(generator, config.retry_policy()),
            Retriever::new(FactStore::builtin(), config.rag_top_k()),
        ))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Analyses `symptoms`, substituting an "Analysis Unavailable" result when the model could
    /// not be reached.
    ///
    /// # Errors
    /// Returns [`TriageError::Validation`] for unusable input and [`TriageError::Retrieval`] if
    /// fact retrieval fails. Gateway failures never surface here.
    pub fn analyze(
        &self,
        symptoms: &str,
        variant: PromptVariant,
        include_lifestyle: bool,
    ) -> TriageResult<DiagnosisResult> {
        let (symptoms, urgent_phrase) = gate(symptoms)?;
        match self.run(&symptoms, urgent_phrase, variant, include_lifestyle) {
            Err(TriageError::Gateway {
                source,
                rule_based_urgent,
            }) => {
                tracing::error!("Model analysis failed: {}", source);
                let mut result = analysis_unavailable(rule_based_urgent, &source.to_string());
                self.stamp(&mut result, variant, source.attempts, urgent_phrase);
                Ok(result)
            }
            other => other,
        }
    }

    /// Like [`analyze`](Self::analyze), but reports gateway failures as
    /// [`TriageError::Gateway`] instead of substituting a result.
    pub fn try_analyze(
        &self,
        symptoms: &str,
        variant: PromptVariant,
        include_lifestyle: bool,
    ) -> TriageResult<DiagnosisResult> {
        let (symptoms, urgent_phrase) = gate(symptoms)?;
        self.run(&symptoms, urgent_phrase, variant, include_lifestyle)
    }

    fn run(
        &self,
        symptoms: &SymptomText,
        urgent_phrase: Option<&'static str>,
        variant: PromptVariant,
        include_lifestyle: bool,
    ) -> TriageResult<DiagnosisResult> {
        let rule_based_urgent = urgent_phrase.is_some();

        let facts = self
            .retriever
            .retrieve(symptoms.as_str())
            .map_err(|source| TriageError::Retrieval {
                source,
                rule_based_urgent,
            })?;
        tracing::info!("Retrieved {} medical facts", facts.len());

        let reply = self
            .gateway
            .analyze(symptoms.as_str(), &facts, variant, include_lifestyle)
            .map_err(|source| TriageError::Gateway {
                source,
                rule_based_urgent,
            })?;

        let mut result = assemble(&reply.reply, rule_based_urgent, facts.len());
        self.stamp(&mut result, variant, reply.attempts, urgent_phrase);
        result
            .metadata
            .insert("fallback_reply".into(), Value::Bool(reply.fallback));

        Ok(result)
    }

    fn stamp(
        &self,
        result: &mut DiagnosisResult,
        variant: PromptVariant,
        attempts: u32,
        urgent_phrase: Option<&'static str>,
    ) {
        let metadata = &mut result.metadata;
        metadata.insert("source".into(), Value::from(self.gateway.source_name()));
        metadata.insert("prompt_variant".into(), Value::from(variant.as_str()));
        metadata.insert(
            "analysed_at".into(),
            Value::from(chrono::Utc::now().to_rfc3339()),
        );
        metadata.insert("gateway_attempts".into(), Value::from(attempts));
        if let Some(phrase) = urgent_phrase {
            metadata.insert("urgent_phrase".into(), Value::from(phrase));
        }
    }
}

/// Validates the input and runs the rule-based urgency scan.
fn gate(symptoms: &str) -> TriageResult<(SymptomText, Option<&'static str>)> {
    let symptoms = validate_symptoms(symptoms)?;
    let urgent_phrase = urgency::matched_phrase(symptoms.as_str());
    tracing::info!("Rule-based urgent check: {}", urgent_phrase.is_some());
    Ok((symptoms, urgent_phrase))
}
