//! # Triage Core
//!
//! Core logic for the symptom triage assistant.
//!
//! A single analysis validates the symptom text, runs the rule-based urgency gate, retrieves
//! relevant facts from the built-in knowledge base, asks the external model for a structured
//! reply and assembles a [`DiagnosisResult`]:
//!
//! - [`facts`], [`keywords`] and [`retrieval`] select a bounded set of cited facts
//! - [`prompt`] renders the instruction text sent to the model
//! - [`gateway`] and [`gemini`] talk to the model with retries and a graceful fallback
//! - [`urgency`] and [`assembler`] decide flagging and build the result
//! - [`analyzer`] ties the steps together behind [`DiagnosisAnalyzer`]
//!
//! **No API concerns**: HTTP servers, CLI parsing and output formatting belong in `api-rest`,
//! `api-shared` and `cli`.

pub mod analyzer;
pub mod assembler;
pub mod config;
pub mod constants;
pub mod error;
pub mod facts;
pub mod gateway;
pub mod gemini;
pub mod keywords;
pub mod models;
pub mod prompt;
pub mod retrieval;
pub mod urgency;
pub mod validation;

pub use analyzer::DiagnosisAnalyzer;
pub use config::{TriageConfig, WebSettings};
pub use error::{TriageError, TriageResult};
pub use gateway::{GenerationParams, ModelCallError, RetryPolicy, TextGenerator};
pub use models::{
    ConditionReport, ConfidenceLevel, DiagnosisReport, DiagnosisResult, MedicalFact, UrgencyLevel,
};
pub use prompt::PromptVariant;
