//! External model gateway.
//!
//! Sends the built prompt to a [`TextGenerator`], pulls the JSON object out of the free-text
//! reply and applies the retry policy:
//!
//! - malformed output is retried after a short fixed delay and, once attempts run out, replaced
//!   by a canned fallback reply (never an error);
//! - call failures (transport, timeout, HTTP status, empty reply) are retried with exponential
//!   backoff and, once attempts run out, surface as [`GatewayError`].

use crate::models::MedicalFact;
use crate::prompt::{build_prompt, PromptVariant};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Sampling parameters sent with every generation request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

/// Low temperature keeps medical answers consistent between calls.
pub const GENERATION_PARAMS: GenerationParams = GenerationParams {
    temperature: 0.3,
    top_p: 0.8,
    top_k: 40,
    max_output_tokens: 2048,
};

/// A failed call to the model backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelCallError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("model API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode model API response: {0}")]
    Decode(String),
    #[error("model reply was blocked: {0}")]
    Blocked(String),
    #[error("model reply contained no text")]
    EmptyReply,
}

/// The model could not be reached, or kept failing, for every attempt.
#[derive(Debug, thiserror::Error)]
#[error("Failed to get response from model API after {attempts} attempts: {last_error}")]
pub struct GatewayError {
    pub attempts: u32,
    #[source]
    pub last_error: ModelCallError,
}

/// Backend that turns a prompt into free text.
///
/// Implemented by [`crate::gemini::GeminiClient`]; tests substitute scripted doubles.
pub trait TextGenerator: Send + Sync {
    /// Short tag recorded as the result's `source`.
    fn name(&self) -> &str;

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelCallError>;
}

/// Attempt count and delays between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay after a reply that did not contain valid JSON.
    pub malformed_delay: Duration,
    /// Backoff after a failed call is `backoff_unit * 2^attempt`, attempt counted from 0.
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            malformed_delay: Duration::from_secs(1),
            backoff_unit: Duration::from_secs(1),
        }
    }

    /// Same attempt count, no waiting between attempts.
    pub fn without_delays(max_retries: u32) -> Self {
        Self {
            max_retries,
            malformed_delay: Duration::ZERO,
            backoff_unit: Duration::ZERO,
        }
    }

    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MAX_RETRIES)
    }
}

/// The model's structured reply: the JSON object found in its text.
///
/// Field accessors are lenient: missing or ill-typed fields read as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelReply(Map<String, Value>);

impl ModelReply {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parses the JSON object embedded in free model text.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Map<String, Value>>(extract_json(text)).map(Self)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn conditions(&self) -> &[Value] {
        self.0
            .get("conditions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_urgent(&self) -> bool {
        self.0
            .get("is_urgent")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn urgency_level(&self) -> Option<&str> {
        self.0.get("urgency_level").and_then(Value::as_str)
    }

    pub fn next_steps(&self) -> Vec<String> {
        self.0
            .get("next_steps")
            .map(string_list)
            .unwrap_or_default()
    }

    /// `None` when the field is missing or not a list.
    pub fn lifestyle_suggestions(&self) -> Option<Vec<String>> {
        self.0
            .get("lifestyle_suggestions")
            .filter(|v| v.is_array())
            .map(string_list)
    }
}

/// Collects the string items of a JSON array, skipping anything else.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Slices the outermost `{...}` out of `text`, or returns the trimmed text if there is none.
pub fn extract_json(text: &str) -> &str {
    let text = text.trim();
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Canned reply used when the model never produced parseable JSON.
pub fn fallback_reply() -> ModelReply {
    let mut map = Map::new();
    map.insert(
        "conditions".into(),
        json!([{
            "name": "Unable to analyze",
            "confidence": "Low",
            "reasoning": "Unable to process symptoms at this time. Please consult a healthcare provider.",
            "recommendation": "Please consult with a healthcare professional for proper evaluation.",
            "urgency": "Moderate",
            "related_symptoms": []
        }]),
    );
    map.insert("is_urgent".into(), Value::Bool(false));
    map.insert("urgency_level".into(), Value::from("Moderate"));
    map.insert(
        "next_steps".into(),
        json!([
            "Consult a healthcare provider",
            "Monitor symptoms",
            "Seek emergency care if symptoms worsen"
        ]),
    );
    map.insert("lifestyle_suggestions".into(), json!([]));
    ModelReply(map)
}

/// What the gateway hands to the assembler.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayReply {
    pub reply: ModelReply,
    /// Number of calls made, including the successful one.
    pub attempts: u32,
    /// `true` when `reply` is the canned [`fallback_reply`].
    pub fallback: bool,
}

#[derive(Clone)]
pub struct ModelGateway {
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl ModelGateway {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        tracing::info!(
            "Model gateway initialised for {} (max_retries={})",
            generator.name(),
            policy.max_retries
        );
        Self { generator, policy }
    }

    pub fn source_name(&self) -> &str {
        self.generator.name()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Asks the model to analyse `symptoms` in the light of `facts`.
    ///
    /// # Returns
    /// The parsed reply, or the canned fallback reply if no attempt produced valid JSON.
    ///
    /// # Errors
    /// Returns [`GatewayError`] with the last call failure if the final attempt could not reach
    /// the model.
    pub fn analyze(
        &self,
        symptoms: &str,
        facts: &[MedicalFact],
        variant: PromptVariant,
        include_lifestyle: bool,
    ) -> Result<GatewayReply, GatewayError> {
        let prompt = build_prompt(symptoms, facts, variant, include_lifestyle);
        let max_attempts = self.policy.max_retries.max(1);
        let mut attempt = 0u32;

        loop {
            let is_last = attempt + 1 >= max_attempts;
            tracing::debug!("Model call attempt {}/{}", attempt + 1, max_attempts);

            match self.generator.generate(&prompt, &GENERATION_PARAMS) {
                Ok(text) => match ModelReply::parse(&text) {
                    Ok(reply) => {
                        tracing::info!("Received structured reply from {}", self.generator.name());
                        return Ok(GatewayReply {
                            reply,
                            attempts: attempt + 1,
                            fallback: false,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed to parse JSON reply (attempt {}): {}",
                            attempt + 1,
                            e
                        );
                        if is_last {
                            tracing::error!(
                                "All attempts failed to parse JSON, using fallback reply"
                            );
                            return Ok(GatewayReply {
                                reply: fallback_reply(),
                                attempts: attempt + 1,
                                fallback: true,
                            });
                        }
                        pause(self.policy.malformed_delay);
                    }
                },
                Err(e) => {
                    tracing::error!("Model API error (attempt {}): {}", attempt + 1, e);
                    if is_last {
                        return Err(GatewayError {
                            attempts: attempt + 1,
                            last_error: e,
                        });
                    }
                    pause(self.policy.backoff_delay(attempt));
                }
            }

            attempt += 1;
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted outcomes; once the script runs out the last outcome repeats.
    pub(crate) struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, ModelCallError>>>,
        last: Mutex<Option<Result<String, ModelCallError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(script: Vec<Result<String, ModelCallError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn replying(text: &str) -> Arc<Self> {
            Self::new(vec![Ok(text.to_owned())])
        }

        pub(crate) fn failing(err: ModelCallError) -> Arc<Self> {
            Self::new(vec![Err(err)])
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, ModelCallError> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            let next = self.script.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            match next {
                Some(outcome) => {
                    *last = Some(outcome.clone());
                    outcome
                }
                None => last.clone().unwrap_or(Err(ModelCallError::EmptyReply)),
            }
        }
    }
}
