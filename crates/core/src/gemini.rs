//! Google Gemini `generateContent` backend.
//!
//! A blocking HTTP client: one analysis is one blocking call chain, and the REST server moves
//! it onto tokio's blocking pool. The request timeout covers the whole call; a timeout is
//! reported as [`ModelCallError::Timeout`] and retried like any other call failure.

use crate::error::{TriageError, TriageResult};
use crate::gateway::{GenerationParams, ModelCallError, TextGenerator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationParams> for GenerationConfig {
    fn from(p: &GenerationParams) -> Self {
        Self {
            temperature: p.temperature,
            top_p: p.top_p,
            top_k: p.top_k,
            max_output_tokens: p.max_output_tokens,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, ModelCallError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelCallError::Blocked(reason));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ModelCallError::EmptyReply);
        }
        Ok(text)
    }
}

/// Client for the Gemini REST API.
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client for `model` under `base_url`.
    ///
    /// # Errors
    /// Returns [`TriageError::Configuration`] if the base URL is not an http(s) URL, the API key
    /// is blank, or the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> TriageResult<Self> {
        if api_key.trim().is_empty() {
            return Err(TriageError::Configuration(
                "Gemini API key cannot be empty".into(),
            ));
        }

        let base = base_url.trim_end_matches('/');
        let parsed = reqwest::Url::parse(base).map_err(|e| {
            TriageError::Configuration(format!("invalid Gemini base URL '{base}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TriageError::Configuration(format!(
                "Gemini base URL must use http or https, got: {}",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                TriageError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        tracing::info!("Gemini client initialised for model {}", model);

        Ok(Self {
            http,
            endpoint: format!("{base}/models/{model}:generateContent"),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify(err: reqwest::Error) -> ModelCallError {
    if err.is_timeout() {
        ModelCallError::Timeout(err.to_string())
    } else {
        ModelCallError::Transport(err.to_string())
    }
}

impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelCallError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: params.into(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelCallError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .map_err(|e| {
                if e.is_timeout() {
                    ModelCallError::Timeout(e.to_string())
                } else {
                    ModelCallError::Decode(e.to_string())
                }
            })?
            .into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GENERATION_PARAMS;

    #[test]
    fn test_request_body_uses_gemini_field_names() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: (&GENERATION_PARAMS).into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!((value["generationConfig"]["topP"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "{\"is_urgent\": "}, {"text": "false}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"is_urgent\": false}");
    }

    #[test]
    fn test_blocked_and_empty_responses_are_call_errors() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(
            blocked.into_text(),
            Err(ModelCallError::Blocked("SAFETY".into()))
        );

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(empty.into_text(), Err(ModelCallError::EmptyReply));
    }

    #[test]
    fn test_client_validates_configuration() {
        let timeout = Duration::from_secs(5);
        assert!(GeminiClient::new("", "https://example.test", "gemini-pro", timeout).is_err());
        assert!(GeminiClient::new("key", "ftp://example.test", "gemini-pro", timeout).is_err());
        assert!(GeminiClient::new("key", "not a url", "gemini-pro", timeout).is_err());

        let client =
            GeminiClient::new("key", "https://example.test/v1beta/", "gemini-pro", timeout)
                .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(client.name(), "gemini");
    }

    #[test]
    fn test_unreachable_server_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = GeminiClient::new(
            "key",
            "http://127.0.0.1:9",
            "gemini-pro",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.generate("hello", &GENERATION_PARAMS).unwrap_err();
        assert!(matches!(
            err,
            ModelCallError::Transport(_) | ModelCallError::Timeout(_)
        ));
    }

    /// Serves one canned HTTP response on a local port and hands back the raw request.
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/v1beta", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base, handle)
    }

    #[test]
    fn test_non_success_status_carries_response_body() {
        let (base, server) = serve_once(
            "401 Unauthorized",
            r#"{"error": {"message": "API key not valid"}}"#,
        );
        let client = GeminiClient::new("bad-key", &base, "gemini-pro", Duration::from_secs(5))
            .unwrap();
        let err = client.generate("hello", &GENERATION_PARAMS).unwrap_err();
        match err {
            ModelCallError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("API key not valid"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-pro:generateContent "));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: bad-key"));
    }

    #[test]
    fn test_success_response_is_decoded_to_text() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "{\"is_urgent\": false}"}]}}]}"#,
        );
        let client =
            GeminiClient::new("key", &base, "gemini-pro", Duration::from_secs(5)).unwrap();
        let text = client.generate("fever and cough", &GENERATION_PARAMS).unwrap();
        assert_eq!(text, "{\"is_urgent\": false}");

        let request = server.join().unwrap();
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "fever and cough");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
    }
}
