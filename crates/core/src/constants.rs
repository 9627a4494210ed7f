//! Constants used throughout the triage core crate.
//!
//! Environment variable names, their defaults and the fixed user-facing texts live here so the
//! binaries and the core agree on them.

/// Environment variable holding the Gemini API credential (required).
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";

/// Environment variable for the model request timeout in seconds.
pub const ENV_TIMEOUT: &str = "GEMINI_TIMEOUT";

/// Environment variable for the number of model call attempts.
pub const ENV_MAX_RETRIES: &str = "GEMINI_MAX_RETRIES";

/// Environment variable naming the Gemini model.
pub const ENV_MODEL: &str = "GEMINI_MODEL";

/// Environment variable overriding the Gemini API base URL.
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";

/// Environment variable for the retrieval fan-out.
pub const ENV_RAG_TOP_K: &str = "RAG_TOP_K";

/// Environment variable for log verbosity.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Environment variable enabling the web server in `triage-run`.
pub const ENV_ENABLE_WEB: &str = "ENABLE_WEB";

/// Environment variable for the web server port.
pub const ENV_WEB_PORT: &str = "WEB_PORT";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RAG_TOP_K: usize = 5;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_WEB_PORT: u16 = 5000;
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Disclaimer attached to every diagnosis result.
pub const MEDICAL_DISCLAIMER: &str = "⚠️ IMPORTANT: This is not a substitute for professional medical advice. \
Always consult with a qualified healthcare provider for proper diagnosis and treatment. \
For medical emergencies, call emergency services immediately.";

/// Maximum number of keywords kept by the keyword extractor.
pub const MAX_KEYWORDS: usize = 20;
