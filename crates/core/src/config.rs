//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. Everything is read through
//! a key lookup function; [`TriageConfig::from_env`] binds it to the process environment and
//! tests pass a map instead.

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_RAG_TOP_K,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WEB_PORT, ENV_API_KEY, ENV_BASE_URL, ENV_ENABLE_WEB,
    ENV_LOG_LEVEL, ENV_MAX_RETRIES, ENV_MODEL, ENV_RAG_TOP_K, ENV_TIMEOUT, ENV_WEB_PORT,
};
use crate::gateway::RetryPolicy;
use crate::{TriageError, TriageResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Trimmed value for `key`, with blank values treated as unset.
fn lookup_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parses a positive number for `key`, or returns `default` when unset.
fn positive<T, F>(lookup: &F, key: &str, default: T) -> TriageResult<T>
where
    T: FromStr + PartialEq + Default,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup_value(lookup, key) else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(v) if v != T::default() => Ok(v),
        _ => Err(TriageError::Configuration(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))),
    }
}

/// Configuration for the analysis pipeline.
#[derive(Clone)]
pub struct TriageConfig {
    api_key: String,
    timeout: Duration,
    max_retries: u32,
    rag_top_k: usize,
    model: String,
    base_url: String,
}

impl TriageConfig {
    /// Resolves configuration through `lookup`.
    ///
    /// # Errors
    /// Returns [`TriageError::Configuration`] if the API key is missing or blank, or a numeric
    /// setting is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> TriageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup_value(&lookup, ENV_API_KEY).ok_or_else(|| {
            TriageError::Configuration(format!(
                "{ENV_API_KEY} environment variable is not set. \
                 Please set it using: export {ENV_API_KEY}='your_key_here'"
            ))
        })?;

        Ok(Self {
            api_key,
            timeout: Duration::from_secs(positive(&lookup, ENV_TIMEOUT, DEFAULT_TIMEOUT_SECS)?),
            max_retries: positive(&lookup, ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES)?,
            rag_top_k: positive(&lookup, ENV_RAG_TOP_K, DEFAULT_RAG_TOP_K)?,
            model: lookup_value(&lookup, ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.into()),
            base_url: lookup_value(&lookup, ENV_BASE_URL)
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        })
    }

    /// Resolves configuration from the process environment.
    pub fn from_env() -> TriageResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn rag_top_k(&self) -> usize {
        self.rag_top_k
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

impl fmt::Debug for TriageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriageConfig")
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("rag_top_k", &self.rag_top_k)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Settings for the optional web server, independent of the API credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WebSettings {
    pub enabled: bool,
    pub port: u16,
}

impl WebSettings {
    pub fn from_lookup<F>(lookup: F) -> TriageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup_value(&lookup, ENV_ENABLE_WEB)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(Self {
            enabled,
            port: positive(&lookup, ENV_WEB_PORT, DEFAULT_WEB_PORT)?,
        })
    }

    pub fn from_env() -> TriageResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Maps a `LOG_LEVEL` value onto a tracing filter directive.
///
/// Accepts Python-style names (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`) in any case and
/// passes anything else through unchanged, so full `EnvFilter` directives keep working. Unset or
/// blank values give the `INFO` default.
pub fn log_filter_from_env_value(value: Option<String>) -> String {
    let value = value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

    match value.to_ascii_uppercase().as_str() {
        "TRACE" => "trace".into(),
        "DEBUG" => "debug".into(),
        "INFO" => "info".into(),
        "WARN" | "WARNING" => "warn".into(),
        "ERROR" | "CRITICAL" | "FATAL" => "error".into(),
        _ => value,
    }
}

/// Reads `LOG_LEVEL` from the process environment.
pub fn log_filter_from_env() -> String {
    log_filter_from_env_value(std::env::var(ENV_LOG_LEVEL).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_key_is_set() {
        let cfg = TriageConfig::from_lookup(lookup(&[(ENV_API_KEY, "secret")])).unwrap();
        assert_eq!(cfg.api_key(), "secret");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.max_retries(), 3);
        assert_eq!(cfg.rag_top_k(), 5);
        assert_eq!(cfg.model(), "gemini-pro");
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.retry_policy(), RetryPolicy::new(3));
    }

    #[test]
    fn test_missing_or_blank_key_is_a_configuration_error() {
        for pairs in [&[][..], &[(ENV_API_KEY, "   ")][..]] {
            let err = TriageConfig::from_lookup(lookup(pairs)).unwrap_err();
            assert!(matches!(err, TriageError::Configuration(_)));
            assert!(err.to_string().contains("GEMINI_API_KEY"));
        }
    }

    #[test]
    fn test_overrides_are_read() {
        let cfg = TriageConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "k"),
            (ENV_TIMEOUT, "10"),
            (ENV_MAX_RETRIES, " 5 "),
            (ENV_RAG_TOP_K, "2"),
            (ENV_MODEL, "gemini-1.5-flash"),
            (ENV_BASE_URL, "http://localhost:8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.max_retries(), 5);
        assert_eq!(cfg.rag_top_k(), 2);
        assert_eq!(cfg.model(), "gemini-1.5-flash");
        assert_eq!(cfg.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        for (key, value) in [
            (ENV_TIMEOUT, "soon"),
            (ENV_MAX_RETRIES, "-1"),
            (ENV_RAG_TOP_K, "0"),
        ] {
            let err = TriageConfig::from_lookup(lookup(&[(ENV_API_KEY, "k"), (key, value)]))
                .unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[test]
    fn test_debug_output_hides_key() {
        let cfg = TriageConfig::from_lookup(lookup(&[(ENV_API_KEY, "super-secret")])).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_web_settings() {
        assert_eq!(
            WebSettings::from_lookup(lookup(&[])).unwrap(),
            WebSettings {
                enabled: false,
                port: 5000
            }
        );
        assert_eq!(
            WebSettings::from_lookup(lookup(&[(ENV_ENABLE_WEB, "TRUE"), (ENV_WEB_PORT, "8080")]))
                .unwrap(),
            WebSettings {
                enabled: true,
                port: 8080
            }
        );
        assert!(!WebSettings::from_lookup(lookup(&[(ENV_ENABLE_WEB, "yes")]))
            .unwrap()
            .enabled);
        assert!(WebSettings::from_lookup(lookup(&[(ENV_WEB_PORT, "70000")])).is_err());
    }

    #[test]
    fn test_log_filter_mapping() {
        assert_eq!(log_filter_from_env_value(None), "info");
        assert_eq!(log_filter_from_env_value(Some("  ".into())), "info");
        assert_eq!(log_filter_from_env_value(Some("WARNING".into())), "warn");
        assert_eq!(log_filter_from_env_value(Some("critical".into())), "error");
        assert_eq!(log_filter_from_env_value(Some("Debug".into())), "debug");
        assert_eq!(
            log_filter_from_env_value(Some("triage_core=debug,info".into())),
            "triage_core=debug,info"
        );
    }
}
