//! Process configuration.
//!
//! `AppConfig` is read once at startup from environment variables (a `.env`
//! file is loaded first by the binary) and is immutable afterwards.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::completion::DEFAULT_API_URL;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const API_URL_VAR: &str = "GROQ_API_URL";
pub const MODELS_VAR: &str = "CHAT_MODELS";
pub const DATASET_PATH_VAR: &str = "DATASET_PATH";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";
pub const TIMEOUT_VAR: &str = "LLM_TIMEOUT_SECS";
pub const PROVIDER_VAR: &str = "AI_PROVIDER_NAME";

/// Models tried when `CHAT_MODELS` is not set, largest first.
pub const DEFAULT_MODELS: [&str; 2] = ["llama-3.3-70b-versatile", "llama-3.1-8b-instant"];
pub const DEFAULT_DATASET_PATH: &str = "base_faq_one_organizada.csv";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROVIDER: &str = "Groq";

/// Errors that prevent the process from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API credential is absent or blank
    #[error("{0} is not set. Get a key at https://console.groq.com/")]
    MissingCredential(&'static str),

    /// A variable holds a value that cannot be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// The model list is empty after parsing
    #[error("No models configured")]
    NoModels,
}

/// Immutable startup configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bearer token for the completion endpoint
    pub api_key: String,
    /// Full URL of the chat-completion endpoint
    pub api_url: String,
    /// Model identifiers in priority order
    pub models: Vec<String>,
    /// Path of the CSV dataset
    pub dataset_path: PathBuf,
    /// Address to bind the HTTP server to
    pub host: String,
    /// Port to bind the HTTP server to
    pub port: u16,
    /// Per-call timeout for the completion endpoint
    pub request_timeout: Duration,
    /// Provider name reported by the health endpoint
    pub provider: String,
}

// Hand-written so the credential never ends up in logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("models", &self.models)
            .field("dataset_path", &self.dataset_path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("provider", &self.provider)
            .finish()
    }
}

impl AppConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` if `GROQ_API_KEY` is unset or
    /// blank, `ConfigError::InvalidValue` for unparsable numbers and
    /// `ConfigError::NoModels` if `CHAT_MODELS` lists no model.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;

        let models = match lookup(MODELS_VAR) {
            Some(raw) => parse_models(&raw),
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };
        if models.is_empty() {
            return Err(ConfigError::NoModels);
        }

        let port = match lookup(PORT_VAR) {
            Some(raw) => parse_number(PORT_VAR, &raw)?,
            None => DEFAULT_PORT,
        };

        let timeout_secs: u64 = match lookup(TIMEOUT_VAR) {
            Some(raw) => parse_number(TIMEOUT_VAR, &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: TIMEOUT_VAR,
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_key,
            api_url: lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            models,
            dataset_path: lookup(DATASET_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            host: lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            provider: lookup(PROVIDER_VAR).unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        })
    }
}

/// Parses a comma-separated model list.
///
/// Splits on commas, trims whitespace from each entry, and filters out empty strings.
pub fn parse_models(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn missing_credential_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingCredential(API_KEY_VAR))));
    }

    #[test]
    fn blank_credential_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "  ")]));
        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn defaults_apply_when_only_credential_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "gsk_test")])).unwrap();

        assert_eq!(config.api_key, "gsk_test");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.models, DEFAULT_MODELS);
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.provider, "Groq");
    }

    #[test]
    fn variables_override_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "gsk_test"),
            (API_URL_VAR, "http://localhost:9000/v1/chat/completions"),
            (MODELS_VAR, "a, b ,,c"),
            (DATASET_PATH_VAR, "/data/faq.csv"),
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, "9090"),
            (TIMEOUT_VAR, "5"),
            (PROVIDER_VAR, "Local"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.models, ["a", "b", "c"]);
        assert_eq!(config.dataset_path, PathBuf::from("/data/faq.csv"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.provider, "Local");
    }

    #[test]
    fn empty_model_list_is_rejected() {
        let result =
            AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "gsk_test"), (MODELS_VAR, " , ")]));
        assert!(matches!(result, Err(ConfigError::NoModels)));
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let result =
            AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "gsk_test"), (PORT_VAR, "http")]));

        let error = result.unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { name: PORT_VAR, .. }));
        assert!(error.to_string().contains("PORT"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result =
            AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "gsk_test"), (TIMEOUT_VAR, "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { name: TIMEOUT_VAR, .. })));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let config = AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "gsk_secret")])).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn parse_models_with_whitespace_and_empty_elements() {
        assert_eq!(parse_models(" a , b,,c, "), vec!["a", "b", "c"]);
        assert!(parse_models("  ,  ,  ").is_empty());
        assert!(parse_models("").is_empty());
    }

    #[test]
    #[serial_test::serial]
    fn from_env_reads_process_environment() {
        unsafe {
            std::env::set_var(API_KEY_VAR, "gsk_from_env");
            std::env::set_var(MODELS_VAR, "env-model");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.api_key, "gsk_from_env");
        assert_eq!(config.models, ["env-model"]);

        unsafe {
            std::env::remove_var(API_KEY_VAR);
            std::env::remove_var(MODELS_VAR);
        }
    }

    #[test]
    #[serial_test::serial]
    fn from_env_fails_without_credential() {
        unsafe {
            std::env::remove_var(API_KEY_VAR);
        }

        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::MissingCredential(_))
        ));
    }
}
