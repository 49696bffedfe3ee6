//! Configuration management for frq-grader
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `FRQ_GRADER_PROVIDER`: judgment provider (ollama|openai|anthropic|gemini|groq|xai|deepseek) - default: "ollama"
//! - `FRQ_GRADER_MODEL`: model name - default depends on provider
//! - `FRQ_GRADER_REQUEST_TIMEOUT`: judgment timeout in seconds - default: "15"
//! - `FRQ_GRADER_TEMPERATURE`: sampling temperature - default: "0.3"
//! - `FRQ_GRADER_MAX_TOKENS`: token limit for the judgment - default: "2000"
//! - `FRQ_GRADER_LOG_LEVEL`: logging level - default: "info"
//! - `FRQ_GRADER_JOURNAL`: path of the judgment journal (JSON lines) - default: disabled
//! - `FRQ_GRADER_FALLBACK_ONLY`: skip the judgment service entirely - default: "false"
//!
//! Provider credentials and endpoints are read by the genai library from its
//! usual variables (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `OLLAMA_HOST`, ...).

use genai::adapter::AdapterKind;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:7b";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: ollama, openai, anthropic, gemini, groq, xai, deepseek")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Judgment provider (from genai)
    pub provider: AdapterKind,

    /// Model name to use for the judgment (provider-specific)
    pub model: String,

    /// Judgment timeout in seconds
    pub request_timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Append-only JSON-lines log of judgment attempts
    pub journal_path: Option<PathBuf>,

    /// Never call the judgment service
    pub fallback_only: bool,
}

impl Default for GraderConfig {
    fn default() -> Self {
        let provider = env::var("FRQ_GRADER_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(AdapterKind::Ollama);

        let model = env::var("FRQ_GRADER_MODEL")
            .ok()
            .unwrap_or_else(|| default_model(provider).to_string());

        let request_timeout_secs = env::var("FRQ_GRADER_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let temperature = env::var("FRQ_GRADER_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);

        let max_tokens = env::var("FRQ_GRADER_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let log_level = env::var("FRQ_GRADER_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let journal_path = env::var("FRQ_GRADER_JOURNAL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let fallback_only = env::var("FRQ_GRADER_FALLBACK_ONLY")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            provider,
            model,
            request_timeout_secs,
            temperature,
            max_tokens,
            log_level,
            journal_path,
            fallback_only,
        }
    }
}

impl GraderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max tokens must be at least 1".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("provider".to_string(), self.provider.as_str().to_string());
        map.insert("model".to_string(), self.model.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("temperature".to_string(), self.temperature.to_string());
        map.insert("max_tokens".to_string(), self.max_tokens.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());
        if let Some(ref path) = self.journal_path {
            map.insert("journal".to_string(), path.display().to_string());
        }
        map.insert("fallback_only".to_string(), self.fallback_only.to_string());

        map
    }
}

impl fmt::Display for GraderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grader Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Max Tokens: {}", self.max_tokens)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        if let Some(ref path) = self.journal_path {
            writeln!(f, "  Journal: {}", path.display())?;
        }
        writeln!(f, "  Fallback Only: {}", self.fallback_only)?;
        Ok(())
    }
}

/// Parses a provider name, accepting the common aliases.
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    match name.trim().to_lowercase().as_str() {
        "ollama" => Ok(AdapterKind::Ollama),
        "openai" => Ok(AdapterKind::OpenAI),
        "anthropic" | "claude" => Ok(AdapterKind::Anthropic),
        "gemini" => Ok(AdapterKind::Gemini),
        "groq" => Ok(AdapterKind::Groq),
        "xai" | "grok" => Ok(AdapterKind::Xai),
        "deepseek" => Ok(AdapterKind::DeepSeek),
        _ => Err(ConfigError::InvalidProvider(name.to_string())),
    }
}

pub fn default_model(provider: AdapterKind) -> &'static str {
    match provider {
        AdapterKind::OpenAI => DEFAULT_OPENAI_MODEL,
        AdapterKind::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        AdapterKind::Gemini => DEFAULT_GEMINI_MODEL,
        _ => DEFAULT_OLLAMA_MODEL,
    }
}
