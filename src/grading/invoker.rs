//! Single-shot call to the judgment service
//!
//! Every provider problem becomes an [`InvokeFailure`] value. There is no
//! retry here; the timeout covers exactly one attempt.

use super::error::InvokeFailure;
use super::prompt::SYSTEM_PROMPT;
use crate::llm::{BackendError, ChatMessage, LLMClient, LLMRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 2000;

pub struct JudgmentInvoker {
    client: Arc<dyn LLMClient>,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl JudgmentInvoker {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Sends the prompt and returns the raw judgment text.
    pub async fn invoke(&self, prompt: &str) -> Result<String, InvokeFailure> {
        let request = LLMRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        debug!(
            "Invoking judgment via {} (timeout {}s, {} prompt chars)",
            self.client.name(),
            self.timeout.as_secs(),
            prompt.len()
        );

        let response = match tokio::time::timeout(self.timeout, self.client.chat(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(map_backend_error(err)),
            Err(_) => {
                return Err(InvokeFailure::Timeout {
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        if response.content.trim().is_empty() {
            return Err(InvokeFailure::EmptyOutput);
        }

        debug!(
            "Judgment received in {:?} ({} chars)",
            response.response_time,
            response.content.len()
        );

        Ok(response.content)
    }
}

fn map_backend_error(err: BackendError) -> InvokeFailure {
    match err {
        BackendError::TimeoutError { seconds } => InvokeFailure::Timeout { seconds },
        other => InvokeFailure::Transport {
            message: other.to_string(),
        },
    }
}

impl std::fmt::Debug for JudgmentInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgmentInvoker")
            .field("client", &self.client.name())
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
