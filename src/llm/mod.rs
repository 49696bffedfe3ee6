//! Judgment-service abstraction layer
//!
//! The grader only needs a prompt-in, text-out capability. [`LLMClient`]
//! expresses it; GenAI-backed and mock implementations are provided.

mod client;
mod error;
mod genai;
mod mock;
mod selector;
mod types;

pub use ::genai::adapter::AdapterKind;
pub use client::LLMClient;
pub use error::BackendError;
pub use self::genai::{GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse};
pub use selector::{select_judgment_client, SelectedClient};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
