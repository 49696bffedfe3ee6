//! frq-grader - grading for multi-part free-response answers
//!
//! A grading request (a question with labeled parts plus the student's
//! responses) is turned into a prompt, judged once by an LLM provider, and
//! the judgment is parsed and normalized into a consistent result. When the
//! judgment is slow, missing or unusable, a deterministic keyword heuristic
//! grades the answers instead, so every valid request gets a result.
//!
//! # Example Usage
//!
//! ```no_run
//! use frq_grader::grading::{GradingOrchestrator, GradingRequest, JudgmentInvoker};
//! use frq_grader::llm::{AdapterKind, GenAIClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run(request: GradingRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let client = GenAIClient::new(
//!     AdapterKind::Ollama,
//!     "qwen2.5:7b".to_string(),
//!     Duration::from_secs(15),
//! );
//! let orchestrator = GradingOrchestrator::new(JudgmentInvoker::new(Arc::new(client)));
//!
//! let result = orchestrator.grade(&request).await?;
//! println!("{} ({}%)", result.overall_grade, result.percentage);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`grading`]: data model, pipeline stages and the orchestrator
//! - [`llm`]: judgment providers behind the [`llm::LLMClient`] trait
//! - [`config`]: environment-driven configuration
//! - [`cli`]: the `frq-grader` command line

pub mod cli;
pub mod config;
pub mod grading;
pub mod llm;
pub mod util;

pub use config::{ConfigError, GraderConfig};
pub use grading::{
    GraderIdentity, GradingOrchestrator, GradingRequest, GradingResult, PartResult, Question,
    Response, ValidationError,
};
pub use llm::{BackendError, LLMClient};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
