//! Free-response grading pipeline
//!
//! A [`GradingRequest`] is validated, turned into a prompt, sent once to the
//! judgment service, and the reply is parsed and normalized into a
//! [`GradingResult`]. Any failure after validation is answered by the
//! keyword-based [`FallbackGrader`] instead.
//!
//! ```no_run
//! use frq_grader::grading::{GradingOrchestrator, GradingRequest};
//!
//! # async fn run(request: GradingRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = GradingOrchestrator::fallback_only();
//! let result = orchestrator.grade(&request).await?;
//! println!("{}/{} ({})", result.total_score, result.max_score, result.overall_grade);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fallback;
pub mod grade;
pub mod invoker;
pub mod journal;
pub mod model;
pub mod normalizer;
pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use error::{
    InvokeFailure, NormalizationFailure, ParseFailure, PipelineFailure, ValidationError,
};
pub use fallback::FallbackGrader;
pub use grade::LetterGrade;
pub use invoker::JudgmentInvoker;
pub use journal::JudgmentJournal;
pub use model::{
    ExpectedLength, GraderIdentity, GradingRequest, GradingResult, Part, PartResult, Question,
    Response, ResultStamp, ScoreSummary, ValidatedRequest,
};
pub use normalizer::normalize_judgment;
pub use orchestrator::{GradingOrchestrator, GradingOutcome, GradingStage};
pub use parser::{parse_judgment, RawJudgment};
pub use prompt::build_grading_prompt;
