//! Grading pipeline state machine
//!
//! ```text
//! BuildingPrompt -> Invoking -> Parsing -> Normalizing -> Done
//!                      |           |            |
//!                      +-----------+------------+--> Fallback -> Done
//! ```
//!
//! Only a failure while building the prompt (an invalid request) is returned
//! to the caller. Every later failure is logged and answered by the fallback
//! grader, so a valid request always yields a [`GradingResult`].

use super::error::{InvokeFailure, PipelineFailure, ValidationError};
use super::fallback::FallbackGrader;
use super::invoker::JudgmentInvoker;
use super::journal::JudgmentJournal;
use super::model::{GradingRequest, GradingResult, ResultStamp, ValidatedRequest};
use super::normalizer::normalize_judgment;
use super::parser::{parse_judgment, RawJudgment};
use super::prompt::build_grading_prompt;
use crate::config::GraderConfig;
use crate::llm::LLMClient;
use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingStage {
    BuildingPrompt,
    Invoking,
    Parsing,
    Normalizing,
    Fallback,
    Done,
}

impl GradingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradingStage::BuildingPrompt => "building_prompt",
            GradingStage::Invoking => "invoking",
            GradingStage::Parsing => "parsing",
            GradingStage::Normalizing => "normalizing",
            GradingStage::Fallback => "fallback",
            GradingStage::Done => "done",
        }
    }
}

/// Result plus the path taken to produce it
#[derive(Debug, Clone)]
pub struct GradingOutcome {
    pub result: GradingResult,
    pub stages: Vec<GradingStage>,
    /// The absorbed failure that sent the request to the fallback grader
    pub failure: Option<PipelineFailure>,
}

enum Step<'a> {
    Invoking(&'a JudgmentInvoker, String),
    Parsing(String),
    Normalizing(RawJudgment),
    Fallback(PipelineFailure),
    Done(GradingResult),
}

impl Step<'_> {
    fn stage(&self) -> GradingStage {
        match self {
            Step::Invoking(..) => GradingStage::Invoking,
            Step::Parsing(_) => GradingStage::Parsing,
            Step::Normalizing(_) => GradingStage::Normalizing,
            Step::Fallback(_) => GradingStage::Fallback,
            Step::Done(_) => GradingStage::Done,
        }
    }
}

pub struct GradingOrchestrator {
    invoker: Option<JudgmentInvoker>,
    fallback: FallbackGrader,
    journal: JudgmentJournal,
}

impl GradingOrchestrator {
    pub fn new(invoker: JudgmentInvoker) -> Self {
        Self {
            invoker: Some(invoker),
            fallback: FallbackGrader::new(),
            journal: JudgmentJournal::disabled(),
        }
    }

    /// Orchestrator that never calls a judgment service
    pub fn fallback_only() -> Self {
        Self {
            invoker: None,
            fallback: FallbackGrader::new(),
            journal: JudgmentJournal::disabled(),
        }
    }

    /// Builds an orchestrator from configuration and an optional provider.
    pub fn from_config(config: &GraderConfig, client: Option<Arc<dyn LLMClient>>) -> Self {
        let invoker = client
            .filter(|_| !config.fallback_only)
            .map(|client| {
                JudgmentInvoker::new(client)
                    .with_timeout(config.request_timeout())
                    .with_temperature(config.temperature)
                    .with_max_tokens(config.max_tokens)
            });

        Self {
            invoker,
            fallback: FallbackGrader::new(),
            journal: JudgmentJournal::new(config.journal_path.clone()),
        }
    }

    pub fn with_journal(mut self, journal: JudgmentJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn has_judgment_service(&self) -> bool {
        self.invoker.is_some()
    }

    pub async fn grade(&self, request: &GradingRequest) -> Result<GradingResult, ValidationError> {
        self.grade_detailed(request).await.map(|o| o.result)
    }

    /// Grades independent requests concurrently; results keep input order.
    pub async fn grade_all(
        &self,
        requests: &[GradingRequest],
    ) -> Vec<Result<GradingResult, ValidationError>> {
        join_all(requests.iter().map(|request| self.grade(request))).await
    }

    pub async fn grade_detailed(
        &self,
        request: &GradingRequest,
    ) -> Result<GradingOutcome, ValidationError> {
        let start = Instant::now();
        let mut stages = vec![GradingStage::BuildingPrompt];

        let validated = request.validate().map_err(|e| {
            warn!("Rejecting grading request: {}", e);
            e
        })?;
        let question_id = validated.question.id.as_str();

        info!(
            "Grading question {} ({} parts)",
            question_id,
            validated.question.parts.len()
        );

        let mut step = match &self.invoker {
            Some(invoker) => Step::Invoking(invoker, build_grading_prompt(&validated)),
            None => Step::Fallback(not_configured()),
        };
        let mut failure = None;
        let mut invoke_latency_ms = 0u64;

        loop {
            stages.push(step.stage());
            debug!("Question {}: {}", question_id, step.stage().as_str());

            step = match step {
                Step::Invoking(invoker, prompt) => {
                    let invoke_start = Instant::now();
                    let outcome = invoker.invoke(&prompt).await.map_err(PipelineFailure::from);
                    invoke_latency_ms = invoke_start.elapsed().as_millis() as u64;

                    match outcome {
                        Ok(raw) => Step::Parsing(raw),
                        Err(e) => {
                            self.journal.record(
                                question_id,
                                GradingStage::Invoking.as_str(),
                                e.kind(),
                                invoke_latency_ms,
                                &e.to_string(),
                            );
                            Step::Fallback(e)
                        }
                    }
                }
                Step::Parsing(raw) => match parse_judgment(&raw) {
                    Ok(judgment) => Step::Normalizing(judgment),
                    Err(e) => {
                        self.journal.record(
                            question_id,
                            GradingStage::Parsing.as_str(),
                            "parse_failure",
                            invoke_latency_ms,
                            &e.snippet,
                        );
                        Step::Fallback(e.into())
                    }
                },
                Step::Normalizing(judgment) => {
                    let stamp = stamp(start);
                    match normalize_judgment(&judgment, validated.question, &stamp) {
                        Ok(result) => {
                            self.journal.record(
                                question_id,
                                GradingStage::Normalizing.as_str(),
                                result.grader.as_str(),
                                invoke_latency_ms,
                                &serde_json::Value::Object(judgment).to_string(),
                            );
                            Step::Done(result)
                        }
                        Err(e) => {
                            self.journal.record(
                                question_id,
                                GradingStage::Normalizing.as_str(),
                                "normalization_failure",
                                invoke_latency_ms,
                                &e.to_string(),
                            );
                            Step::Fallback(e.into())
                        }
                    }
                }
                Step::Fallback(e) => {
                    warn!(
                        "Question {}: {} ({}); using fallback grader",
                        question_id,
                        e.kind(),
                        e
                    );
                    failure = Some(e);
                    Step::Done(self.fallback_grade(&validated, start))
                }
                Step::Done(result) => {
                    info!(
                        "Question {} graded by {}: {}/{} ({:.1}%, {}) in {}",
                        question_id,
                        result.grader.as_str(),
                        result.total_score,
                        result.max_score,
                        result.percentage,
                        result.overall_grade,
                        result.grading_duration
                    );
                    return Ok(GradingOutcome {
                        result,
                        stages,
                        failure,
                    });
                }
            };
        }
    }

    fn fallback_grade(&self, request: &ValidatedRequest<'_>, start: Instant) -> GradingResult {
        self.fallback.grade(request, &stamp(start))
    }
}

fn not_configured() -> PipelineFailure {
    InvokeFailure::Transport {
        message: "judgment service not configured".to_string(),
    }
    .into()
}

fn stamp(start: Instant) -> ResultStamp {
    ResultStamp::new(
        format!("{:.1}s", start.elapsed().as_secs_f64()),
        Utc::now(),
    )
}

impl std::fmt::Debug for GradingOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradingOrchestrator")
            .field("invoker", &self.invoker)
            .field("journal", &self.journal)
            .finish()
    }
}
