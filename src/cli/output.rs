//! Output formatting for graded results and health checks
//!
//! JSON output is compact (one line per document), pretty output is indented
//! JSON, and human output is a readable report for terminals.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::grading::{GraderIdentity, GradingResult, ValidationError};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact JSON (machine-readable)
    Json,
    /// Indented JSON
    Pretty,
    /// Human-readable report
    Human,
}

/// Outcome of grading one request of a batch
pub type GradedItem = std::result::Result<GradingResult, ValidationError>;

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_result(&self, result: &GradingResult) -> Result<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::Pretty => self.to_json(result),
            OutputFormat::Human => Ok(format_human(result)),
        }
    }

    /// Formats a batch in input order; rejected requests become error entries.
    pub fn format_batch(&self, items: &[GradedItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::Pretty => {
                let values = items
                    .iter()
                    .map(|item| match item {
                        Ok(result) => serde_json::to_value(result)
                            .context("Failed to serialize grading result"),
                        Err(e) => Ok(error_value(e)),
                    })
                    .collect::<Result<Vec<Value>>>()?;
                self.to_json(&values)
            }
            OutputFormat::Human => {
                let mut output = String::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        output.push('\n');
                    }
                    match item {
                        Ok(result) => output.push_str(&format_human(result)),
                        Err(e) => output.push_str(&format!(
                            "\u{2717} Request {} rejected\n{}\n\n  {}\n",
                            i + 1,
                            RULE,
                            e
                        )),
                    }
                }
                Ok(output)
            }
        }
    }

    pub fn format_health(&self, health_results: &HashMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json | OutputFormat::Pretty => self.to_json(health_results),
            OutputFormat::Human => Ok(format_health_human(health_results)),
        }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.format == OutputFormat::Pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.context("Failed to serialize output to JSON")
    }
}

fn error_value(error: &ValidationError) -> Value {
    json!({
        "error": {
            "kind": "validation_error",
            "message": error.to_string(),
        }
    })
}

fn format_human(result: &GradingResult) -> String {
    let mut output = String::new();

    match result.grader {
        GraderIdentity::External => output.push_str(&format!(
            "\u{2713} Grading Result ({})\n",
            result.question_id
        )),
        GraderIdentity::Fallback => output.push_str(&format!(
            "\u{26A0} Grading Result ({}, fallback grader)\n",
            result.question_id
        )),
    }
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str(&format!(
        "Score:   {} / {} ({:.1}%)\n",
        result.total_score, result.max_score, result.percentage
    ));
    output.push_str(&format!("Grade:   {}\n", result.overall_grade));
    output.push_str(&format!(
        "Grader:  {} in {}\n\n",
        result.grader.as_str(),
        result.grading_duration
    ));

    output.push_str("Parts:\n");
    for (i, part) in result.parts.iter().enumerate() {
        let is_last = i == result.parts.len() - 1;
        let connector = if is_last { "\u{2514}" } else { "\u{251C}" };
        output.push_str(&format!(
            "{}\u{2500} {:<6} {:>4} / {:<4} {}\n",
            connector, part.part_label, part.points_earned, part.max_points, part.feedback
        ));
        push_list(&mut output, "     + ", &part.strengths);
        push_list(&mut output, "     - ", &part.improvements);
        push_list(&mut output, "     > ", &part.suggestions);
    }

    if !result.overall_feedback.is_empty() {
        output.push_str(&format!("\nFeedback: {}\n", result.overall_feedback));
    }

    if !result.study_recommendations.is_empty() {
        output.push_str("\nStudy Recommendations:\n");
        push_list(&mut output, "  - ", &result.study_recommendations);
    }

    if !result.next_steps.is_empty() {
        output.push_str("\nNext Steps:\n");
        push_list(&mut output, "  - ", &result.next_steps);
    }

    output.push_str(&format!("\nGraded at {}\n", result.graded_at.to_rfc3339()));

    output
}

fn push_list(output: &mut String, prefix: &str, items: &[String]) {
    for item in items {
        output.push_str(prefix);
        output.push_str(item);
        output.push('\n');
    }
}

fn format_health_human(health_results: &HashMap<String, HealthStatus>) -> String {
    let mut output = String::new();

    output.push_str("Judgment Service Health\n");
    output.push_str(RULE);
    output.push_str("\n\n");

    let mut providers: Vec<_> = health_results.keys().collect();
    providers.sort();

    for provider in providers {
        let status = &health_results[provider];
        let status_symbol = if status.available {
            "\u{2713}"
        } else {
            "\u{2717}"
        };

        output.push_str(&format!("{} {}\n", status_symbol, provider));
        output.push_str(&format!(
            "  Status: {}\n",
            if status.available {
                "Available"
            } else {
                "Unavailable (fallback grader will be used)"
            }
        ));
        output.push_str(&format!("  Message: {}\n", status.message));

        if let Some(ref details) = status.details {
            output.push_str(&format!("  Details: {}\n", details));
        }
        output.push('\n');
    }

    output
}

/// Health status for a judgment provider
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    pub available: bool,
    pub message: String,
    pub details: Option<String>,
}

impl HealthStatus {
    pub fn available(message: String) -> Self {
        Self {
            available: true,
            message,
            details: None,
        }
    }

    pub fn unavailable(message: String) -> Self {
        Self {
            available: false,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::PartResult;
    use chrono::{TimeZone, Utc};

    fn create_test_result(grader: GraderIdentity) -> GradingResult {
        GradingResult {
            total_score: 8.5,
            max_score: 9.0,
            percentage: 94.4,
            overall_grade: "A".to_string(),
            grading_duration: "2.4s".to_string(),
            parts: vec![
                PartResult {
                    part_label: "(a)".to_string(),
                    points_earned: 3.0,
                    max_points: 3.0,
                    feedback: "Complete".to_string(),
                    strengths: vec!["Clear".to_string()],
                    improvements: vec![],
                    suggestions: vec![],
                },
                PartResult {
                    part_label: "(b)".to_string(),
                    points_earned: 5.5,
                    max_points: 6.0,
                    feedback: "Nearly there".to_string(),
                    strengths: vec![],
                    improvements: vec!["Cite evidence".to_string()],
                    suggestions: vec![],
                },
            ],
            overall_feedback: "Strong work".to_string(),
            study_recommendations: vec!["Review chemiosmosis".to_string()],
            next_steps: vec![],
            graded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            grader,
            question_id: "q-1".to_string(),
        }
    }

    #[test]
    fn test_json_format_is_compact() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter
            .format_result(&create_test_result(GraderIdentity::External))
            .unwrap();

        assert!(!output.contains('\n'));
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["totalScore"], 8.5);
        assert_eq!(parsed["model"], "external");
        assert_eq!(parsed["gradingTime"], "2.4s");
    }

    #[test]
    fn test_pretty_format_round_trips() {
        let result = create_test_result(GraderIdentity::External);
        let formatter = OutputFormatter::new(OutputFormat::Pretty);
        let output = formatter.format_result(&result).unwrap();

        assert!(output.contains("\n  \"totalScore\""));
        let parsed: GradingResult = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_human_format() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter
            .format_result(&create_test_result(GraderIdentity::Fallback))
            .unwrap();

        assert!(output.contains("fallback grader"));
        assert!(output.contains("Score:   8.5 / 9 (94.4%)"));
        assert!(output.contains("Grade:   A"));
        assert!(output.contains("(b)"));
        assert!(output.contains("Cite evidence"));
        assert!(output.contains("Review chemiosmosis"));
        assert!(!output.contains("Next Steps"));
    }

    #[test]
    fn test_batch_includes_errors_in_order() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let items = vec![
            Ok(create_test_result(GraderIdentity::External)),
            Err(ValidationError::MissingQuestion),
        ];

        let output = formatter.format_batch(&items).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["questionId"], "q-1");
        assert_eq!(parsed[1]["error"]["kind"], "validation_error");
    }

    #[test]
    fn test_health_format_human() {
        let mut health_results = HashMap::new();
        health_results.insert(
            "ollama".to_string(),
            HealthStatus::unavailable("Not reachable".to_string())
                .with_details("model: qwen2.5:7b".to_string()),
        );

        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_health(&health_results).unwrap();

        assert!(output.contains("Judgment Service Health"));
        assert!(output.contains("\u{2717} ollama"));
        assert!(output.contains("fallback grader will be used"));
        assert!(output.contains("model: qwen2.5:7b"));
    }
}
