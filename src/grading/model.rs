//! Rubric and response data model
//!
//! Questions and responses arrive from the authoring/submission side already
//! deserialized; results leave through the same JSON contract. Field names are
//! camelCase on the wire.

use super::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance used when comparing point totals
const POINT_EPSILON: f64 = 1e-6;

/// Hint for how long an answer to a part is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedLength {
    Short,
    Medium,
    Long,
}

impl ExpectedLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedLength::Short => "short",
            ExpectedLength::Medium => "medium",
            ExpectedLength::Long => "long",
        }
    }
}

/// One labeled sub-question of a free-response question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: String,
    /// Display label, e.g. "(a)"
    pub label: String,
    pub question: String,
    pub max_points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_length: Option<ExpectedLength>,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// A free-response question with its ordered parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub topic: String,
    pub prompt: String,
    pub parts: Vec<Part>,
    pub total_points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_response: Option<String>,
}

impl Question {
    pub fn find_part(&self, part_id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == part_id)
    }

    /// Checks the structural invariants of a question.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.parts.is_empty() {
            return Err(ValidationError::NoParts {
                question_id: self.id.clone(),
            });
        }

        let mut labels = HashSet::new();
        for part in &self.parts {
            if !labels.insert(label_key(&part.label)) {
                return Err(ValidationError::DuplicateLabel(part.label.clone()));
            }

            let doubled = part.max_points * 2.0;
            if !part.max_points.is_finite()
                || part.max_points <= 0.0
                || (doubled - doubled.round()).abs() > POINT_EPSILON
            {
                return Err(ValidationError::InvalidMaxPoints {
                    label: part.label.clone(),
                    max_points: part.max_points,
                });
            }
        }

        let sum: f64 = self.parts.iter().map(|p| p.max_points).sum();
        if (sum - self.total_points).abs() > POINT_EPSILON {
            return Err(ValidationError::TotalPointsMismatch {
                declared: self.total_points,
                sum,
            });
        }

        Ok(())
    }
}

/// A student's answer to one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub part_id: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Seconds spent on the part; fractions are accepted
    #[serde(default)]
    pub time_spent: f64,
    /// Trusted as provided, never re-derived from `text`
    #[serde(default)]
    pub word_count: u32,
}

impl Response {
    /// Returns the answer text if it contains anything besides whitespace.
    pub fn answer(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Inbound grading request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    #[serde(default)]
    pub question: Option<Question>,
    #[serde(default)]
    pub responses: Vec<Response>,
    /// Overrides the question's own rubric text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
}

impl GradingRequest {
    pub fn new(question: Question, responses: Vec<Response>) -> Self {
        Self {
            question: Some(question),
            responses,
            rubric: None,
        }
    }

    pub fn with_rubric(mut self, rubric: impl Into<String>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }

    /// Validates the request and pairs every part with its response.
    ///
    /// Parts without a response are paired with `None` and graded as empty.
    pub fn validate(&self) -> Result<ValidatedRequest<'_>, ValidationError> {
        let question = self
            .question
            .as_ref()
            .ok_or(ValidationError::MissingQuestion)?;

        if self.responses.is_empty() {
            return Err(ValidationError::NoResponses);
        }

        question.validate()?;

        let mut seen = HashSet::new();
        for response in &self.responses {
            if question.find_part(&response.part_id).is_none() {
                return Err(ValidationError::UnknownPart(response.part_id.clone()));
            }
            if !seen.insert(response.part_id.as_str()) {
                return Err(ValidationError::DuplicateResponse(response.part_id.clone()));
            }
        }

        let pairs = question
            .parts
            .iter()
            .map(|part| {
                let response = self.responses.iter().find(|r| r.part_id == part.id);
                (part, response)
            })
            .collect();

        Ok(ValidatedRequest {
            question,
            pairs,
            rubric: self.rubric.as_deref(),
        })
    }
}

/// A request that passed validation, with responses ordered by part
#[derive(Debug, Clone)]
pub struct ValidatedRequest<'a> {
    pub question: &'a Question,
    pub pairs: Vec<(&'a Part, Option<&'a Response>)>,
    pub rubric: Option<&'a str>,
}

/// Which grading path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraderIdentity {
    External,
    Fallback,
}

impl GraderIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraderIdentity::External => "external",
            GraderIdentity::Fallback => "fallback",
        }
    }
}

/// Score and feedback for a single part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResult {
    pub part_label: String,
    pub points_earned: f64,
    pub max_points: f64,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Complete grading outcome for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub overall_grade: String,
    #[serde(rename = "gradingTime")]
    pub grading_duration: String,
    pub parts: Vec<PartResult>,
    pub overall_feedback: String,
    pub study_recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub graded_at: DateTime<Utc>,
    #[serde(rename = "model")]
    pub grader: GraderIdentity,
    pub question_id: String,
}

/// Metadata stamped onto a result by whichever path produced it
#[derive(Debug, Clone)]
pub struct ResultStamp {
    pub grading_duration: String,
    pub graded_at: DateTime<Utc>,
}

impl ResultStamp {
    pub fn new(grading_duration: impl Into<String>, graded_at: DateTime<Utc>) -> Self {
        Self {
            grading_duration: grading_duration.into(),
            graded_at,
        }
    }
}

/// Score totals derived from a list of part results
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

impl ScoreSummary {
    /// Recomputes totals from the parts, ignoring any self-reported aggregate.
    pub fn from_parts(parts: &[PartResult]) -> Self {
        let max_score: f64 = parts.iter().map(|p| p.max_points).sum();
        let earned: f64 = parts.iter().map(|p| p.points_earned).sum();
        let total_score = earned.clamp(0.0, max_score.max(0.0));

        let percentage = if max_score > 0.0 {
            round_to_tenth(total_score / max_score * 100.0)
        } else {
            0.0
        };

        Self {
            total_score,
            max_score,
            percentage,
        }
    }
}

/// Lowercases and strips surrounding punctuation: "(A)", "a)" and "a." all become "a".
///
/// Part labels must be unique under this key, and judgment entries are
/// matched to parts with it.
pub fn label_key(label: &str) -> String {
    label
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to the nearest half point.
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Formats elapsed seconds as `M:SS`, dropping fractional seconds.
pub fn format_elapsed(seconds: f64) -> String {
    let whole = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", whole / 60, whole % 60)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use yare::parameterized;

    fn three_part_question() -> Question {
        question(vec![
            part("p1", "(a)", "Describe glycolysis.", 3.0),
            part("p2", "(b)", "Explain the electron transport chain.", 4.0),
            part("p3", "(c)", "Predict the effect of cyanide.", 2.0),
        ])
    }

    #[test]
    fn test_question_validates() {
        assert!(three_part_question().validate().is_ok());
    }

    #[test]
    fn test_question_without_parts() {
        let q = question(vec![]);
        assert!(matches!(q.validate(), Err(ValidationError::NoParts { .. })));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let q = question(vec![
            part("p1", "(a)", "One", 1.0),
            part("p2", "(A) ", "Two", 1.0),
        ]);
        assert!(matches!(q.validate(), Err(ValidationError::DuplicateLabel(_))));
    }

    #[test]
    fn test_labels_equal_after_punctuation_rejected() {
        let q = question(vec![
            part("p1", "(a)", "One", 3.0),
            part("p2", "a", "Two", 3.0),
        ]);
        assert!(matches!(
            q.validate(),
            Err(ValidationError::DuplicateLabel(label)) if label == "a"
        ));

        let q = question(vec![
            part("p1", "a.", "One", 1.0),
            part("p2", "A)", "Two", 1.0),
        ]);
        assert!(matches!(q.validate(), Err(ValidationError::DuplicateLabel(_))));
    }

    #[parameterized(
        parens = { "(a)", "a" },
        upper = { "(A)", "a" },
        trailing = { "a)", "a" },
        dotted = { "a.", "a" },
        spaced = { "  (b)  ", "b" },
        roman = { "(iii)", "iii" },
    )]
    fn test_label_key(label: &str, expected: &str) {
        assert_eq!(label_key(label), expected);
    }

    #[test]
    fn test_fractional_points_must_be_halves() {
        let q = question(vec![part("p1", "(a)", "One", 1.25)]);
        assert!(matches!(
            q.validate(),
            Err(ValidationError::InvalidMaxPoints { .. })
        ));

        let q = question(vec![part("p1", "(a)", "One", 1.5)]);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_total_points_must_match_sum() {
        let mut q = three_part_question();
        q.total_points = 10.0;
        assert!(matches!(
            q.validate(),
            Err(ValidationError::TotalPointsMismatch { .. })
        ));
    }

    #[test]
    fn test_request_missing_question() {
        let request = GradingRequest {
            question: None,
            responses: vec![response("p1", Some("text"))],
            rubric: None,
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::MissingQuestion)
        ));
    }

    #[test]
    fn test_request_without_responses() {
        let request = GradingRequest::new(three_part_question(), vec![]);
        assert!(matches!(request.validate(), Err(ValidationError::NoResponses)));
    }

    #[test]
    fn test_request_unknown_part() {
        let request =
            GradingRequest::new(three_part_question(), vec![response("p9", Some("text"))]);
        assert!(matches!(
            request.validate(),
            Err(ValidationError::UnknownPart(id)) if id == "p9"
        ));
    }

    #[test]
    fn test_request_duplicate_response() {
        let request = GradingRequest::new(
            three_part_question(),
            vec![response("p1", Some("one")), response("p1", Some("two"))],
        );
        assert!(matches!(
            request.validate(),
            Err(ValidationError::DuplicateResponse(_))
        ));
    }

    #[test]
    fn test_missing_part_response_paired_with_none() {
        let request = GradingRequest::new(
            three_part_question(),
            vec![response("p3", Some("cyanide blocks complex IV"))],
        );
        let validated = request.validate().unwrap();

        assert_eq!(validated.pairs.len(), 3);
        assert!(validated.pairs[0].1.is_none());
        assert!(validated.pairs[1].1.is_none());
        assert_eq!(validated.pairs[2].0.label, "(c)");
        assert!(validated.pairs[2].1.is_some());
    }

    #[test]
    fn test_whitespace_answer_is_empty() {
        assert!(response("p1", Some("   \n\t")).answer().is_none());
        assert!(response("p1", None).answer().is_none());
        assert_eq!(response("p1", Some(" ok ")).answer(), Some(" ok "));
    }

    #[test]
    fn test_score_summary_recomputes() {
        let parts = vec![
            PartResult {
                part_label: "(a)".to_string(),
                points_earned: 2.5,
                max_points: 3.0,
                feedback: String::new(),
                strengths: vec![],
                improvements: vec![],
                suggestions: vec![],
            },
            PartResult {
                part_label: "(b)".to_string(),
                points_earned: 1.0,
                max_points: 4.0,
                feedback: String::new(),
                strengths: vec![],
                improvements: vec![],
                suggestions: vec![],
            },
        ];

        let summary = ScoreSummary::from_parts(&parts);
        assert_eq!(summary.total_score, 3.5);
        assert_eq!(summary.max_score, 7.0);
        assert_eq!(summary.percentage, 50.0);
    }

    #[test]
    fn test_score_summary_zero_max() {
        let summary = ScoreSummary::from_parts(&[]);
        assert_eq!(summary.percentage, 0.0);
        assert_eq!(summary.total_score, 0.0);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0.0), "0:00");
        assert_eq!(format_elapsed(95.0), "1:35");
        assert_eq!(format_elapsed(95.9), "1:35");
        assert_eq!(format_elapsed(600.0), "10:00");
        assert_eq!(format_elapsed(-3.0), "0:00");
    }

    #[test]
    fn test_fractional_time_spent_accepted() {
        let json = r#"{"partId": "a", "text": "Kc = [B]/[A]", "timeSpent": 12.5, "wordCount": 3}"#;
        let response: Response = serde_json::from_str(json).unwrap();

        assert_eq!(response.time_spent, 12.5);
        assert_eq!(format_elapsed(response.time_spent), "0:12");
    }

    #[test]
    fn test_round_helpers() {
        assert_eq!(round_to_tenth(66.666), 66.7);
        assert_eq!(round_to_half(2.26), 2.5);
        assert_eq!(round_to_half(2.24), 2.0);
    }

    #[test]
    fn test_result_serializes_with_wire_names() {
        let result = GradingResult {
            total_score: 1.0,
            max_score: 2.0,
            percentage: 50.0,
            overall_grade: "F".to_string(),
            grading_duration: "0.1s".to_string(),
            parts: vec![],
            overall_feedback: String::new(),
            study_recommendations: vec![],
            next_steps: vec![],
            graded_at: Utc::now(),
            grader: GraderIdentity::Fallback,
            question_id: "q-1".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        for key in [
            "totalScore",
            "maxScore",
            "percentage",
            "overallGrade",
            "gradingTime",
            "parts",
            "overallFeedback",
            "studyRecommendations",
            "nextSteps",
            "gradedAt",
            "model",
            "questionId",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["model"], "fallback");
    }

    #[test]
    fn test_request_deserializes_from_wire() {
        let json = r#"{
            "question": {
                "id": "q-7",
                "subject": "Chemistry",
                "prompt": "Titration",
                "parts": [
                    {"id": "a", "label": "(a)", "question": "Find the molarity.", "maxPoints": 2, "expectedLength": "short", "hints": ["Use M1V1"]}
                ],
                "totalPoints": 2
            },
            "responses": [{"partId": "a", "text": null, "timeSpent": 12, "wordCount": 0}]
        }"#;

        let request: GradingRequest = serde_json::from_str(json).unwrap();
        let question = request.question.as_ref().unwrap();
        assert_eq!(question.parts[0].expected_length, Some(ExpectedLength::Short));
        assert!(request.responses[0].text.is_none());
        assert!(request.validate().is_ok());
    }
}
