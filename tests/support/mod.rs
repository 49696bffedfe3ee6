//! Shared fixtures for integration tests
#![allow(dead_code)]

use frq_grader::grading::grade::LetterGrade;
use frq_grader::grading::model::round_to_tenth;
use frq_grader::grading::{
    GradingOrchestrator, GradingRequest, GradingResult, JudgmentInvoker, Part, Question, Response,
};
use frq_grader::llm::{MockLLMClient, MockResponse};
use std::sync::Arc;

pub fn part(id: &str, label: &str, question: &str, max_points: f64) -> Part {
    Part {
        id: id.to_string(),
        label: label.to_string(),
        question: question.to_string(),
        max_points,
        expected_length: None,
        hints: Vec::new(),
    }
}

pub fn response(part_id: &str, text: Option<&str>) -> Response {
    Response {
        part_id: part_id.to_string(),
        text: text.map(str::to_string),
        time_spent: 120.0,
        word_count: text.map(|t| t.split_whitespace().count() as u32).unwrap_or(0),
    }
}

/// Three parts worth 3, 4 and 2 points
pub fn respiration_question() -> Question {
    Question {
        id: "bio-resp-01".to_string(),
        subject: "AP Biology".to_string(),
        unit: "Unit 3".to_string(),
        topic: "Cellular Respiration".to_string(),
        prompt: "Cellular respiration releases energy stored in glucose.".to_string(),
        parts: vec![
            part(
                "p1",
                "(a)",
                "Describe the products of glycolysis and where glycolysis occurs.",
                3.0,
            ),
            part(
                "p2",
                "(b)",
                "Explain how the electron transport chain establishes a proton gradient.",
                4.0,
            ),
            part(
                "p3",
                "(c)",
                "Predict the effect of an uncoupling protein on ATP synthesis.",
                2.0,
            ),
        ],
        total_points: 9.0,
        rubric: None,
        sample_response: Some(
            "Glycolysis occurs in the cytoplasm and produces pyruvate, ATP and NADH. \
             Electrons passed along the chain pump protons into the intermembrane space."
                .to_string(),
        ),
    }
}

pub fn answered_request() -> GradingRequest {
    GradingRequest::new(
        respiration_question(),
        vec![
            response(
                "p1",
                Some("Glycolysis occurs in the cytoplasm and produces pyruvate and NADH."),
            ),
            response(
                "p2",
                Some(
                    "Electrons moving through the electron transport chain power pumps that \
                     move protons across the inner membrane, creating a gradient.",
                ),
            ),
            response("p3", Some("ATP synthesis would decrease.")),
        ],
    )
}

pub fn empty_request() -> GradingRequest {
    GradingRequest::new(
        respiration_question(),
        vec![
            response("p1", None),
            response("p2", Some("")),
            response("p3", Some("   ")),
        ],
    )
}

pub fn mock_orchestrator(
    responses: Vec<MockResponse>,
) -> (Arc<MockLLMClient>, GradingOrchestrator) {
    let client = Arc::new(MockLLMClient::new());
    client.add_responses(responses);
    let orchestrator = GradingOrchestrator::new(JudgmentInvoker::new(client.clone()));
    (client, orchestrator)
}

/// Checks every invariant a finished result must satisfy.
pub fn assert_invariants(result: &GradingResult, question: &Question) {
    let sum: f64 = result.parts.iter().map(|p| p.points_earned).sum();
    assert!(
        (sum - result.total_score).abs() < 1e-9,
        "parts sum to {} but totalScore is {}",
        sum,
        result.total_score
    );
    assert!(result.total_score >= 0.0);
    assert!(result.total_score <= result.max_score);
    assert_eq!(result.max_score, question.total_points);

    let expected_percentage = if result.max_score > 0.0 {
        round_to_tenth(result.total_score / result.max_score * 100.0)
    } else {
        0.0
    };
    assert_eq!(result.percentage, expected_percentage);
    assert_eq!(
        result.overall_grade,
        LetterGrade::from_percentage(result.percentage).as_str()
    );

    assert_eq!(result.parts.len(), question.parts.len());
    for (part_result, part) in result.parts.iter().zip(&question.parts) {
        assert_eq!(part_result.part_label, part.label);
        assert_eq!(part_result.max_points, part.max_points);
        assert!(part_result.points_earned >= 0.0);
        assert!(part_result.points_earned <= part.max_points);
        assert_eq!((part_result.points_earned * 2.0).fract(), 0.0);
        assert!(part_result.strengths.len() <= 3);
        assert!(part_result.improvements.len() <= 3);
        assert!(part_result.suggestions.len() <= 3);
    }

    assert_eq!(result.question_id, question.id);
}
