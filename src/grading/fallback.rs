//! Local keyword-overlap grader used when no external judgment is available
//!
//! Deliberately crude. What matters is that it is deterministic: the same
//! question and response always produce the same [`PartResult`].

use super::grade::LetterGrade;
use super::model::{
    GraderIdentity, GradingResult, Part, PartResult, Question, Response, ResultStamp,
    ScoreSummary, ValidatedRequest,
};
use std::collections::BTreeSet;

pub const NO_ANSWER_FEEDBACK: &str = "No answer was provided.";

const FULL_CREDIT_FEEDBACK: &str = "Your answer addresses the key concepts expected for this part.";
const PARTIAL_CREDIT_FEEDBACK: &str = "Your answer touches on some of the key concepts for this part \
but leaves out important details.";
const NO_CREDIT_FEEDBACK: &str = "Your answer does not address the key concepts expected for this part.";

const FALLBACK_OVERALL_FEEDBACK: &str = "This answer was scored by the automated backup grader \
because detailed grading was unavailable. Scores are based on coverage of key terms and are approximate.";

/// Words shorter than this are not keywords
const MIN_KEYWORD_CHARS: usize = 5;
/// Answers longer than this earn the length bonus
const LENGTH_BONUS_THRESHOLD: usize = 100;
/// Lower bound of the keyword-ratio denominator
const MIN_KEYWORD_DIVISOR: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGrader;

impl FallbackGrader {
    pub fn new() -> Self {
        Self
    }

    /// Grades a whole validated request.
    pub fn grade(&self, request: &ValidatedRequest<'_>, stamp: &ResultStamp) -> GradingResult {
        let question = request.question;
        let parts: Vec<PartResult> = request
            .pairs
            .iter()
            .map(|(part, response)| self.grade_part(question, part, *response))
            .collect();

        let summary = ScoreSummary::from_parts(&parts);
        let grade = LetterGrade::from_percentage(summary.percentage);

        let study_recommendations = parts
            .iter()
            .filter(|p| p.points_earned < p.max_points)
            .map(|p| format!("Review the material covered by part {}", p.part_label))
            .collect();

        GradingResult {
            total_score: summary.total_score,
            max_score: summary.max_score,
            percentage: summary.percentage,
            overall_grade: grade.as_str().to_string(),
            grading_duration: stamp.grading_duration.clone(),
            parts,
            overall_feedback: FALLBACK_OVERALL_FEEDBACK.to_string(),
            study_recommendations,
            next_steps: vec![
                "Compare your answers against the rubric for each part".to_string(),
                "Request a detailed re-grade when full grading is available".to_string(),
            ],
            graded_at: stamp.graded_at,
            grader: GraderIdentity::Fallback,
            question_id: question.id.clone(),
        }
    }

    pub fn grade_part(
        &self,
        question: &Question,
        part: &Part,
        response: Option<&Response>,
    ) -> PartResult {
        let Some(answer) = response.and_then(Response::answer) else {
            return PartResult {
                part_label: part.label.clone(),
                points_earned: 0.0,
                max_points: part.max_points,
                feedback: NO_ANSWER_FEEDBACK.to_string(),
                strengths: Vec::new(),
                improvements: vec!["Provide an answer for this part".to_string()],
                suggestions: Vec::new(),
            };
        };

        let keywords = keywords(&part.question, question.sample_response.as_deref());
        let points_earned = score_answer(answer, &keywords, part.max_points);

        let (feedback, strengths, improvements, suggestions) = if points_earned >= part.max_points
        {
            (
                FULL_CREDIT_FEEDBACK,
                vec!["Covers the key terms of the question"],
                vec![],
                vec!["Check your reasoning against the sample response"],
            )
        } else if points_earned > 0.0 {
            (
                PARTIAL_CREDIT_FEEDBACK,
                vec!["Uses some of the relevant terminology"],
                vec!["Address every element the question asks for"],
                vec!["Support each claim with specific evidence or examples"],
            )
        } else {
            (
                NO_CREDIT_FEEDBACK,
                vec![],
                vec!["Focus on the concepts named in the question"],
                vec!["Review this topic before attempting the question again"],
            )
        };

        PartResult {
            part_label: part.label.clone(),
            points_earned,
            max_points: part.max_points,
            feedback: feedback.to_string(),
            strengths: strengths.into_iter().map(str::to_string).collect(),
            improvements: improvements.into_iter().map(str::to_string).collect(),
            suggestions: suggestions.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Lowercased, de-duplicated words of at least five characters.
pub fn keywords(part_question: &str, sample_response: Option<&str>) -> BTreeSet<String> {
    part_question
        .split_whitespace()
        .chain(sample_response.unwrap_or_default().split_whitespace())
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .collect()
}

/// Keyword score floored to whole points, plus up to one point for length.
pub fn score_answer(answer: &str, keywords: &BTreeSet<String>, max_points: f64) -> f64 {
    let lowered = answer.to_lowercase();
    let matched = keywords.iter().filter(|k| lowered.contains(k.as_str())).count();

    let divisor = MIN_KEYWORD_DIVISOR.max(keywords.len() as f64 / 3.0);
    let match_ratio = matched as f64 / divisor;
    let keyword_score = (match_ratio * max_points).min(max_points).floor();

    let length_bonus = if answer.chars().count() > LENGTH_BONUS_THRESHOLD {
        (max_points - keyword_score).min(1.0)
    } else {
        0.0
    };

    keyword_score + length_bonus
}
