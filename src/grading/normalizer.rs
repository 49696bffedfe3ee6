//! Conversion of a parsed judgment into a consistent [`GradingResult`]
//!
//! Nothing numeric in the judgment is trusted as-is. Part scores are
//! coerced and clamped, then every aggregate is recomputed from the parts.

use super::error::NormalizationFailure;
use super::grade::LetterGrade;
use super::model::{
    label_key, round_to_half, GraderIdentity, GradingResult, Part, PartResult, Question,
    ResultStamp, ScoreSummary,
};
use super::parser::RawJudgment;
use serde_json::Value;
use tracing::{debug, warn};

pub const MISSING_FEEDBACK: &str = "No feedback provided.";

/// Maximum entries kept in each per-part list
pub const MAX_LIST_ITEMS: usize = 3;

pub fn normalize_judgment(
    judgment: &RawJudgment,
    question: &Question,
    stamp: &ResultStamp,
) -> Result<GradingResult, NormalizationFailure> {
    let entries = judgment
        .get("parts")
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizationFailure("judgment has no \"parts\" array".to_string()))?;

    let mut matched = 0usize;
    let parts: Vec<PartResult> = question
        .parts
        .iter()
        .map(|part| match find_entry(entries, part) {
            Some(entry) => {
                matched += 1;
                normalize_part(part, entry)
            }
            None => {
                debug!("No judgment entry for part {}, scoring 0", part.label);
                missing_part(part)
            }
        })
        .collect();

    if matched == 0 {
        return Err(NormalizationFailure(format!(
            "none of the {} judgment entries match a question part label",
            entries.len()
        )));
    }

    let summary = ScoreSummary::from_parts(&parts);

    if let Some(reported) = judgment.get("totalScore").and_then(coerce_number) {
        if (reported - summary.total_score).abs() > f64::EPSILON {
            warn!(
                "Judgment reported totalScore {} but parts sum to {}; using recomputed total",
                reported, summary.total_score
            );
        }
    }

    let derived = LetterGrade::from_percentage(summary.percentage);
    let overall_grade = match judgment
        .get("overallGrade")
        .and_then(Value::as_str)
        .and_then(LetterGrade::parse)
    {
        Some(reported) if reported == derived => reported,
        Some(reported) => {
            warn!(
                "Judgment grade {} inconsistent with {:.1}%; using {}",
                reported, summary.percentage, derived
            );
            derived
        }
        None => derived,
    };

    Ok(GradingResult {
        total_score: summary.total_score,
        max_score: summary.max_score,
        percentage: summary.percentage,
        overall_grade: overall_grade.as_str().to_string(),
        grading_duration: stamp.grading_duration.clone(),
        parts,
        overall_feedback: string_field(judgment.get("overallFeedback")).unwrap_or_default(),
        study_recommendations: string_list(judgment.get("studyRecommendations"), usize::MAX),
        next_steps: string_list(judgment.get("nextSteps"), usize::MAX),
        graded_at: stamp.graded_at,
        grader: GraderIdentity::External,
        question_id: question.id.clone(),
    })
}

fn find_entry<'a>(entries: &'a [Value], part: &Part) -> Option<&'a Value> {
    let key = label_key(&part.label);
    entries.iter().find(|entry| {
        entry
            .get("partLabel")
            .or_else(|| entry.get("label"))
            .and_then(Value::as_str)
            .map(|label| label_key(label) == key)
            .unwrap_or(false)
    })
}

fn normalize_part(part: &Part, entry: &Value) -> PartResult {
    let raw_points = entry.get("pointsEarned").and_then(coerce_number).unwrap_or(0.0);
    let points_earned = round_to_half(raw_points.clamp(0.0, part.max_points)).clamp(0.0, part.max_points);

    if points_earned != raw_points {
        debug!(
            "Part {}: adjusted points {} -> {} (max {})",
            part.label, raw_points, points_earned, part.max_points
        );
    }

    PartResult {
        part_label: part.label.clone(),
        points_earned,
        max_points: part.max_points,
        feedback: string_field(entry.get("feedback"))
            .unwrap_or_else(|| MISSING_FEEDBACK.to_string()),
        strengths: string_list(entry.get("strengths"), MAX_LIST_ITEMS),
        improvements: string_list(entry.get("improvements"), MAX_LIST_ITEMS),
        suggestions: string_list(entry.get("suggestions"), MAX_LIST_ITEMS),
    }
}

fn missing_part(part: &Part) -> PartResult {
    PartResult {
        part_label: part.label.clone(),
        points_earned: 0.0,
        max_points: part.max_points,
        feedback: MISSING_FEEDBACK.to_string(),
        strengths: Vec::new(),
        improvements: Vec::new(),
        suggestions: Vec::new(),
    }
}

/// Accepts numbers and numeric strings; anything non-finite is rejected.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>, limit: usize) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(limit)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => {
            vec![single.trim().to_string()]
        }
        _ => Vec::new(),
    }
}
