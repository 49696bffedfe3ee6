//! Judgment prompt construction
//!
//! The prompt carries the whole rubric and every student answer, followed by
//! a fixed output contract. It contains no timestamps, so identical input
//! always produces an identical prompt.

use super::model::{format_elapsed, Part, Question, Response, ValidatedRequest};

/// System instruction sent alongside every grading prompt
pub const SYSTEM_PROMPT: &str = "You are an experienced exam reader who grades free-response \
answers strictly against the provided rubric. You respond with a single JSON object and nothing else.";

pub const NO_RESPONSE_MARKER: &str = "[No response provided]";

const DEFAULT_RUBRIC: &str = "No explicit rubric was provided. Award points for each part based on \
accuracy, completeness, use of relevant terminology and quality of reasoning.";

/// Builds the grading prompt for a validated request.
pub fn build_grading_prompt(request: &ValidatedRequest<'_>) -> String {
    let question = request.question;
    let mut prompt = String::new();

    prompt.push_str("Grade the following free-response question answered by a student.\n\n");
    prompt.push_str(&question_header(question));

    let rubric = request
        .rubric
        .or(question.rubric.as_deref())
        .unwrap_or(DEFAULT_RUBRIC);
    prompt.push_str(&format!("RUBRIC:\n{}\n\n", rubric.trim()));

    if let Some(sample) = question.sample_response.as_deref() {
        prompt.push_str(&format!("SAMPLE RESPONSE:\n{}\n\n", sample.trim()));
    }

    prompt.push_str("PARTS AND STUDENT RESPONSES:\n");
    for (part, response) in &request.pairs {
        prompt.push_str(&part_section(part, *response));
    }

    prompt.push_str(&output_contract(question));
    prompt
}

fn question_header(question: &Question) -> String {
    format!(
        "Subject: {}\nUnit: {}\nTopic: {}\nTotal points: {}\n\nQUESTION:\n{}\n\n",
        question.subject,
        question.unit,
        question.topic,
        question.total_points,
        question.prompt.trim()
    )
}

fn part_section(part: &Part, response: Option<&Response>) -> String {
    let mut section = format!(
        "\nPart {} ({} points)\nQuestion: {}\n",
        part.label,
        part.max_points,
        part.question.trim()
    );

    if let Some(length) = part.expected_length {
        section.push_str(&format!("Expected length: {}\n", length.as_str()));
    }

    if !part.hints.is_empty() {
        section.push_str(&format!("Hints: {}\n", part.hints.join("; ")));
    }

    let text = response
        .and_then(Response::answer)
        .map(str::trim)
        .unwrap_or(NO_RESPONSE_MARKER);
    let word_count = response.map(|r| r.word_count).unwrap_or(0);
    let elapsed = response.map(|r| r.time_spent).unwrap_or(0.0);

    section.push_str(&format!(
        "Student response ({} words, time spent {}):\n{}\n",
        word_count,
        format_elapsed(elapsed),
        text
    ));
    section
}

fn output_contract(question: &Question) -> String {
    let labels: Vec<String> = question
        .parts
        .iter()
        .map(|p| format!("\"{}\"", p.label))
        .collect();

    let part_template = question
        .parts
        .first()
        .map(|p| (p.label.as_str(), p.max_points))
        .unwrap_or(("(a)", 1.0));

    format!(
        r#"
Respond with JSON only, using exactly this structure:
{{
  "totalScore": <number>,
  "maxScore": {max},
  "percentage": <number>,
  "overallGrade": "A+" | "A" | "A-" | "B+" | "B" | "B-" | "C+" | "C" | "C-" | "D" | "F",
  "parts": [
    {{
      "partLabel": "{label}",
      "pointsEarned": <number>,
      "maxPoints": {label_max},
      "feedback": "<specific feedback for this part>",
      "strengths": ["<up to 3 items>"],
      "improvements": ["<up to 3 items>"],
      "suggestions": ["<up to 3 items>"]
    }}
  ],
  "overallFeedback": "<summary of the whole answer>",
  "studyRecommendations": ["<topics to review>"],
  "nextSteps": ["<concrete next actions>"]
}}

Rules:
- Output the JSON object only. No markdown fences, no commentary before or after it.
- Include exactly one entry in "parts" for each of these labels, in this order: {labels}
- "partLabel" must match the label exactly as given. Do not add prefixes such as "Part".
- "pointsEarned" may use 0.5 point increments and must be between 0 and that part's maxPoints.
- A part with "{marker}" earns 0 points.
- Use the field names shown above without renaming them.
"#,
        max = question.total_points,
        label = part_template.0,
        label_max = part_template.1,
        labels = labels.join(", "),
        marker = NO_RESPONSE_MARKER,
    )
}
