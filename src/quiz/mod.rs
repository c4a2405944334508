//! Rules-test answer / grade handling.
//!
//! Submissions carry free-text answers keyed by question id; grading is a
//! manual admin verdict per answer.  The pure checks live here so both the
//! submission and grading routes share them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// One free-text answer in a submission.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnswerEntry {
    pub question_id: Uuid,
    pub answer: String,
}

/// One admin verdict in a grading.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GradeEntry {
    pub question_id: Uuid,
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Decode and sanity-check a submitted answer sheet against the active
/// question bank.  Every active question must be answered exactly once.
pub fn parse_answers(raw: &Value, active_ids: &[Uuid]) -> Result<Vec<AnswerEntry>, String> {
    let answers: Vec<AnswerEntry> =
        serde_json::from_value(raw.clone()).map_err(|_| "malformed answers".to_string())?;

    if answers.iter().any(|a| a.answer.trim().is_empty()) {
        return Err("every question needs an answer".into());
    }

    let mut seen = HashSet::new();
    for a in &answers {
        if !seen.insert(a.question_id) {
            return Err("duplicate answer for one question".into());
        }
    }

    let wanted: HashSet<Uuid> = active_ids.iter().copied().collect();
    if seen != wanted {
        return Err("answers do not match the active question set".into());
    }

    Ok(answers)
}

/// Decode a grade sheet and check it covers exactly the answered questions.
pub fn parse_grades(raw: &Value, answers: &[AnswerEntry]) -> Result<Vec<GradeEntry>, String> {
    let grades: Vec<GradeEntry> =
        serde_json::from_value(raw.clone()).map_err(|_| "malformed grades".to_string())?;

    let answered: HashSet<Uuid> = answers.iter().map(|a| a.question_id).collect();
    let graded: HashSet<Uuid> = grades.iter().map(|g| g.question_id).collect();
    if graded.len() != grades.len() {
        return Err("duplicate grade for one question".into());
    }
    if graded != answered {
        return Err("grades do not cover the submitted answers".into());
    }

    Ok(grades)
}

/// A submission passes only when every answer was judged correct.
pub fn passed(grades: &[GradeEntry]) -> bool {
    !grades.is_empty() && grades.iter().all(|g| g.correct)
}
