//! Scoring of test submissions.

use std::collections::HashMap;

use crate::model::{Outcome, Question, SubmittedAnswer};
use crate::{Error, Result};

/// Sum the points of the chosen answers.
///
/// Every question of the test must be answered exactly once, and every
/// submitted answer must name a question of this test and one of its answers.
pub fn score_submission(questions: &[Question], answers: &[SubmittedAnswer]) -> Result<i32> {
    if questions.is_empty() {
        return Err(Error::validation("this test has no questions yet"));
    }

    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();
    let mut answered: HashMap<&str, i32> = HashMap::with_capacity(answers.len());

    for submitted in answers {
        let question = by_id.get(submitted.question_id.as_str()).ok_or_else(|| {
            Error::validation_field(
                "answers",
                format!("unknown question '{}'", submitted.question_id),
            )
        })?;
        let answer = question.answer(&submitted.answer_id).ok_or_else(|| {
            Error::validation_field(
                "answers",
                format!(
                    "unknown answer '{}' for question '{}'",
                    submitted.answer_id, submitted.question_id
                ),
            )
        })?;
        if answered
            .insert(question.id.as_str(), answer.points)
            .is_some()
        {
            return Err(Error::validation_field(
                "answers",
                format!("question '{}' answered more than once", question.id),
            ));
        }
    }

    let missing = questions
        .iter()
        .filter(|q| !answered.contains_key(q.id.as_str()))
        .count();
    if missing > 0 {
        return Err(Error::validation_field(
            "answers",
            format!("{missing} question(s) left unanswered"),
        ));
    }

    answered
        .values()
        .try_fold(0i32, |total, points| total.checked_add(*points))
        .ok_or_else(|| Error::validation("total score is out of range"))
}

/// The bucket whose `[min_score, max_score]` contains `score`.
pub fn find_outcome(outcomes: &[Outcome], score: i32) -> Option<&Outcome> {
    outcomes.iter().find(|o| o.contains(score))
}
