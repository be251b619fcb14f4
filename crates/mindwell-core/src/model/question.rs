use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Document, new_id};
use crate::{Error, Result, validate};

/// Largest magnitude allowed for a single answer's points.
pub const MAX_POINTS: i32 = 1_000;

/// Highest display position a question may take.
pub const MAX_POSITION: u32 = 10_000;

/// One selectable answer of a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Id unique within the question. Assigned when left empty.
    #[serde(default)]
    pub id: String,
    /// Answer text.
    pub text: String,
    /// Points added to the score when chosen.
    pub points: i32,
}

/// A question belonging to a test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Document id.
    pub id: String,
    /// Owning test id.
    pub test_id: String,
    /// Question text.
    pub text: String,
    /// Display order within the test.
    pub position: u32,
    /// Possible answers.
    pub answers: Vec<Answer>,
}

impl Document for Question {
    const COLLECTION: &'static str = "questions";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Question {
    /// Create a validated question for `test_id`.
    pub fn new(test_id: &str, text: &str, position: u32, answers: Vec<Answer>) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            test_id: test_id.to_string(),
            text: validate::non_blank("text", text)?,
            position: validate_position(position)?,
            answers: validate_answers(answers)?,
        })
    }

    /// Replace text, position and answers.
    pub fn update(&mut self, text: &str, position: u32, answers: Vec<Answer>) -> Result<()> {
        let text = validate::non_blank("text", text)?;
        let position = validate_position(position)?;
        let answers = validate_answers(answers)?;
        self.text = text;
        self.position = position;
        self.answers = answers;
        Ok(())
    }

    /// Look up an answer by id.
    pub fn answer(&self, answer_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }
}

fn validate_position(position: u32) -> Result<u32> {
    if position > MAX_POSITION {
        return Err(Error::validation_field(
            "position",
            format!("must be at most {MAX_POSITION}"),
        ));
    }
    Ok(position)
}

/// Check answers, trimming texts and assigning missing ids.
pub fn validate_answers(mut answers: Vec<Answer>) -> Result<Vec<Answer>> {
    if answers.len() < 2 {
        return Err(Error::validation_field(
            "answers",
            "a question needs at least two answers",
        ));
    }
    let mut seen = HashSet::new();
    for answer in &mut answers {
        answer.text = validate::non_blank("answers.text", &answer.text)?;
        if !(-MAX_POINTS..=MAX_POINTS).contains(&answer.points) {
            return Err(Error::validation_field(
                "answers.points",
                format!("must be between -{MAX_POINTS} and {MAX_POINTS}"),
            ));
        }
        answer.id = answer.id.trim().to_string();
        if answer.id.is_empty() {
            answer.id = new_id();
        }
        if !seen.insert(answer.id.clone()) {
            return Err(Error::validation_field(
                "answers",
                format!("duplicate answer id '{}'", answer.id),
            ));
        }
    }
    Ok(answers)
}
