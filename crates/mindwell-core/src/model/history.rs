use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Document, Outcome, Test, new_id};

/// The answer a user picked for one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    /// Question id.
    pub question_id: String,
    /// Chosen answer id.
    pub answer_id: String,
}

/// A completed test, with its score and resulting outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestHistory {
    /// Document id.
    pub id: String,
    /// User who took the test.
    pub user_id: String,
    /// Test id.
    pub test_id: String,
    /// Test title at the time it was taken.
    pub test_title: String,
    /// Submitted answers.
    pub answers: Vec<SubmittedAnswer>,
    /// Sum of the chosen answers' points.
    pub score: i32,
    /// Matched outcome bucket, copied so later edits to the test don't rewrite history.
    pub outcome: Option<Outcome>,
    /// Submission time.
    pub taken_at: DateTime<Utc>,
}

impl Document for TestHistory {
    const COLLECTION: &'static str = "test_history";

    fn id(&self) -> &str {
        &self.id
    }
}

impl TestHistory {
    /// Record a scored submission of `test` by `user_id`.
    pub fn record(
        user_id: &str,
        test: &Test,
        answers: Vec<SubmittedAnswer>,
        score: i32,
        outcome: Option<Outcome>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            test_id: test.id.clone(),
            test_title: test.title.clone(),
            answers,
            score,
            outcome,
            taken_at: Utc::now(),
        }
    }
}
