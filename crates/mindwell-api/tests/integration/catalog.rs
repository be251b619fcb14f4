//! Categories, tests, questions and test history.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::TestApp;

async fn category(app: &TestApp, admin: &str, name: &str) -> String {
    let (status, body) = app
        .post("/categories", Some(admin), json!({"name": name}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

fn four_point_question(text: &str) -> Value {
    json!({
        "text": text,
        "answers": [
            {"text": "Not at all", "points": 0},
            {"text": "Several days", "points": 1},
            {"text": "More than half the days", "points": 2},
            {"text": "Nearly every day", "points": 3},
        ],
    })
}

fn screening_test(category_id: &str) -> Value {
    json!({
        "title": "Anxiety screening",
        "description": "Two quick questions",
        "category_id": category_id,
        "outcomes": [
            {"min_score": 0, "max_score": 2, "title": "Minimal"},
            {"min_score": 3, "max_score": 6, "title": "Elevated", "description": "Talk to us."},
        ],
        "questions": [
            four_point_question("Feeling nervous?"),
            four_point_question("Unable to stop worrying?"),
        ],
    })
}

/// Answer id at `index` for each question of a test detail.
fn pick(detail: &Value, indexes: &[usize]) -> Value {
    let answers: Vec<Value> = detail["questions"]
        .as_array()
        .unwrap()
        .iter()
        .zip(indexes)
        .map(|(q, i)| json!({"question_id": q["id"], "answer_id": q["answers"][*i]["id"]}))
        .collect();
    json!({ "answers": answers })
}

#[tokio::test]
async fn test_category_admin() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (psy, _) = app.psychologist().await;

    let (status, _) = app
        .post("/categories", Some(&psy), json!({"name": "Mood"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mood = category(&app, &admin, "Mood").await;
    category(&app, &admin, "Anxiety").await;

    let (status, _) = app
        .post("/categories", Some(&admin), json!({"name": " mood "}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.get("/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Anxiety", "Mood"]);

    let (status, body) = app
        .put(
            &format!("/categories/{mood}"),
            Some(&admin),
            json!({"name": "Mood & energy", "description": "Depression screens"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Depression screens");

    let (status, _) = app
        .put(
            &format!("/categories/{mood}"),
            Some(&admin),
            json!({"name": "anxiety"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&format!("/categories/{mood}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/categories/{mood}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (status, _) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/categories/{cat}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("1 test(s)"));
}

#[tokio::test]
async fn test_create_test_validation() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (psy, _) = app.psychologist().await;
    let (patient, _) = app.patient().await;
    let cat = category(&app, &admin, "Anxiety").await;

    let (status, _) = app.post("/tests", Some(&patient), screening_test(&cat)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut no_outcomes = screening_test(&cat);
    no_outcomes["outcomes"] = json!([]);
    let (status, body) = app.post("/tests", Some(&psy), no_outcomes).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("outcomes"));

    let mut overlapping = screening_test(&cat);
    overlapping["outcomes"][1]["min_score"] = json!(2);
    let (status, _) = app.post("/tests", Some(&psy), overlapping).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/tests", Some(&psy), screening_test("missing")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("category_id"));

    let mut one_answer = screening_test(&cat);
    one_answer["questions"][0]["answers"] = json!([{"text": "Yes", "points": 1}]);
    let (status, _) = app.post("/tests", Some(&psy), one_answer).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was stored by the rejected requests.
    let (_, body) = app.get("/tests", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_public_test_detail_hides_points() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    let id = created["id"].as_str().unwrap();

    let (status, detail) = app.get(&format!("/tests/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let questions = detail["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["text"], "Feeling nervous?");
    assert!(questions[0]["answers"][0].get("points").is_none());

    let (_, list) = app.get(&format!("/tests?category={cat}"), None).await;
    assert_eq!(list[0]["question_count"], 2);
    let (_, list) = app.get("/tests?category=other", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_question_management() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (psy, _) = app.psychologist().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&psy), screening_test(&cat)).await;
    let test_id = created["id"].as_str().unwrap();

    let (status, question) = app
        .post(
            &format!("/tests/{test_id}/questions"),
            Some(&psy),
            four_point_question("Trouble relaxing?"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(question["position"], 3);
    let question_id = question["id"].as_str().unwrap();

    let (status, updated) = app
        .put(
            &format!("/questions/{question_id}"),
            Some(&psy),
            json!({
                "text": "Trouble relaxing lately?",
                "answers": [{"text": "No", "points": 0}, {"text": "Yes", "points": 3}],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["position"], 3);
    assert_eq!(updated["answers"][1]["points"], 3);

    let (_, staff_view) = app
        .get(&format!("/tests/{test_id}/questions"), Some(&psy))
        .await;
    assert_eq!(staff_view.as_array().unwrap().len(), 3);

    let (status, _) = app
        .delete(&format!("/questions/{question_id}"), Some(&psy))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .delete(&format!("/questions/{question_id}"), Some(&psy))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_test_removes_its_questions() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    let test_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(&format!("/tests/{test_id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.state.questions().all().await.unwrap().is_empty());
    let (status, _) = app.get(&format!("/tests/{test_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The category is free to go now.
    let (status, _) = app.delete(&format!("/categories/{cat}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_submit_scores_and_records_history() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (psy, _) = app.psychologist().await;
    let (patient, patient_user) = app.patient().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    let test_id = created["id"].as_str().unwrap();
    let (_, detail) = app.get(&format!("/tests/{test_id}"), None).await;

    let (status, entry) = app
        .post(
            &format!("/tests/{test_id}/submit"),
            Some(&patient),
            pick(&detail, &[3, 1]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{entry}");
    assert_eq!(entry["score"], 4);
    assert_eq!(entry["outcome"]["title"], "Elevated");
    assert_eq!(entry["test_title"], "Anxiety screening");
    assert_eq!(
        app.mailer
            .sent_to(&patient_user.email, "test_completed")
            .len(),
        1
    );

    let (status, low) = app
        .post(
            &format!("/tests/{test_id}/submit"),
            Some(&patient),
            pick(&detail, &[0, 1]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(low["outcome"]["title"], "Minimal");

    let (_, history) = app.get("/history", Some(&patient)).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);

    let entry_id = entry["id"].as_str().unwrap();
    let (stranger, _) = app.register("stranger@mindwell.test").await;
    let (status, _) = app.get(&format!("/history/{entry_id}"), Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/history/{entry_id}"), Some(&psy)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .get(&format!("/users/{}/history", patient_user.id), Some(&psy))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (status, _) = app
        .get(&format!("/users/{}/history", patient_user.id), Some(&stranger))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_incomplete_submission_rejected() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (patient, _) = app.patient().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    let test_id = created["id"].as_str().unwrap();
    let (_, detail) = app.get(&format!("/tests/{test_id}"), None).await;

    let (status, body) = app
        .post(
            &format!("/tests/{test_id}/submit"),
            Some(&patient),
            pick(&detail, &[0]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("unanswered"));

    let (status, _) = app
        .post("/tests/missing/submit", Some(&patient), json!({"answers": []}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, history) = app.get("/history", Some(&patient)).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_points_and_positions_rejected() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    let test_id = created["id"].as_str().unwrap();
    let questions_uri = format!("/tests/{test_id}/questions");

    let (status, body) = app
        .post(
            &questions_uri,
            Some(&admin),
            json!({
                "text": "Worth everything?",
                "answers": [{"text": "No", "points": 0}, {"text": "Yes", "points": i32::MAX}],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("answers.points"));

    let mut last = four_point_question("Placed last?");
    last["position"] = json!(u32::MAX);
    let (status, _) = app.post(&questions_uri, Some(&admin), last.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    last["position"] = json!(mindwell_core::model::MAX_POSITION);
    let (status, _) = app.post(&questions_uri, Some(&admin), last).await;
    assert_eq!(status, StatusCode::CREATED);

    // No position is left after the highest one.
    let (status, _) = app
        .post(&questions_uri, Some(&admin), four_point_question("One more?"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, staff_view) = app.get(&questions_uri, Some(&admin)).await;
    assert_eq!(staff_view.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_deleted_user_cannot_submit() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (patient, patient_user) = app.patient().await;
    let cat = category(&app, &admin, "Anxiety").await;
    let (_, created) = app.post("/tests", Some(&admin), screening_test(&cat)).await;
    let test_id = created["id"].as_str().unwrap();
    let (_, detail) = app.get(&format!("/tests/{test_id}"), None).await;

    let (status, _) = app
        .delete(&format!("/users/{}", patient_user.id), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post(
            &format!("/tests/{test_id}/submit"),
            Some(&patient),
            pick(&detail, &[1, 1]),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.state.history().all().await.unwrap().is_empty());
    assert!(app.mailer.sent_to(&patient_user.email, "test_completed").is_empty());
}
