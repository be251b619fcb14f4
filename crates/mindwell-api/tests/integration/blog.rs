//! Blog publishing.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::TestApp;

async fn publish(app: &TestApp, token: &str, title: &str, published: bool) -> Value {
    let (status, body) = app
        .post(
            "/blog",
            Some(token),
            json!({
                "title": title,
                "content": "Some words.",
                "tags": ["Sleep", "wellbeing"],
                "published": published,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_slugs_are_unique() {
    let app = TestApp::new();
    let (psy, _) = app.psychologist().await;

    let first = publish(&app, &psy, "Sleep & Mood!", true).await;
    let second = publish(&app, &psy, "Sleep & mood", true).await;
    assert_eq!(first["slug"], "sleep-mood");
    assert_eq!(second["slug"], "sleep-mood-2");
    assert_eq!(first["tags"], json!(["sleep", "wellbeing"]));

    let (status, body) = app.get("/blog/sleep-mood-2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], second["id"]);
}

#[tokio::test]
async fn test_drafts_are_hidden_from_the_public() {
    let app = TestApp::new();
    let (psy, _) = app.psychologist().await;
    publish(&app, &psy, "Public post", true).await;
    let draft = publish(&app, &psy, "Work in progress", false).await;

    let (_, list) = app.get("/blog", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["slug"], "public-post");

    let (status, _) = app.get("/blog/work-in-progress", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, managed) = app.get("/blog/manage", Some(&psy)).await;
    assert_eq!(managed.as_array().unwrap().len(), 2);

    let id = draft["id"].as_str().unwrap();
    let (status, body) = app
        .put(
            &format!("/blog/{id}"),
            Some(&psy),
            json!({"title": "Finished", "content": "Done.", "published": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "work-in-progress");
    let (status, _) = app.get("/blog/work-in-progress", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_tag_filter_and_order() {
    let app = TestApp::new();
    let (psy, _) = app.psychologist().await;
    publish(&app, &psy, "Older", true).await;
    let (status, _) = app
        .post(
            "/blog",
            Some(&psy),
            json!({"title": "Newer", "content": "Body", "tags": ["anxiety"], "published": true}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = app.get("/blog", None).await;
    assert_eq!(all[0]["title"], "Newer");
    assert_eq!(all[1]["title"], "Older");

    let (_, tagged) = app.get("/blog?tag=SLEEP", None).await;
    let tagged = tagged.as_array().unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0]["title"], "Older");
}

#[tokio::test]
async fn test_only_author_or_admin_edits() {
    let app = TestApp::new();
    let (author, _) = app.psychologist().await;
    let (colleague, _) = app
        .create_user(mindwell_core::Role::Psychologist, "colleague@mindwell.test")
        .await;
    let (admin, _) = app.admin().await;
    let (patient, _) = app.patient().await;

    let (status, _) = app
        .post(
            "/blog",
            Some(&patient),
            json!({"title": "Hi", "content": "Body"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let post = publish(&app, &author, "Mine", true).await;
    let id = post["id"].as_str().unwrap();
    let edit = json!({"title": "Changed", "content": "Body", "published": true});

    let (status, _) = app.put(&format!("/blog/{id}"), Some(&colleague), edit.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, managed) = app.get("/blog/manage", Some(&colleague)).await;
    assert!(managed.as_array().unwrap().is_empty());
    let (_, managed) = app.get("/blog/manage", Some(&admin)).await;
    assert_eq!(managed.as_array().unwrap().len(), 1);

    let (status, _) = app.put(&format!("/blog/{id}"), Some(&admin), edit).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/blog/{id}"), Some(&colleague)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/blog/{id}"), Some(&author)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&format!("/blog/{id}"), Some(&author)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
