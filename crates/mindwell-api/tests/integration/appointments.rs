//! Slots, booking and the appointment lifecycle.

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

use crate::common::{TestApp, at, future_monday, slot};

fn start_of(body: &Value) -> DateTime<Utc> {
    body["start"].as_str().unwrap().parse().unwrap()
}

async fn book(app: &TestApp, token: &str, psychologist_id: &str, hour: u32) -> (StatusCode, Value) {
    app.post(
        "/appointments",
        Some(token),
        json!({"psychologist_id": psychologist_id, "start": slot(hour)}),
    )
    .await
}

#[tokio::test]
async fn test_slots_cover_opening_hours() {
    let app = TestApp::new();
    let (_, psy) = app.psychologist().await;
    let day = future_monday();

    let (status, body) = app
        .get(&format!("/psychologists/{}/slots?from={day}&to={day}", psy.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let slots = body.as_array().unwrap();
    assert_eq!(slots.len(), 8);
    assert_eq!(start_of(&slots[0]), at(day, 9));
    assert_eq!(start_of(&slots[7]), at(day, 16));
    assert!(slots.iter().all(|s| s["available"] == true));
}

#[tokio::test]
async fn test_slots_skip_closed_days_and_reject_bad_ranges() {
    let app = TestApp::new();
    let (_, psy) = app.psychologist().await;
    let saturday = future_monday() - Duration::days(2);
    let sunday = saturday + Duration::days(1);

    let (status, body) = app
        .get(
            &format!("/psychologists/{}/slots?from={saturday}&to={sunday}", psy.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .get(
            &format!("/psychologists/{}/slots?from={sunday}&to={saturday}", psy.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get(&format!("/psychologists/{}/slots?from=soon", psy.id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booked_slot_becomes_unavailable() {
    let app = TestApp::new();
    let (_, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;
    let day = future_monday();

    let (status, body) = book(&app, &patient, &psy.id, 10).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "pending");

    let (_, body) = app
        .get(
            &format!("/psychologists/{}/slots?from={day}&to={day}", psy.id),
            None,
        )
        .await;
    let taken: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["available"] == false)
        .map(start_of)
        .collect();
    assert_eq!(taken, vec![at(day, 10)]);

    let (_, body) = app
        .get(
            &format!("/psychologists/{}/slots?from={day}&to={day}&available=true", psy.id),
            None,
        )
        .await;
    assert_eq!(body.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_booking_rules() {
    let app = TestApp::new();
    let (psy_token, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;
    let (other_patient, _) = app.register("second@mindwell.test").await;

    // Outside opening hours, off the hour, and on a weekend.
    let (status, _) = book(&app, &patient, &psy.id, 8).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(
            "/appointments",
            Some(&patient),
            json!({"psychologist_id": psy.id, "start": slot(10) + Duration::minutes(30)}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(
            "/appointments",
            Some(&patient),
            json!({"psychologist_id": psy.id, "start": slot(10) - Duration::days(1)}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only patients book, and only with psychologists.
    let (status, _) = book(&app, &psy_token, &psy.id, 10).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = book(&app, &patient, "nobody", 10).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = book(&app, &patient, &psy.id, 10).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = book(&app, &other_patient, &psy.id, 10).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already taken"));
}

#[tokio::test]
async fn test_confirm_complete_and_cancel() {
    let app = TestApp::new();
    let (psy_token, psy) = app.psychologist().await;
    let (patient, patient_user) = app.patient().await;

    let (_, body) = book(&app, &patient, &psy.id, 10).await;
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(
        app.mailer
            .sent_to(&patient_user.email, "appointment_requested")
            .len(),
        1
    );
    assert_eq!(app.mailer.sent_to(&psy.email, "appointment_received").len(), 1);

    let (status, _) = app
        .post(&format!("/appointments/{id}/confirm"), Some(&patient), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&format!("/appointments/{id}/confirm"), Some(&psy_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(
        app.mailer
            .sent_to(&patient_user.email, "appointment_confirmed")
            .len(),
        1
    );

    let (status, _) = app
        .post(&format!("/appointments/{id}/confirm"), Some(&psy_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(&format!("/appointments/{id}/complete"), Some(&psy_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("before it starts"));

    let (status, body) = app
        .post(
            &format!("/appointments/{id}/cancel"),
            Some(&patient),
            json!({"reason": "feeling better"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["cancellation"]["reason"], "feeling better");
    assert_eq!(app.mailer.sent_to(&psy.email, "appointment_cancelled").len(), 1);
    assert!(
        app.mailer
            .sent_to(&patient_user.email, "appointment_cancelled")
            .is_empty()
    );

    let (status, _) = app
        .request("POST", &format!("/appointments/{id}/cancel"), Some(&patient), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A cancelled appointment frees its slot.
    let (status, _) = book(&app, &patient, &psy.id, 10).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancel_without_body() {
    let app = TestApp::new();
    let (_, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;
    let (_, body) = book(&app, &patient, &psy.id, 11).await;
    let id = body["id"].as_str().unwrap();

    let (status, body) = app
        .request("POST", &format!("/appointments/{id}/cancel"), Some(&patient), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["cancellation"]["reason"].is_null());
}

#[tokio::test]
async fn test_visibility() {
    let app = TestApp::new();
    let (psy_token, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;
    let (stranger, _) = app.register("stranger@mindwell.test").await;
    let (admin, _) = app.admin().await;

    let (_, body) = book(&app, &patient, &psy.id, 9).await;
    let id = body["id"].as_str().unwrap().to_string();
    book(&app, &patient, &psy.id, 13).await;

    let (status, _) = app.get(&format!("/appointments/{id}"), Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/appointments/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/appointments/missing", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/appointments", Some(&stranger)).await;
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = app.get("/appointments", Some(&psy_token)).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(start_of(&list[0]) < start_of(&list[1]));

    let (_, body) = app
        .get("/appointments?status=confirmed", Some(&psy_token))
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reschedule_accept() {
    let app = TestApp::new();
    let (psy_token, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;

    let (_, body) = book(&app, &patient, &psy.id, 10).await;
    let id = body["id"].as_str().unwrap().to_string();
    app.post(&format!("/appointments/{id}/confirm"), Some(&psy_token), json!({}))
        .await;

    let (status, body) = app
        .post(
            &format!("/appointments/{id}/reschedule"),
            Some(&patient),
            json!({"proposed_start": slot(14)}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "reschedule_requested");
    assert_eq!(app.mailer.sent_to(&psy.email, "reschedule_requested").len(), 1);

    // The proposed hour is held while the request is open.
    let (other, _) = app.register("other@mindwell.test").await;
    let (status, _) = book(&app, &other, &psy.id, 14).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The requester cannot answer their own proposal.
    let (status, _) = app
        .post(
            &format!("/appointments/{id}/reschedule/accept"),
            Some(&patient),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            &format!("/appointments/{id}/reschedule/accept"),
            Some(&psy_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(start_of(&body), slot(14));
    assert!(body["reschedule"].is_null());

    // The old hour is free again.
    let (status, _) = book(&app, &other, &psy.id, 10).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reschedule_decline_restores_status() {
    let app = TestApp::new();
    let (psy_token, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;

    let (_, body) = book(&app, &patient, &psy.id, 10).await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/appointments/{id}/reschedule"),
            Some(&psy_token),
            json!({"proposed_start": slot(15)}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            &format!("/appointments/{id}/reschedule/decline"),
            Some(&patient),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(start_of(&body), slot(10));
    assert_eq!(app.mailer.sent_to(&psy.email, "reschedule_declined").len(), 1);
}

#[tokio::test]
async fn test_reschedule_into_taken_or_invalid_slot() {
    let app = TestApp::new();
    let (_, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;
    let (other, _) = app.register("other@mindwell.test").await;

    let (_, body) = book(&app, &patient, &psy.id, 10).await;
    let id = body["id"].as_str().unwrap().to_string();
    book(&app, &other, &psy.id, 12).await;

    let (status, _) = app
        .post(
            &format!("/appointments/{id}/reschedule"),
            Some(&patient),
            json!({"proposed_start": slot(12)}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post(
            &format!("/appointments/{id}/reschedule"),
            Some(&patient),
            json!({"proposed_start": slot(20)}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("proposed_start"));

    // Nothing was saved by the failed attempts.
    let (_, body) = app.get(&format!("/appointments/{id}"), Some(&patient)).await;
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_deleted_psychologist_cannot_confirm() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let (psy_token, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;

    let (_, body) = book(&app, &patient, &psy.id, 10).await;
    let id = body["id"].as_str().unwrap().to_string();
    let (status, _) = app.delete(&format!("/users/{}", psy.id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .post(&format!("/appointments/{id}/confirm"), Some(&psy_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    // The rejected request left the appointment untouched.
    let (_, body) = app.get(&format!("/appointments/{id}"), Some(&patient)).await;
    assert_eq!(body["status"], "pending");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancel_and_reschedule_end_cancelled() {
    let app = TestApp::new();
    let (psy_token, psy) = app.psychologist().await;
    let (patient, _) = app.patient().await;

    for (hour, proposed) in [(9, 13), (10, 14), (11, 15), (12, 16)] {
        let (status, body) = book(&app, &patient, &psy.id, hour).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["id"].as_str().unwrap().to_string();

        let reschedule_uri = format!("/appointments/{id}/reschedule");
        let cancel_uri = format!("/appointments/{id}/cancel");
        let reschedule = app.post(
            &reschedule_uri,
            Some(&patient),
            json!({"proposed_start": slot(proposed)}),
        );
        let cancel = app.post(&cancel_uri, Some(&psy_token), json!({"reason": "ill"}));
        let ((rescheduled, _), (cancelled, _)) = tokio::join!(reschedule, cancel);

        assert_eq!(cancelled, StatusCode::OK);
        assert!(
            rescheduled == StatusCode::OK || rescheduled == StatusCode::CONFLICT,
            "unexpected {rescheduled}"
        );
        let (_, body) = app.get(&format!("/appointments/{id}"), Some(&patient)).await;
        assert_eq!(body["status"], "cancelled");
        assert!(body["reschedule"].is_null());
    }
}
