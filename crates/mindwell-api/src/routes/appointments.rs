//! Booking and the appointment lifecycle.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use mindwell_auth::AuthenticatedUser;
use mindwell_core::schedule::validate_slot;
use mindwell_core::{Appointment, AppointmentStatus, Role, User};
use mindwell_mail::EmailTemplate;
use serde::Deserialize;

use crate::extract::{ValidJson, ValidQuery};
use crate::routes::psychologists::psychologist;
use crate::{ApiError, ApiResult, AppState, notify};

/// `/appointments*`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/appointments", get(list).post(book))
        .route("/appointments/{id}", get(get_one))
        .route("/appointments/{id}/confirm", post(confirm))
        .route("/appointments/{id}/cancel", post(cancel))
        .route("/appointments/{id}/complete", post(complete))
        .route("/appointments/{id}/reschedule", post(request_reschedule))
        .route("/appointments/{id}/reschedule/accept", post(accept_reschedule))
        .route("/appointments/{id}/reschedule/decline", post(decline_reschedule))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
struct BookRequest {
    psychologist_id: String,
    start: DateTime<Utc>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CancelRequest {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RescheduleRequest {
    proposed_start: DateTime<Utc>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<Vec<Appointment>>> {
    let actor = auth.actor();
    let mut found = state
        .appointments()
        .find(|a| a.visible_to(actor) && query.status.is_none_or(|s| a.status == s))
        .await?;
    found.sort_by_key(|a| a.start);
    Ok(Json(found))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(visible(&state, &auth, &id).await?))
}

async fn book(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidJson(req): ValidJson<BookRequest>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    if auth.role != Role::Patient {
        return Err(ApiError::forbidden("only patients can book appointments"));
    }
    let patient = state.user(&auth.user_id).await?;
    let psychologist = psychologist(&state, &req.psychologist_id).await?;
    validate_slot(&state.clinic, req.start, Utc::now())?;

    let appointment = {
        let _guard = state.locks.bookings.lock().await;
        ensure_free(&state, &psychologist.id, &patient.id, req.start, None).await?;
        let appointment = Appointment::new(&patient.id, &psychologist.id, req.start, req.notes);
        state.appointments().insert(&appointment).await?;
        appointment
    };
    tracing::info!(
        appointment_id = %appointment.id,
        patient_id = %patient.id,
        psychologist_id = %psychologist.id,
        start = %appointment.start,
        "Appointment requested"
    );

    notify::send(
        &state,
        &patient,
        EmailTemplate::AppointmentRequested {
            name: patient.name.clone(),
            psychologist: psychologist.full_name(),
            start: appointment.start,
        },
    )
    .await;
    notify::send(
        &state,
        &psychologist,
        EmailTemplate::AppointmentReceived {
            name: psychologist.name.clone(),
            patient: patient.full_name(),
            start: appointment.start,
        },
    )
    .await;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn confirm(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let psychologist = state.user(&auth.user_id).await?;
    let appointment = transition(&state, &id, |a| a.confirm(auth.actor())).await?;

    if let Some(patient) = state.users().get(&appointment.patient_id).await? {
        notify::send(
            &state,
            &patient,
            EmailTemplate::AppointmentConfirmed {
                name: patient.name.clone(),
                psychologist: psychologist.full_name(),
                start: appointment.start,
            },
        )
        .await;
    }
    Ok(Json(appointment))
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    body: Option<ValidJson<CancelRequest>>,
) -> ApiResult<Json<Appointment>> {
    let ValidJson(req) = body.unwrap_or_default();
    let canceller = state.user(&auth.user_id).await?;
    let appointment = transition(&state, &id, |a| a.cancel(auth.actor(), req.reason)).await?;

    let reason = appointment
        .cancellation
        .as_ref()
        .and_then(|c| c.reason.clone());
    for recipient in [&appointment.patient_id, &appointment.psychologist_id] {
        if *recipient == auth.user_id {
            continue;
        }
        if let Some(user) = state.users().get(recipient).await? {
            notify::send(
                &state,
                &user,
                EmailTemplate::AppointmentCancelled {
                    name: user.name.clone(),
                    cancelled_by: canceller.full_name(),
                    start: appointment.start,
                    reason: reason.clone(),
                },
            )
            .await;
        }
    }
    Ok(Json(appointment))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let appointment = transition(&state, &id, |a| a.complete(auth.actor(), Utc::now())).await?;
    Ok(Json(appointment))
}

async fn request_reschedule(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<RescheduleRequest>,
) -> ApiResult<Json<Appointment>> {
    let requester = state.user(&auth.user_id).await?;
    let guard = state.locks.bookings.lock().await;
    let mut appointment = load(&state, &id).await?;
    let current_start = appointment.start;
    appointment.request_reschedule(auth.actor(), req.proposed_start)?;
    validate_slot(&state.clinic, req.proposed_start, Utc::now()).map_err(|e| {
        ApiError::bad_request(e.message().replacen("start", "proposed_start", 1))
    })?;
    ensure_free(
        &state,
        &appointment.psychologist_id,
        &appointment.patient_id,
        req.proposed_start,
        Some(&appointment.id),
    )
    .await?;
    save(&state, &appointment).await?;
    drop(guard);

    if let Some(other) = counterpart(&state, &appointment, &auth.user_id).await? {
        notify::send(
            &state,
            &other,
            EmailTemplate::RescheduleRequested {
                name: other.name.clone(),
                requested_by: requester.full_name(),
                current_start,
                proposed_start: req.proposed_start,
            },
        )
        .await;
    }
    Ok(Json(appointment))
}

async fn accept_reschedule(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let responder = state.user(&auth.user_id).await?;
    let appointment = transition(&state, &id, |a| a.accept_reschedule(auth.actor())).await?;

    if let Some(requester) = counterpart(&state, &appointment, &auth.user_id).await? {
        notify::send(
            &state,
            &requester,
            EmailTemplate::RescheduleAccepted {
                name: requester.name.clone(),
                accepted_by: responder.full_name(),
                start: appointment.start,
            },
        )
        .await;
    }
    Ok(Json(appointment))
}

async fn decline_reschedule(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let responder = state.user(&auth.user_id).await?;
    let appointment = transition(&state, &id, |a| a.decline_reschedule(auth.actor())).await?;

    if let Some(requester) = counterpart(&state, &appointment, &auth.user_id).await? {
        notify::send(
            &state,
            &requester,
            EmailTemplate::RescheduleDeclined {
                name: requester.name.clone(),
                declined_by: responder.full_name(),
                start: appointment.start,
            },
        )
        .await;
    }
    Ok(Json(appointment))
}

/// Load, apply `change` and save while holding the bookings lock.
async fn transition<F>(state: &AppState, id: &str, change: F) -> ApiResult<Appointment>
where
    F: FnOnce(&mut Appointment) -> mindwell_core::Result<()>,
{
    let _guard = state.locks.bookings.lock().await;
    let mut appointment = load(state, id).await?;
    change(&mut appointment)?;
    save(state, &appointment).await?;
    Ok(appointment)
}

async fn load(state: &AppState, id: &str) -> ApiResult<Appointment> {
    state
        .appointments()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment"))
}

async fn visible(state: &AppState, auth: &AuthenticatedUser, id: &str) -> ApiResult<Appointment> {
    let appointment = load(state, id).await?;
    if !appointment.visible_to(auth.actor()) {
        return Err(ApiError::forbidden("not a participant of this appointment"));
    }
    Ok(appointment)
}

async fn save(state: &AppState, appointment: &Appointment) -> ApiResult<()> {
    state.replace(appointment, "Appointment").await?;
    tracing::debug!(appointment_id = %appointment.id, status = %appointment.status, "Appointment saved");
    Ok(())
}

async fn counterpart(
    state: &AppState,
    appointment: &Appointment,
    user_id: &str,
) -> ApiResult<Option<User>> {
    Ok(state
        .users()
        .get(appointment.counterpart_of(user_id))
        .await?)
}

/// 409 unless neither the psychologist nor the patient has another active
/// appointment (or pending proposal) at `start`.
async fn ensure_free(
    state: &AppState,
    psychologist_id: &str,
    patient_id: &str,
    start: DateTime<Utc>,
    except: Option<&str>,
) -> ApiResult<()> {
    let clash = state
        .appointments()
        .find_one(|a| {
            Some(a.id.as_str()) != except
                && (a.psychologist_id == psychologist_id || a.patient_id == patient_id)
                && a.blocked_starts().contains(&start)
        })
        .await?;
    match clash {
        Some(_) => Err(ApiError::conflict(format!(
            "the slot at {} is already taken",
            state.clinic.format(start)
        ))),
        None => Ok(()),
    }
}
