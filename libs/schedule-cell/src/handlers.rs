use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{CreateWindowRequest, SlotsQuery};
use crate::services::resolver::AvailabilityResolver;
use crate::services::schedule::ScheduleService;
use crate::services::slots;

#[axum::debug_handler]
pub async fn create_window(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let window = ScheduleService::add_window(&state.schedules, &user, request)?;
    Ok(Json(json!({
        "success": true,
        "message": "Availability window created",
        "window": window,
    })))
}

#[axum::debug_handler]
pub async fn list_windows(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let windows = ScheduleService::list_windows(&state.schedules, doctor_id);
    Ok(Json(json!({
        "success": true,
        "doctor_id": doctor_id,
        "windows": windows,
    })))
}

#[axum::debug_handler]
pub async fn delete_window(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(window_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let window = ScheduleService::remove_window(&state.schedules, &user, window_id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Availability window removed",
        "window_id": window.id,
    })))
}

/// Open slots for a doctor on a date. Slots come from the window in effect
/// for that date; starts held by an active appointment or a live lock are
/// filtered out.
#[axum::debug_handler]
pub async fn list_open_slots(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let now = Utc::now();

    let Some(window) = AvailabilityResolver::resolve(&state.schedules, query.doctor_id, query.date)
    else {
        return Ok(Json(json!({
            "success": true,
            "doctor_id": query.doctor_id,
            "date": query.date,
            "slots": [],
        })));
    };

    let taken = state
        .appointments
        .unavailable_slot_starts(query.doctor_id, query.date, now);
    let open: Vec<_> = slots::generate(&window)
        .into_iter()
        .filter(|s| !taken.contains(&s.start))
        .collect();

    Ok(Json(json!({
        "success": true,
        "doctor_id": query.doctor_id,
        "date": query.date,
        "slots": open,
    })))
}
