use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::BookAppointmentRequest;
use crate::services::lifecycle::LifecycleService;
use crate::services::reservation::ReservationService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = ReservationService::book(&state, &user, request, Utc::now())?;
    Ok(Json(json!({
        "success": true,
        "message": "Slot reserved, awaiting confirmation",
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = LifecycleService::confirm(&state, &user, appointment_id, Utc::now())?;
    Ok(Json(json!({
        "success": true,
        "message": "Appointment confirmed",
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = LifecycleService::cancel(&state, &user, appointment_id, Utc::now())?;
    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "appointment": appointment,
    })))
}

/// The caller's own bookings, ordered by date and slot start.
#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.appointments.list_for_patient(user.id);
    Ok(Json(json!({ "success": true, "appointments": appointments })))
}

/// Every booking on record. Staff only.
#[axum::debug_handler]
pub async fn list_all_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    if !user.role.is_staff() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    let appointments = state.appointments.list_all();
    Ok(Json(json!({ "success": true, "appointments": appointments })))
}
