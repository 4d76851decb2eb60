use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

/// Reserve a slot. The slot start must land exactly on a boundary generated
/// from the doctor's availability window for that date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("Doctor has no availability on this date")]
    NoAvailability,

    #[error("Requested slot does not match the doctor's schedule")]
    SlotMismatch,

    #[error("Cannot book a slot in the past")]
    PastSlot,

    #[error("Slot was recently released and is cooling down")]
    CoolingDown,

    #[error("Slot is held by another booking")]
    SlotLocked,

    #[error("Appointment not found")]
    NotFound,

    #[error("Access denied")]
    Forbidden,

    #[error("Appointment is already confirmed")]
    AlreadyConfirmed,

    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    #[error("Appointment expired before confirmation")]
    Expired,
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::NotFound => AppError::NotFound(message),
            BookingError::NoAvailability
            | BookingError::SlotMismatch
            | BookingError::PastSlot => AppError::ValidationError(message),
            BookingError::CoolingDown
            | BookingError::SlotLocked
            | BookingError::AlreadyConfirmed
            | BookingError::AlreadyCancelled => AppError::Conflict(message),
            BookingError::Forbidden => AppError::Forbidden(message),
            BookingError::Expired => AppError::Expired(message),
        }
    }
}
