use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::schedule::DayOfWeek;

/// Add an availability window. Exactly one of `date` (override) and `day`
/// (recurring) must be set. Doctors add windows for themselves; only an admin
/// may pass another doctor's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWindowRequest {
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub day: Option<DayOfWeek>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Exactly one of date and day must be set")]
    AmbiguousRule,

    #[error("startTime must be before endTime")]
    InvalidTimeRange,

    #[error("Invalid slotDuration")]
    InvalidSlotDuration,

    #[error("doctorId is required")]
    MissingDoctor,

    #[error("Availability already exists for this day")]
    Duplicate,

    #[error("Availability window not found")]
    NotFound,

    #[error("Access denied")]
    Forbidden,
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        let message = err.to_string();
        match err {
            ScheduleError::AmbiguousRule
            | ScheduleError::InvalidTimeRange
            | ScheduleError::InvalidSlotDuration
            | ScheduleError::MissingDoctor => AppError::ValidationError(message),
            ScheduleError::Duplicate => AppError::Conflict(message),
            ScheduleError::NotFound => AppError::NotFound(message),
            ScheduleError::Forbidden => AppError::Forbidden(message),
        }
    }
}
