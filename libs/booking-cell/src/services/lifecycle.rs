use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_models::auth::{AuthUser, CallerRole};
use shared_store::{AppState, ConfirmOutcome};

use crate::models::BookingError;

/// Status transitions after reservation: confirm and cancel, with role and
/// ownership checks applied before the store's conditional update runs.
#[derive(Clone)]
pub struct LifecycleService;

impl LifecycleService {
    /// Pending to confirmed. Staff only; a doctor may confirm only their own
    /// appointments. Past the hard deadline the record is cancelled instead
    /// and the caller told the booking expired.
    pub fn confirm(
        state: &AppState,
        user: &AuthUser,
        appointment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        if !user.role.is_staff() {
            return Err(BookingError::Forbidden);
        }

        let record = state
            .appointments
            .get(appointment_id)
            .ok_or(BookingError::NotFound)?;
        if user.role == CallerRole::Doctor && record.doctor_id != user.id {
            return Err(BookingError::Forbidden);
        }

        let appointment = state
            .appointments
            .confirm(appointment_id, now)
            .map_err(|outcome| match outcome {
                ConfirmOutcome::NotFound => BookingError::NotFound,
                ConfirmOutcome::AlreadyConfirmed => BookingError::AlreadyConfirmed,
                ConfirmOutcome::AlreadyCancelled => BookingError::AlreadyCancelled,
                ConfirmOutcome::Expired => BookingError::Expired,
            })?;

        info!("Appointment {} confirmed by {}", appointment_id, user.id);
        Ok(appointment)
    }

    /// Transition to cancelled. Patients cancel their own records; doctors
    /// theirs; nurses and admins anyone's. Cancelling an already-cancelled
    /// record changes nothing. Whether a fresh cooldown hold follows the
    /// cancellation is a policy knob.
    pub fn cancel(
        state: &AppState,
        user: &AuthUser,
        appointment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        let record = state
            .appointments
            .get(appointment_id)
            .ok_or(BookingError::NotFound)?;

        let allowed = match user.role {
            CallerRole::Patient => record.patient_id == user.id,
            CallerRole::Doctor => record.doctor_id == user.id,
            CallerRole::Nurse | CallerRole::Admin => true,
        };
        if !allowed {
            return Err(BookingError::Forbidden);
        }

        if record.status == AppointmentStatus::Cancelled {
            return Ok(record);
        }

        let cooldown = state
            .config
            .cooldown_on_cancel
            .then_some(state.config.cooldown_lock);
        let appointment = state
            .appointments
            .cancel(appointment_id, now, cooldown)
            .ok_or(BookingError::NotFound)?;

        info!("Appointment {} cancelled by {}", appointment_id, user.id);
        Ok(appointment)
    }
}
