use chrono::{DateTime, Utc};
use tracing::info;

use schedule_cell::services::resolver::AvailabilityResolver;
use schedule_cell::services::slots;
use shared_models::appointment::{Appointment, SlotKey};
use shared_models::auth::{AuthUser, CallerRole};
use shared_store::{AppState, LockPolicy, SlotContention};

use crate::models::{BookAppointmentRequest, BookingError};

/// Slot reservation: validate the request against the doctor's published
/// schedule, then take the slot through the store's atomic reserve.
#[derive(Clone)]
pub struct ReservationService;

impl ReservationService {
    pub fn book(
        state: &AppState,
        user: &AuthUser,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, BookingError> {
        if user.role != CallerRole::Patient {
            return Err(BookingError::Forbidden);
        }

        let window =
            AvailabilityResolver::resolve(&state.schedules, request.doctor_id, request.date)
                .ok_or(BookingError::NoAvailability)?;

        let slot = slots::slot_for_start(&window, request.slot_start)
            .ok_or(BookingError::SlotMismatch)?;

        let starts_at = request.date.and_time(slot.start).and_utc();
        if starts_at <= now {
            return Err(BookingError::PastSlot);
        }

        let key = SlotKey {
            doctor_id: request.doctor_id,
            date: request.date,
            slot_start: slot.start,
        };
        let policy = LockPolicy::from_config(&state.config);

        let appointment = state
            .appointments
            .reserve(key, slot, user.id, &policy, now)
            .map_err(|e| match e {
                SlotContention::CoolingDown => BookingError::CoolingDown,
                SlotContention::Locked => BookingError::SlotLocked,
            })?;

        info!(
            "Patient {} reserved slot {} {} with doctor {}",
            user.id, request.date, slot.start, request.doctor_id
        );
        Ok(appointment)
    }
}
