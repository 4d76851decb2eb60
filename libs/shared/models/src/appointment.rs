use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::schedule::Slot;

/// Identity of a bookable slot: one doctor, one calendar date, one start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether this record still occupies its slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        match self {
            AppointmentStatus::Pending => matches!(
                next,
                AppointmentStatus::Confirmed | AppointmentStatus::Cancelled
            ),
            AppointmentStatus::Confirmed => matches!(next, AppointmentStatus::Cancelled),
            AppointmentStatus::Cancelled => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A time-boxed soft hold on a slot. Expiry is lazy: an expired lock stays
/// `active` until something observes it and clears it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SlotLock {
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SlotLock {
    /// Lock is active and its expiry has not yet passed.
    pub fn engaged(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map(|at| at > now).unwrap_or(false)
    }

    /// Lock is still flagged active but its expiry has passed.
    pub fn lapsed(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.engaged(now)
    }

    pub fn hold(&mut self, now: DateTime<Utc>, duration: Duration) {
        self.active = true;
        self.expires_at = Some(now + chrono::Duration::from_std(duration).unwrap_or_default());
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.expires_at = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slot: Slot,
    pub status: AppointmentStatus,
    /// Primary exclusivity hold, engaged while a reservation awaits confirmation.
    pub booking_lock: SlotLock,
    /// Secondary hold throttling immediate re-contention for the slot.
    pub cooldown_lock: SlotLock,
    /// Hard deadline past which an unconfirmed booking is void.
    pub expires_at: Option<DateTime<Utc>>,
    pub reminder_24h_sent: bool,
    pub reminder_2h_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            doctor_id: self.doctor_id,
            date: self.date,
            slot_start: self.slot.start,
        }
    }

    /// Scheduled start as an absolute instant (slots are stored in UTC wall time).
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.slot.start).and_utc()
    }

    /// Past the hard expiry deadline.
    pub fn past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at < now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_transitions_are_one_way() {
        use AppointmentStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn lock_expiry_is_lazy() {
        let t0 = Utc.with_ymd_and_hms(2026, 9, 6, 8, 0, 0).unwrap();
        let mut lock = SlotLock::default();
        assert!(!lock.engaged(t0));
        assert!(!lock.lapsed(t0));

        lock.hold(t0, Duration::from_secs(300));
        assert!(lock.engaged(t0));
        assert!(!lock.lapsed(t0));

        // Past expiry the lock stays flagged active until cleared.
        let later = t0 + chrono::Duration::minutes(6);
        assert!(!lock.engaged(later));
        assert!(lock.lapsed(later));
        assert!(lock.active);

        lock.clear();
        assert!(!lock.lapsed(later));
        assert!(lock.expires_at.is_none());
    }
}
