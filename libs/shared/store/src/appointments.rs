use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::appointment::{Appointment, AppointmentStatus, SlotKey};
use shared_models::schedule::Slot;

/// Hold durations applied when a reservation succeeds.
#[derive(Debug, Clone, Copy)]
pub struct LockPolicy {
    pub booking_hold: Duration,
    pub cooldown_hold: Duration,
    pub pending_expiry: Duration,
}

impl LockPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            booking_hold: config.booking_lock,
            cooldown_hold: config.cooldown_lock,
            pending_expiry: config.pending_expiry,
        }
    }
}

/// Why a reservation attempt lost the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotContention {
    /// The slot's cooldown lock is still engaged.
    CoolingDown,
    /// Another reservation holds the primary lock.
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    NotFound,
    AlreadyConfirmed,
    AlreadyCancelled,
    /// The hard deadline had passed; the record was cancelled instead.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderBoundary {
    Hours24,
    Hours2,
}

/// The appointment book. All mutations run inside a single write-guard
/// critical section, so the reservation decision and every status transition
/// behave as one conditional write against current lock/status state.
///
/// Invariant maintained here and nowhere else: for any (doctor, date, slot)
/// at most one appointment has status pending or confirmed.
#[derive(Default)]
pub struct AppointmentStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, Appointment>,
    /// The single pending/confirmed record per slot, if any.
    active_by_slot: HashMap<SlotKey, Uuid>,
    /// Last cancelled record per slot whose cooldown lock may still bite.
    cooldown_by_slot: HashMap<SlotKey, Uuid>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to reserve a slot for a patient, as one atomic decision:
    /// consult the existing record (lazily expiring its cooldown lock),
    /// reject on a confirmed occupant or engaged locks, otherwise reuse or
    /// create the record, bind the requester, and engage both holds.
    pub fn reserve(
        &self,
        key: SlotKey,
        slot: Slot,
        patient_id: Uuid,
        policy: &LockPolicy,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SlotContention> {
        let mut inner = self.inner.write().expect("appointment store poisoned");

        if let Some(&active_id) = inner.active_by_slot.get(&key) {
            let record = inner
                .records
                .get_mut(&active_id)
                .expect("active index points at missing record");

            // A confirmed booking owns its slot outright; its cleared locks
            // must not read as an abandoned reservation.
            if record.status == AppointmentStatus::Confirmed {
                return Err(SlotContention::Locked);
            }

            if record.cooldown_lock.lapsed(now) {
                record.cooldown_lock.clear();
                record.updated_at = now;
            }
            if record.cooldown_lock.engaged(now) {
                return Err(SlotContention::CoolingDown);
            }
            if record.booking_lock.engaged(now) {
                return Err(SlotContention::Locked);
            }

            // Locks on a pending record have lapsed: the reservation is
            // abandoned and this record becomes the new reservation target.
            record.patient_id = patient_id;
            record.status = AppointmentStatus::Pending;
            record.booking_lock.hold(now, policy.booking_hold);
            record.cooldown_lock.hold(now, policy.cooldown_hold);
            record.expires_at =
                Some(now + chrono::Duration::from_std(policy.pending_expiry).unwrap_or_default());
            record.reminder_24h_sent = false;
            record.reminder_2h_sent = false;
            record.updated_at = now;

            debug!("Reusing appointment {} for slot {:?}", record.id, key);
            return Ok(record.clone());
        }

        // No active record, but a recent cancellation may still hold the slot
        // under its cooldown lock.
        if let Some(&cooled_id) = inner.cooldown_by_slot.get(&key) {
            let cooling = inner
                .records
                .get(&cooled_id)
                .map(|r| r.cooldown_lock.engaged(now))
                .unwrap_or(false);
            if cooling {
                return Err(SlotContention::CoolingDown);
            }
            if let Some(record) = inner.records.get_mut(&cooled_id) {
                record.cooldown_lock.clear();
                record.updated_at = now;
            }
            inner.cooldown_by_slot.remove(&key);
        }

        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: key.doctor_id,
            date: key.date,
            slot,
            status: AppointmentStatus::Pending,
            booking_lock: Default::default(),
            cooldown_lock: Default::default(),
            expires_at: Some(
                now + chrono::Duration::from_std(policy.pending_expiry).unwrap_or_default(),
            ),
            reminder_24h_sent: false,
            reminder_2h_sent: false,
            created_at: now,
            updated_at: now,
        };
        appointment.booking_lock.hold(now, policy.booking_hold);
        appointment.cooldown_lock.hold(now, policy.cooldown_hold);

        inner.active_by_slot.insert(key, appointment.id);
        inner.records.insert(appointment.id, appointment.clone());

        debug!("Created appointment {} for slot {:?}", appointment.id, key);
        Ok(appointment)
    }

    /// Conditional pending→confirmed transition. If the hard deadline has
    /// passed the record is cancelled in place instead and `Expired` reported;
    /// confirm never succeeds past the deadline.
    pub fn confirm(&self, id: Uuid, now: DateTime<Utc>) -> Result<Appointment, ConfirmOutcome> {
        let mut inner = self.inner.write().expect("appointment store poisoned");

        let Some(record) = inner.records.get(&id).cloned() else {
            return Err(ConfirmOutcome::NotFound);
        };

        match record.status {
            AppointmentStatus::Cancelled => Err(ConfirmOutcome::AlreadyCancelled),
            AppointmentStatus::Confirmed => Err(ConfirmOutcome::AlreadyConfirmed),
            AppointmentStatus::Pending if record.past_deadline(now) => {
                Self::cancel_locked(&mut inner, id, now, None);
                Err(ConfirmOutcome::Expired)
            }
            AppointmentStatus::Pending => {
                let record = inner.records.get_mut(&id).expect("checked above");
                record.status = AppointmentStatus::Confirmed;
                record.booking_lock.clear();
                record.cooldown_lock.clear();
                record.expires_at = None;
                record.updated_at = now;
                Ok(record.clone())
            }
        }
    }

    /// Transition to cancelled, clearing the primary lock. When `cooldown` is
    /// set the cooldown lock is re-engaged so the freed slot cannot be snapped
    /// up immediately. Cancelling an already-cancelled record is a no-op.
    pub fn cancel(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        cooldown: Option<Duration>,
    ) -> Option<Appointment> {
        let mut inner = self.inner.write().expect("appointment store poisoned");
        inner.records.get(&id)?;
        Some(Self::cancel_locked(&mut inner, id, now, cooldown))
    }

    /// Sweep primitive: if the primary lock has lapsed, release it, and cancel
    /// the record if the reservation was never confirmed. Returns the updated
    /// record, or None when there was nothing to do.
    pub fn release_expired_lock(&self, id: Uuid, now: DateTime<Utc>) -> Option<Appointment> {
        let mut inner = self.inner.write().expect("appointment store poisoned");

        let record = inner.records.get(&id)?;
        if !record.booking_lock.lapsed(now) {
            return None;
        }

        if record.status == AppointmentStatus::Pending {
            Some(Self::cancel_locked(&mut inner, id, now, None))
        } else {
            let record = inner.records.get_mut(&id).expect("checked above");
            record.booking_lock.clear();
            record.updated_at = now;
            Some(record.clone())
        }
    }

    /// Sweep primitive: cancel a pending record past its hard deadline.
    pub fn cancel_expired_pending(&self, id: Uuid, now: DateTime<Utc>) -> Option<Appointment> {
        let mut inner = self.inner.write().expect("appointment store poisoned");

        let record = inner.records.get(&id)?;
        if record.status != AppointmentStatus::Pending || !record.past_deadline(now) {
            return None;
        }
        Some(Self::cancel_locked(&mut inner, id, now, None))
    }

    /// Set a reminder flag exactly once on a confirmed appointment. Returns
    /// None when the flag is already set or the record no longer qualifies,
    /// making repeated sweeps no-ops.
    pub fn mark_reminder_sent(
        &self,
        id: Uuid,
        boundary: ReminderBoundary,
        now: DateTime<Utc>,
    ) -> Option<Appointment> {
        let mut inner = self.inner.write().expect("appointment store poisoned");

        let record = inner.records.get_mut(&id)?;
        if record.status != AppointmentStatus::Confirmed {
            return None;
        }
        let flag = match boundary {
            ReminderBoundary::Hours24 => &mut record.reminder_24h_sent,
            ReminderBoundary::Hours2 => &mut record.reminder_2h_sent,
        };
        if *flag {
            return None;
        }
        *flag = true;
        record.updated_at = now;
        Some(record.clone())
    }

    pub fn get(&self, id: Uuid) -> Option<Appointment> {
        self.inner
            .read()
            .expect("appointment store poisoned")
            .records
            .get(&id)
            .cloned()
    }

    pub fn snapshot(&self) -> Vec<Appointment> {
        self.inner
            .read()
            .expect("appointment store poisoned")
            .records
            .values()
            .cloned()
            .collect()
    }

    pub fn list_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        let mut list: Vec<_> = self
            .inner
            .read()
            .expect("appointment store poisoned")
            .records
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        list.sort_by_key(|a| (a.date, a.slot.start));
        list
    }

    pub fn list_all(&self) -> Vec<Appointment> {
        let mut list = self.snapshot();
        list.sort_by_key(|a| (a.date, a.slot.start));
        list
    }

    /// Slot starts a requester cannot currently take on this doctor's day:
    /// every active reservation, plus cancelled slots still cooling down.
    pub fn unavailable_slot_starts(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Vec<NaiveTime> {
        self.inner
            .read()
            .expect("appointment store poisoned")
            .records
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date)
            .filter(|a| a.status.is_active() || a.cooldown_lock.engaged(now))
            .map(|a| a.slot.start)
            .collect()
    }

    /// Must be called with the write guard held. Clears the primary lock,
    /// moves the record to cancelled, and fixes up both slot indexes.
    fn cancel_locked(
        inner: &mut Inner,
        id: Uuid,
        now: DateTime<Utc>,
        cooldown: Option<Duration>,
    ) -> Appointment {
        let record = inner.records.get_mut(&id).expect("caller checked presence");
        let key = record.slot_key();
        let was_active = record.status.is_active();

        record.status = AppointmentStatus::Cancelled;
        record.booking_lock.clear();
        match cooldown {
            Some(hold) => record.cooldown_lock.hold(now, hold),
            None => record.cooldown_lock.clear(),
        }
        record.updated_at = now;
        let snapshot = record.clone();

        if was_active {
            inner.active_by_slot.remove(&key);
        }
        if snapshot.cooldown_lock.active {
            inner.cooldown_by_slot.insert(key, id);
        } else if inner.cooldown_by_slot.get(&key) == Some(&id) {
            inner.cooldown_by_slot.remove(&key);
        }

        snapshot
    }
}
