use std::sync::Arc;
use std::time::Duration as StdDuration;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use shared_models::appointment::{AppointmentStatus, SlotKey};
use shared_models::schedule::Slot;
use shared_store::{
    AppointmentStore, ConfirmOutcome, LockPolicy, ReminderBoundary, SlotContention,
};

fn policy() -> LockPolicy {
    LockPolicy {
        booking_hold: StdDuration::from_secs(5 * 60),
        cooldown_hold: StdDuration::from_secs(2 * 60),
        pending_expiry: StdDuration::from_secs(24 * 60 * 60),
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 6, 8, 0, 0).unwrap()
}

fn slot_key(doctor_id: Uuid) -> SlotKey {
    SlotKey {
        doctor_id,
        date: "2026-09-07".parse().unwrap(),
        slot_start: "10:00:00".parse().unwrap(),
    }
}

fn slot() -> Slot {
    Slot {
        start: "10:00:00".parse().unwrap(),
        end: "10:30:00".parse().unwrap(),
    }
}

fn active_count(store: &AppointmentStore, key: SlotKey) -> usize {
    store
        .snapshot()
        .iter()
        .filter(|a| a.slot_key() == key && a.status.is_active())
        .count()
}

#[test]
fn reserve_creates_pending_with_both_holds() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());

    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert!(appointment.booking_lock.engaged(t0()));
    assert!(appointment.cooldown_lock.engaged(t0()));
    assert_eq!(
        appointment.expires_at.unwrap(),
        t0() + Duration::hours(24)
    );
}

#[test]
fn concurrent_reserves_admit_exactly_one_winner() {
    let store = Arc::new(AppointmentStore::new());
    let key = slot_key(Uuid::new_v4());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                store.reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(winners, 1);
    assert_eq!(active_count(&store, key), 1);
    for result in results.into_iter().filter(|r| r.is_err()) {
        assert_matches!(
            result.unwrap_err(),
            SlotContention::CoolingDown | SlotContention::Locked
        );
    }
}

#[test]
fn abandoned_reservation_is_reused_after_locks_lapse() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let first_patient = Uuid::new_v4();
    let second_patient = Uuid::new_v4();

    let first = store
        .reserve(key, slot(), first_patient, &policy(), t0())
        .unwrap();

    // Inside the primary hold but past the cooldown: still locked.
    let mid = t0() + Duration::minutes(3);
    assert_matches!(
        store.reserve(key, slot(), second_patient, &policy(), mid),
        Err(SlotContention::Locked)
    );

    // Both holds lapsed: the record is rebound, not duplicated.
    let late = t0() + Duration::minutes(6);
    let reused = store
        .reserve(key, slot(), second_patient, &policy(), late)
        .unwrap();
    assert_eq!(reused.id, first.id);
    assert_eq!(reused.patient_id, second_patient);
    assert_eq!(reused.status, AppointmentStatus::Pending);
    assert_eq!(active_count(&store, key), 1);
}

#[test]
fn confirmed_booking_cannot_be_rebound() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let owner = Uuid::new_v4();

    let appointment = store.reserve(key, slot(), owner, &policy(), t0()).unwrap();
    store.confirm(appointment.id, t0()).unwrap();

    // Confirm cleared both locks; the slot must still be off the market.
    let later = t0() + Duration::minutes(10);
    assert_matches!(
        store.reserve(key, slot(), Uuid::new_v4(), &policy(), later),
        Err(SlotContention::Locked)
    );

    let record = store.get(appointment.id).unwrap();
    assert_eq!(record.status, AppointmentStatus::Confirmed);
    assert_eq!(record.patient_id, owner);
}

#[test]
fn confirm_clears_holds_and_deadline() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    let confirmed = store.confirm(appointment.id, t0()).unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
    assert!(!confirmed.booking_lock.active);
    assert!(!confirmed.cooldown_lock.active);
    assert!(confirmed.expires_at.is_none());
}

#[test]
fn confirm_past_deadline_cancels_and_reports_expired() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    let late = t0() + Duration::hours(25);
    assert_matches!(
        store.confirm(appointment.id, late),
        Err(ConfirmOutcome::Expired)
    );

    let record = store.get(appointment.id).unwrap();
    assert_eq!(record.status, AppointmentStatus::Cancelled);
    assert_eq!(active_count(&store, key), 0);
}

#[test]
fn confirm_reports_terminal_states() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    store.confirm(appointment.id, t0()).unwrap();
    assert_matches!(
        store.confirm(appointment.id, t0()),
        Err(ConfirmOutcome::AlreadyConfirmed)
    );

    store.cancel(appointment.id, t0(), None).unwrap();
    assert_matches!(
        store.confirm(appointment.id, t0()),
        Err(ConfirmOutcome::AlreadyCancelled)
    );
    assert_matches!(
        store.confirm(Uuid::new_v4(), t0()),
        Err(ConfirmOutcome::NotFound)
    );
}

#[test]
fn cancel_with_cooldown_blocks_immediate_rebooking() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();
    store.confirm(appointment.id, t0()).unwrap();

    let cancel_time = t0() + Duration::minutes(10);
    let cancelled = store
        .cancel(appointment.id, cancel_time, Some(StdDuration::from_secs(120)))
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert!(cancelled.cooldown_lock.engaged(cancel_time));

    // Within the cooldown the freed slot stays off the market.
    assert_matches!(
        store.reserve(key, slot(), Uuid::new_v4(), &policy(), cancel_time),
        Err(SlotContention::CoolingDown)
    );

    // After the cooldown a fresh reservation takes the slot.
    let later = cancel_time + Duration::minutes(3);
    let fresh = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), later)
        .unwrap();
    assert_ne!(fresh.id, appointment.id);
    assert_eq!(active_count(&store, key), 1);
}

#[test]
fn cancel_without_cooldown_frees_the_slot_at_once() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    let cancel_time = t0() + Duration::minutes(10);
    store.cancel(appointment.id, cancel_time, None).unwrap();

    assert!(store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), cancel_time)
        .is_ok());
}

#[test]
fn release_expired_lock_cancels_unconfirmed_reservation() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    // Lock still engaged: nothing to release.
    assert!(store.release_expired_lock(appointment.id, t0()).is_none());

    let late = t0() + Duration::minutes(6);
    let released = store.release_expired_lock(appointment.id, late).unwrap();
    assert_eq!(released.status, AppointmentStatus::Cancelled);
    assert!(!released.booking_lock.active);
    assert_eq!(active_count(&store, key), 0);
}

#[test]
fn cancel_expired_pending_ignores_live_records() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    assert!(store.cancel_expired_pending(appointment.id, t0()).is_none());

    let late = t0() + Duration::hours(25);
    let cancelled = store.cancel_expired_pending(appointment.id, late).unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    // Re-running on the now-cancelled record is a no-op.
    assert!(store.cancel_expired_pending(appointment.id, late).is_none());
}

#[test]
fn reminder_flags_set_once_on_confirmed_records() {
    let store = AppointmentStore::new();
    let key = slot_key(Uuid::new_v4());
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    // Pending records never take reminder flags.
    assert!(store
        .mark_reminder_sent(appointment.id, ReminderBoundary::Hours24, t0())
        .is_none());

    store.confirm(appointment.id, t0()).unwrap();
    let stamp = t0() + Duration::minutes(5);
    let updated = store
        .mark_reminder_sent(appointment.id, ReminderBoundary::Hours24, stamp)
        .unwrap();
    assert!(updated.reminder_24h_sent);
    assert!(!updated.reminder_2h_sent);
    assert_eq!(updated.updated_at, stamp);

    assert!(store
        .mark_reminder_sent(appointment.id, ReminderBoundary::Hours24, stamp)
        .is_none());
    assert!(store
        .mark_reminder_sent(appointment.id, ReminderBoundary::Hours2, stamp)
        .is_some());
}

#[test]
fn unavailable_starts_cover_active_and_cooling_slots() {
    let store = AppointmentStore::new();
    let doctor_id = Uuid::new_v4();
    let key = slot_key(doctor_id);
    let appointment = store
        .reserve(key, slot(), Uuid::new_v4(), &policy(), t0())
        .unwrap();

    let starts = store.unavailable_slot_starts(doctor_id, key.date, t0());
    assert_eq!(starts, vec![slot().start]);

    // Cancelled with a live cooldown: still unavailable.
    let cancel_time = t0() + Duration::minutes(10);
    store
        .cancel(appointment.id, cancel_time, Some(StdDuration::from_secs(120)))
        .unwrap();
    let starts = store.unavailable_slot_starts(doctor_id, key.date, cancel_time);
    assert_eq!(starts, vec![slot().start]);

    // Cooldown lapsed: the slot is back.
    let later = cancel_time + Duration::minutes(3);
    assert!(store
        .unavailable_slot_starts(doctor_id, key.date, later)
        .is_empty());
}
