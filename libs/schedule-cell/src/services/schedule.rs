use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_models::auth::{AuthUser, CallerRole};
use shared_models::schedule::{AvailabilityWindow, WindowRule};
use shared_store::{ScheduleStore, ScheduleStoreError};

use crate::models::{CreateWindowRequest, ScheduleError};

/// Availability window management. Doctors manage their own schedules and
/// admins may manage anyone's.
#[derive(Clone)]
pub struct ScheduleService;

impl ScheduleService {
    pub fn add_window(
        store: &ScheduleStore,
        user: &AuthUser,
        request: CreateWindowRequest,
    ) -> Result<AvailabilityWindow, ScheduleError> {
        let doctor_id = Self::resolve_doctor(user, request.doctor_id)?;

        let rule = match (request.date, request.day) {
            (Some(date), None) => WindowRule::Date(date),
            (None, Some(day)) => WindowRule::Recurring(day),
            _ => return Err(ScheduleError::AmbiguousRule),
        };

        if request.start_time >= request.end_time {
            return Err(ScheduleError::InvalidTimeRange);
        }
        if request.slot_duration_minutes <= 0 {
            return Err(ScheduleError::InvalidSlotDuration);
        }

        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id,
            rule,
            start_time: request.start_time,
            end_time: request.end_time,
            slot_duration_minutes: request.slot_duration_minutes,
            created_at: Utc::now(),
        };

        let window = store.insert(window).map_err(|e| match e {
            ScheduleStoreError::DuplicateRule => ScheduleError::Duplicate,
        })?;

        info!("Doctor {} availability window {} created", doctor_id, window.id);
        Ok(window)
    }

    pub fn remove_window(
        store: &ScheduleStore,
        user: &AuthUser,
        window_id: Uuid,
    ) -> Result<AvailabilityWindow, ScheduleError> {
        let window = store.get(window_id).ok_or(ScheduleError::NotFound)?;

        if user.role != CallerRole::Admin && window.doctor_id != user.id {
            return Err(ScheduleError::Forbidden);
        }

        store.remove(window_id).ok_or(ScheduleError::NotFound)
    }

    pub fn list_windows(store: &ScheduleStore, doctor_id: Uuid) -> Vec<AvailabilityWindow> {
        store.for_doctor(doctor_id)
    }

    /// A doctor always acts on their own schedule; an explicit target id is
    /// honored only for admins.
    fn resolve_doctor(user: &AuthUser, requested: Option<Uuid>) -> Result<Uuid, ScheduleError> {
        match user.role {
            CallerRole::Doctor => match requested {
                Some(id) if id != user.id => Err(ScheduleError::Forbidden),
                _ => Ok(user.id),
            },
            CallerRole::Admin => requested.ok_or(ScheduleError::MissingDoctor),
            _ => Err(ScheduleError::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::schedule::DayOfWeek;

    fn doctor_user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: Some("doc@example.com".into()),
            role: CallerRole::Doctor,
            created_at: None,
        }
    }

    fn recurring_request(day: DayOfWeek) -> CreateWindowRequest {
        CreateWindowRequest {
            doctor_id: None,
            date: None,
            day: Some(day),
            start_time: "09:00:00".parse().unwrap(),
            end_time: "17:00:00".parse().unwrap(),
            slot_duration_minutes: 30,
        }
    }

    #[test]
    fn doctor_creates_own_window() {
        let store = ScheduleStore::new();
        let user = doctor_user();

        let window =
            ScheduleService::add_window(&store, &user, recurring_request(DayOfWeek::Monday))
                .unwrap();
        assert_eq!(window.doctor_id, user.id);
    }

    #[test]
    fn doctor_cannot_create_for_another_doctor() {
        let store = ScheduleStore::new();
        let user = doctor_user();
        let mut request = recurring_request(DayOfWeek::Monday);
        request.doctor_id = Some(Uuid::new_v4());

        let err = ScheduleService::add_window(&store, &user, request).unwrap_err();
        assert_eq!(err, ScheduleError::Forbidden);
    }

    #[test]
    fn patient_cannot_create_windows() {
        let store = ScheduleStore::new();
        let user = AuthUser {
            role: CallerRole::Patient,
            ..doctor_user()
        };

        let err = ScheduleService::add_window(&store, &user, recurring_request(DayOfWeek::Monday))
            .unwrap_err();
        assert_eq!(err, ScheduleError::Forbidden);
    }

    #[test]
    fn rejects_rule_with_both_date_and_day() {
        let store = ScheduleStore::new();
        let user = doctor_user();
        let mut request = recurring_request(DayOfWeek::Monday);
        request.date = Some("2026-09-07".parse().unwrap());

        let err = ScheduleService::add_window(&store, &user, request).unwrap_err();
        assert_eq!(err, ScheduleError::AmbiguousRule);
    }

    #[test]
    fn rejects_inverted_time_range() {
        let store = ScheduleStore::new();
        let user = doctor_user();
        let mut request = recurring_request(DayOfWeek::Monday);
        request.start_time = "18:00:00".parse().unwrap();

        let err = ScheduleService::add_window(&store, &user, request).unwrap_err();
        assert_eq!(err, ScheduleError::InvalidTimeRange);
    }

    #[test]
    fn rejects_duplicate_rule_for_same_day() {
        let store = ScheduleStore::new();
        let user = doctor_user();

        ScheduleService::add_window(&store, &user, recurring_request(DayOfWeek::Monday)).unwrap();
        let err = ScheduleService::add_window(&store, &user, recurring_request(DayOfWeek::Monday))
            .unwrap_err();
        assert_eq!(err, ScheduleError::Duplicate);
    }

    #[test]
    fn only_owner_or_admin_removes_window() {
        let store = ScheduleStore::new();
        let owner = doctor_user();
        let other = doctor_user();

        let window =
            ScheduleService::add_window(&store, &owner, recurring_request(DayOfWeek::Friday))
                .unwrap();

        let err = ScheduleService::remove_window(&store, &other, window.id).unwrap_err();
        assert_eq!(err, ScheduleError::Forbidden);

        let admin = AuthUser {
            role: CallerRole::Admin,
            ..doctor_user()
        };
        ScheduleService::remove_window(&store, &admin, window.id).unwrap();
        assert!(store.get(window.id).is_none());
    }
}
