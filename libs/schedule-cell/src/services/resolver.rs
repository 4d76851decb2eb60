use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use shared_models::schedule::{AvailabilityWindow, DayOfWeek};
use shared_store::ScheduleStore;

/// Resolves the availability window in effect for a doctor on a given date.
/// A date-specific override always wins over the recurring weekday rule.
#[derive(Clone)]
pub struct AvailabilityResolver;

impl AvailabilityResolver {
    pub fn resolve(
        store: &ScheduleStore,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Option<AvailabilityWindow> {
        if let Some(window) = store.override_for(doctor_id, date) {
            debug!(%doctor_id, %date, "date override in effect");
            return Some(window);
        }
        store.recurring_for(doctor_id, DayOfWeek::of(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_models::schedule::WindowRule;

    fn insert_window(store: &ScheduleStore, doctor_id: Uuid, rule: WindowRule, start: &str) {
        store
            .insert(AvailabilityWindow {
                id: Uuid::new_v4(),
                doctor_id,
                rule,
                start_time: start.parse().unwrap(),
                end_time: "17:00:00".parse().unwrap(),
                slot_duration_minutes: 30,
                created_at: Utc::now(),
            })
            .unwrap();
    }

    #[test]
    fn override_beats_recurring_rule() {
        let store = ScheduleStore::new();
        let doctor = Uuid::new_v4();
        // 2026-09-07 is a Monday.
        let date: NaiveDate = "2026-09-07".parse().unwrap();
        insert_window(&store, doctor, WindowRule::Recurring(DayOfWeek::Monday), "09:00:00");
        insert_window(&store, doctor, WindowRule::Date(date), "13:00:00");

        let window = AvailabilityResolver::resolve(&store, doctor, date).unwrap();
        assert_eq!(window.start_time.to_string(), "13:00:00");
    }

    #[test]
    fn falls_back_to_recurring_rule() {
        let store = ScheduleStore::new();
        let doctor = Uuid::new_v4();
        insert_window(&store, doctor, WindowRule::Recurring(DayOfWeek::Monday), "09:00:00");

        let date: NaiveDate = "2026-09-07".parse().unwrap();
        let window = AvailabilityResolver::resolve(&store, doctor, date).unwrap();
        assert_eq!(window.start_time.to_string(), "09:00:00");
    }

    #[test]
    fn no_window_for_uncovered_day() {
        let store = ScheduleStore::new();
        let doctor = Uuid::new_v4();
        insert_window(&store, doctor, WindowRule::Recurring(DayOfWeek::Monday), "09:00:00");

        // A Tuesday.
        let date: NaiveDate = "2026-09-08".parse().unwrap();
        assert!(AvailabilityResolver::resolve(&store, doctor, date).is_none());
    }
}
