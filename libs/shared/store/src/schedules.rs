use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use shared_models::schedule::{AvailabilityWindow, DayOfWeek, WindowRule};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleStoreError {
    #[error("Availability already exists for this day")]
    DuplicateRule,
}

/// Availability windows per doctor. One window per (doctor, date) and per
/// (doctor, weekday); duplicates are rejected under the same write guard that
/// inserts, so concurrent creates cannot both land.
#[derive(Default)]
pub struct ScheduleStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    windows: HashMap<Uuid, AvailabilityWindow>,
    by_rule: HashMap<(Uuid, WindowRule), Uuid>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, window: AvailabilityWindow) -> Result<AvailabilityWindow, ScheduleStoreError> {
        let mut inner = self.inner.write().expect("schedule store poisoned");

        let rule_key = (window.doctor_id, window.rule);
        if inner.by_rule.contains_key(&rule_key) {
            return Err(ScheduleStoreError::DuplicateRule);
        }

        inner.by_rule.insert(rule_key, window.id);
        inner.windows.insert(window.id, window.clone());
        debug!("Stored availability window {} for doctor {}", window.id, window.doctor_id);
        Ok(window)
    }

    pub fn remove(&self, id: Uuid) -> Option<AvailabilityWindow> {
        let mut inner = self.inner.write().expect("schedule store poisoned");
        let window = inner.windows.remove(&id)?;
        inner.by_rule.remove(&(window.doctor_id, window.rule));
        Some(window)
    }

    pub fn get(&self, id: Uuid) -> Option<AvailabilityWindow> {
        self.inner
            .read()
            .expect("schedule store poisoned")
            .windows
            .get(&id)
            .cloned()
    }

    pub fn for_doctor(&self, doctor_id: Uuid) -> Vec<AvailabilityWindow> {
        let mut list: Vec<_> = self
            .inner
            .read()
            .expect("schedule store poisoned")
            .windows
            .values()
            .filter(|w| w.doctor_id == doctor_id)
            .cloned()
            .collect();
        list.sort_by_key(|w| (w.start_time, w.created_at));
        list
    }

    pub fn override_for(&self, doctor_id: Uuid, date: NaiveDate) -> Option<AvailabilityWindow> {
        self.lookup(doctor_id, WindowRule::Date(date))
    }

    pub fn recurring_for(&self, doctor_id: Uuid, day: DayOfWeek) -> Option<AvailabilityWindow> {
        self.lookup(doctor_id, WindowRule::Recurring(day))
    }

    fn lookup(&self, doctor_id: Uuid, rule: WindowRule) -> Option<AvailabilityWindow> {
        let inner = self.inner.read().expect("schedule store poisoned");
        let id = inner.by_rule.get(&(doctor_id, rule))?;
        inner.windows.get(id).cloned()
    }
}
