use shared_config::AppConfig;

use crate::appointments::AppointmentStore;
use crate::schedules::ScheduleStore;

/// Shared application state handed to every cell router.
pub struct AppState {
    pub config: AppConfig,
    pub schedules: ScheduleStore,
    pub appointments: AppointmentStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            schedules: ScheduleStore::new(),
            appointments: AppointmentStore::new(),
        }
    }
}
