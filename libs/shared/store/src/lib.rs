pub mod appointments;
pub mod schedules;
pub mod state;

pub use appointments::{
    AppointmentStore, ConfirmOutcome, LockPolicy, ReminderBoundary, SlotContention,
};
pub use schedules::{ScheduleStore, ScheduleStoreError};
pub use state::AppState;
