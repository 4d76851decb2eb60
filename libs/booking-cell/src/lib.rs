pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::lifecycle::LifecycleService;
pub use services::reservation::ReservationService;
pub use services::sweeper::{LogNotifier, ReminderNotifier, SweepReport, SweeperService};
