use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shared_models::appointment::{Appointment, AppointmentStatus};
use shared_store::{AppState, ReminderBoundary};

/// Delivery target for appointment reminders. The sweeper only decides WHEN a
/// reminder is due; delivery lives behind this trait.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn remind(&self, appointment: &Appointment, boundary: ReminderBoundary);
}

/// Default notifier: writes the reminder to the log.
pub struct LogNotifier;

#[async_trait]
impl ReminderNotifier for LogNotifier {
    async fn remind(&self, appointment: &Appointment, boundary: ReminderBoundary) {
        let horizon = match boundary {
            ReminderBoundary::Hours24 => "24h",
            ReminderBoundary::Hours2 => "2h",
        };
        info!(
            "Reminder ({}) for appointment {} starting {} {}",
            horizon, appointment.id, appointment.date, appointment.slot.start
        );
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub locks_released: usize,
    pub pending_cancelled: usize,
    pub reminders_sent: usize,
}

impl SweepReport {
    pub fn is_quiet(&self) -> bool {
        *self == Self::default()
    }
}

/// Background reconciliation. Each pass walks a snapshot of the appointment
/// book and applies three idempotent sweeps: lapsed primary locks, pending
/// records past their hard deadline, and due reminders. Every per-record
/// action re-checks state inside the store, so a pass racing with live
/// booking traffic or with another pass settles on a no-op.
pub struct SweeperService {
    state: Arc<AppState>,
    notifier: Arc<dyn ReminderNotifier>,
}

impl SweeperService {
    pub fn new(state: Arc<AppState>, notifier: Arc<dyn ReminderNotifier>) -> Self {
        Self { state, notifier }
    }

    /// Start the periodic task. The returned handle owns the loop; dropping
    /// or aborting it stops reconciliation with the process.
    pub fn spawn(self) -> JoinHandle<()> {
        let interval = self.state.config.sweep_interval;
        info!("Reconciliation sweeper running every {:?}", interval);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let report = self.run_sweep(Utc::now()).await;
                if !report.is_quiet() {
                    info!(
                        "Sweep pass: {} locks released, {} pending cancelled, {} reminders",
                        report.locks_released, report.pending_cancelled, report.reminders_sent
                    );
                }
            }
        })
    }

    pub async fn run_sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        for appointment in self.state.appointments.snapshot() {
            match appointment.status {
                AppointmentStatus::Pending => {
                    if appointment.booking_lock.lapsed(now) {
                        if let Some(updated) =
                            self.state.appointments.release_expired_lock(appointment.id, now)
                        {
                            debug!("Released lapsed lock on appointment {}", updated.id);
                            report.locks_released += 1;
                            continue;
                        }
                    }
                    if appointment.past_deadline(now) {
                        if let Some(updated) =
                            self.state.appointments.cancel_expired_pending(appointment.id, now)
                        {
                            warn!("Pending appointment {} expired unconfirmed", updated.id);
                            report.pending_cancelled += 1;
                        }
                    }
                }
                AppointmentStatus::Confirmed => {
                    if let Some(boundary) = due_reminder(&appointment, now) {
                        // Flag first; a reminder is best-effort and must not
                        // fire twice for the same boundary.
                        if self
                            .state
                            .appointments
                            .mark_reminder_sent(appointment.id, boundary, now)
                            .is_some()
                        {
                            self.notifier.remind(&appointment, boundary).await;
                            report.reminders_sent += 1;
                        }
                    }
                }
                AppointmentStatus::Cancelled => {}
            }
        }

        report
    }
}

/// A reminder is due when the time to the slot start has just crossed a
/// boundary: inside (23h, 24h] for the day-before reminder, inside (1h, 2h]
/// for the last-call reminder, and only while its flag is unset.
fn due_reminder(appointment: &Appointment, now: DateTime<Utc>) -> Option<ReminderBoundary> {
    let until_start = appointment.starts_at() - now;

    if !appointment.reminder_24h_sent
        && until_start > Duration::hours(23)
        && until_start <= Duration::hours(24)
    {
        return Some(ReminderBoundary::Hours24);
    }
    if !appointment.reminder_2h_sent
        && until_start > Duration::hours(1)
        && until_start <= Duration::hours(2)
    {
        return Some(ReminderBoundary::Hours2);
    }
    None
}
