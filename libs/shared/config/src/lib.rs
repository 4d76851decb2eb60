use std::env;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub port: u16,
    /// Primary exclusivity hold placed on a slot when a reservation is made.
    pub booking_lock: Duration,
    /// Secondary hold throttling re-contention right after a booking attempt
    /// or a cancellation.
    pub cooldown_lock: Duration,
    /// Absolute deadline after which an unconfirmed booking is void.
    pub pending_expiry: Duration,
    /// How often the reconciliation sweeper runs.
    pub sweep_interval: Duration,
    /// Whether cancelling an appointment re-engages the cooldown lock.
    pub cooldown_on_cancel: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("CAREBOOK_JWT_SECRET").unwrap_or_else(|_| {
                warn!("CAREBOOK_JWT_SECRET not set, using empty value");
                String::new()
            }),
            port: env_u64("CAREBOOK_PORT", 3000) as u16,
            booking_lock: Duration::from_secs(env_u64("BOOKING_LOCK_SECS", 5 * 60)),
            cooldown_lock: Duration::from_secs(env_u64("COOLDOWN_LOCK_SECS", 2 * 60)),
            pending_expiry: Duration::from_secs(env_u64("PENDING_EXPIRY_SECS", 24 * 60 * 60)),
            sweep_interval: Duration::from_secs(env_u64("SWEEP_INTERVAL_SECS", 60)),
            cooldown_on_cancel: env_bool("COOLDOWN_ON_CANCEL", true),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid integer, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid boolean, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}
