use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<CallerRole>,
    pub iat: Option<u64>,
}

/// Closed set of roles the system recognises. Authorization decisions match
/// on this exhaustively; there is no free-form role string anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    #[serde(alias = "user")]
    Patient,
    Doctor,
    Nurse,
    Admin,
}

impl CallerRole {
    /// Staff may confirm bookings and see the full appointment book.
    pub fn is_staff(&self) -> bool {
        match self {
            CallerRole::Doctor | CallerRole::Nurse | CallerRole::Admin => true,
            CallerRole::Patient => false,
        }
    }
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerRole::Patient => write!(f, "patient"),
            CallerRole::Doctor => write!(f, "doctor"),
            CallerRole::Nurse => write!(f, "nurse"),
            CallerRole::Admin => write!(f, "admin"),
        }
    }
}

/// Caller identity resolved from a pre-validated credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: CallerRole,
    pub created_at: Option<DateTime<Utc>>,
}
