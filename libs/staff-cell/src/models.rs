use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A clinic staff account. Any role can be assigned as the responsible
/// party for an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: StaffRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StaffRole {
    Admin,
    Doctor,
    Nurse,
    Receptionist,
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Admin => write!(f, "Admin"),
            StaffRole::Doctor => write!(f, "Doctor"),
            StaffRole::Nurse => write!(f, "Nurse"),
            StaffRole::Receptionist => write!(f, "Receptionist"),
        }
    }
}

/// Staff record as returned to API clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub role: StaffRole,
    pub is_active: bool,
}

impl From<StaffUser> for StaffUserResponse {
    fn from(user: StaffUser) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            username: user.username,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStaffUserRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: StaffRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStaffUserRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub role: StaffRole,
    pub is_active: bool,
    /// Resets the password only when provided.
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum StaffError {
    #[error("Staff user not found")]
    NotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
