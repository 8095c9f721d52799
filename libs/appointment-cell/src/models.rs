// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A scheduled visit. `starts_at` is a civil wall-clock value: clinic-local
/// unless the submitting request carried `is_utc = true`, in which case the
/// value is stored as given and only normalized for rule evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub staff_user_id: Uuid,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// End of the appointment's half-open interval `[starts_at, ends_at)`.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at + Duration::minutes(self.duration_minutes as i64)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
            AppointmentStatus::NoShow => write!(f, "NoShow"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub staff_user_id: Uuid,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
    /// When true, `starts_at` is a UTC instant and is converted to clinic
    /// local time before rule evaluation. When false it is already local.
    #[serde(default)]
    pub is_utc: bool,
}

/// Full replacement of an appointment's schedulable fields. The whole window
/// is re-validated against the new values, and conflict checking runs against
/// the new assignee's calendar with this appointment's own id excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Uuid,
    pub staff_user_id: Uuid,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub is_utc: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Rule violations are recoverable values. Their `Display` strings are the
/// fixed reasons surfaced verbatim to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("duration out of bounds")]
    DurationOutOfBounds,

    #[error("closed on weekends")]
    ClosedOnWeekends,

    #[error("outside clinic hours")]
    OutsideClinicHours,

    #[error("time conflict for this staff member")]
    StaffConflict,

    #[error("Appointment not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    /// True for window-rule rejections that map to a 400 validation error.
    pub fn is_window_violation(&self) -> bool {
        matches!(
            self,
            AppointmentError::DurationOutOfBounds
                | AppointmentError::ClosedOnWeekends
                | AppointmentError::OutsideClinicHours
        )
    }
}
