// libs/appointment-cell/src/services/booking.rs
use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::conflict::has_conflict;
use crate::services::rules::validate_business_window;

/// Orchestrates create/update: window rules first (no data access), then
/// conflict detection against the assignee's calendar, then persistence.
/// The store is the serialization boundary for concurrent bookings; the
/// decision itself is deterministic over the snapshot it reads.
pub struct AppointmentBookingService {
    store: Arc<StoreClient>,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(StoreClient::new(config)),
        }
    }

    pub async fn create_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with staff member {}",
            request.patient_id, request.staff_user_id
        );

        validate_business_window(request.starts_at, request.duration_minutes, request.is_utc)?;

        let existing = self
            .fetch_staff_appointments(request.staff_user_id, auth_token)
            .await?;

        let candidate_end = request.starts_at + Duration::minutes(request.duration_minutes as i64);
        if has_conflict(
            request.staff_user_id,
            request.starts_at,
            candidate_end,
            &existing,
            None,
        ) {
            warn!(
                "Booking conflict for staff member {} at {}",
                request.staff_user_id, request.starts_at
            );
            return Err(AppointmentError::StaffConflict);
        }

        let status = request.status.unwrap_or(AppointmentStatus::Scheduled);
        let now = Utc::now();

        let appointment_data = json!({
            "patient_id": request.patient_id,
            "staff_user_id": request.staff_user_id,
            "starts_at": request.starts_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "duration_minutes": request.duration_minutes,
            "reason": request.reason,
            "status": status.to_string(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .insert_returning("/rest/v1/appointments", appointment_data, auth_token)
            .await?;

        let appointment: Appointment = serde_json::from_value(result)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!("Updating appointment {}", appointment_id);

        // The appointment must exist before any rule is evaluated, so a
        // missing id is reported as NotFound rather than a rule rejection.
        let current = self.get_appointment(appointment_id, auth_token).await?;

        validate_business_window(request.starts_at, request.duration_minutes, request.is_utc)?;

        // Conflict-checking always runs against the new assignee's calendar,
        // excluding this appointment's own identity.
        let existing = self
            .fetch_staff_appointments(request.staff_user_id, auth_token)
            .await?;

        let candidate_end = request.starts_at + Duration::minutes(request.duration_minutes as i64);
        if has_conflict(
            request.staff_user_id,
            request.starts_at,
            candidate_end,
            &existing,
            Some(appointment_id),
        ) {
            warn!(
                "Update conflict for staff member {} at {}",
                request.staff_user_id, request.starts_at
            );
            return Err(AppointmentError::StaffConflict);
        }

        let status = request.status.unwrap_or(current.status);

        let update_data = json!({
            "patient_id": request.patient_id,
            "staff_user_id": request.staff_user_id,
            "starts_at": request.starts_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "duration_minutes": request.duration_minutes,
            "reason": request.reason,
            "status": status.to_string(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result = self
            .patch_returning(&path, update_data, auth_token)
            .await?;

        let appointment: Appointment = serde_json::from_value(result)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} updated", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let first = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(first)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    /// All appointments currently assigned to a staff member, the snapshot
    /// the conflict detector compares against.
    pub async fn fetch_staff_appointments(
        &self,
        staff_user_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?staff_user_id=eq.{}&order=starts_at.asc",
            staff_user_id
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    pub async fn fetch_patient_appointments(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=starts_at.asc",
            patient_id
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    /// Soft-cancel: status flip only, no window re-validation. The slot is
    /// still held against the calendar until the record is removed upstream.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!("Cancelling appointment {}", appointment_id);

        // 404 before write, same as update.
        self.get_appointment(appointment_id, auth_token).await?;

        let update_data = json!({
            "status": AppointmentStatus::Cancelled.to_string(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result = self
            .patch_returning(&path, update_data, auth_token)
            .await?;

        serde_json::from_value(result)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn insert_returning(
        &self,
        path: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Value, AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(Method::POST, path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Store returned no row".to_string()))
    }

    async fn patch_returning(
        &self,
        path: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Value, AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(Method::PATCH, path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(AppointmentError::NotFound)
    }
}
