// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookAppointmentRequest, UpdateAppointmentRequest};
use crate::services::booking::AppointmentBookingService;

fn map_error(error: AppointmentError) -> AppError {
    match &error {
        AppointmentError::StaffConflict => AppError::Conflict(error.to_string()),
        AppointmentError::NotFound => AppError::NotFound(error.to_string()),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg.clone()),
        _ if error.is_window_violation() => AppError::ValidationError(error.to_string()),
        _ => AppError::Internal(error.to_string()),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} booking appointment", user.id);
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .create_appointment(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} updating appointment {}", user.id, appointment_id);
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .update_appointment(appointment_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} cancelling appointment {}", user.id, appointment_id);
    let service = AppointmentBookingService::new(&config);

    let appointment = service
        .cancel_appointment(appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_staff_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(staff_user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointments = service
        .fetch_staff_appointments(staff_user_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);

    let appointments = service
        .fetch_patient_appointments(patient_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
