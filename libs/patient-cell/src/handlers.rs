use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{CreatePatientNoteRequest, CreatePatientRequest, PatientError, UpdatePatientRequest};
use crate::services::PatientService;

fn map_error(error: PatientError) -> AppError {
    match error {
        PatientError::NotFound => AppError::NotFound(error.to_string()),
        PatientError::ValidationError(msg) => AppError::ValidationError(msg),
        PatientError::DatabaseError(ref msg) => AppError::Database(msg.clone()),
    }
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patients = service
        .list_patients(auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .create_patient(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .get_patient(patient_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service
        .update_patient(patient_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn add_patient_note(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<CreatePatientNoteRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    // The authenticated staff user is the note's author.
    let note = service
        .add_note(patient_id, user.id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(note)))
}

#[axum::debug_handler]
pub async fn list_patient_notes(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let notes = service
        .list_notes(patient_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "notes": notes,
        "total": notes.len()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_passes_through_unprefixed() {
        let mapped = map_error(PatientError::ValidationError(
            "First and last name are required".to_string(),
        ));

        assert!(matches!(
            mapped,
            AppError::ValidationError(ref msg) if msg == "First and last name are required"
        ));
    }
}
