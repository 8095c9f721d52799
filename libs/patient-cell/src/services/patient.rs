use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{
    CreatePatientNoteRequest, CreatePatientRequest, Patient, PatientError, PatientNote,
    UpdatePatientRequest,
};

pub struct PatientService {
    store: StoreClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn list_patients(&self, auth_token: &str) -> Result<Vec<Patient>, PatientError> {
        debug!("Listing patients");

        let result: Vec<Value> = self
            .store
            .request(
                Method::GET,
                "/rest/v1/patients?order=last_name.asc",
                Some(auth_token),
                None,
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Patient>, _>>()
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patients: {}", e)))
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient record for {} {}", request.first_name, request.last_name);

        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(PatientError::ValidationError(
                "First and last name are required".to_string(),
            ));
        }

        let now = Utc::now();
        let patient_data = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "date_of_birth": request.date_of_birth.format("%Y-%m-%d").to_string(),
            "phone": request.phone,
            "email": request.email,
            "address": request.address,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(auth_token),
                Some(patient_data),
                Some(headers),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::DatabaseError("Store returned no row".to_string()))?;

        let patient: Patient = serde_json::from_value(created)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))?;

        debug!("Patient record created with ID: {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Fetching patient record: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let first = result.into_iter().next().ok_or(PatientError::NotFound)?;

        serde_json::from_value(first)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient record: {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(first_name) = request.first_name {
            update_data.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = request.last_name {
            update_data.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(date_of_birth) = request.date_of_birth {
            update_data.insert(
                "date_of_birth".to_string(),
                json!(date_of_birth.format("%Y-%m-%d").to_string()),
            );
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(PatientError::NotFound)?;

        serde_json::from_value(updated)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }

    // ==============================================================================
    // PATIENT NOTES
    // ==============================================================================

    pub async fn add_note(
        &self,
        patient_id: Uuid,
        author_user_id: Uuid,
        request: CreatePatientNoteRequest,
        auth_token: &str,
    ) -> Result<PatientNote, PatientError> {
        debug!("Adding note for patient {} by user {}", patient_id, author_user_id);

        if request.text.trim().is_empty() {
            return Err(PatientError::ValidationError("Note text is required".to_string()));
        }

        // Notes only attach to existing patients.
        self.get_patient(patient_id, auth_token).await?;

        let note_data = json!({
            "patient_id": patient_id,
            "author_user_id": author_user_id,
            "appointment_id": request.appointment_id,
            "text": request.text,
            "created_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::POST,
                "/rest/v1/patient_notes",
                Some(auth_token),
                Some(note_data),
                Some(headers),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let created = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::DatabaseError("Store returned no row".to_string()))?;

        serde_json::from_value(created)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse note: {}", e)))
    }

    pub async fn list_notes(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<PatientNote>, PatientError> {
        debug!("Listing notes for patient {}", patient_id);

        let path = format!(
            "/rest/v1/patient_notes?patient_id=eq.{}&order=created_at.desc",
            patient_id
        );
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<PatientNote>, _>>()
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse notes: {}", e)))
    }
}
