// libs/patient-cell/tests/patient_service_test.rs
use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{CreatePatientNoteRequest, CreatePatientRequest, PatientError};
use patient_cell::services::PatientService;
use shared_utils::test_utils::TestConfig;

fn stored_patient(id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "first_name": "John",
        "last_name": "Doe",
        "date_of_birth": "1985-03-14",
        "phone": "555-0100",
        "email": "john.doe@example.com",
        "address": null,
        "created_at": "2025-06-01T00:00:00Z",
        "updated_at": "2025-06-01T00:00:00Z"
    })
}

async fn service_against(mock_server: &MockServer) -> PatientService {
    let config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    PatientService::new(&config)
}

#[tokio::test]
async fn blank_name_is_rejected_before_store_access() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server).await;
    let request = CreatePatientRequest {
        first_name: "  ".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
        phone: None,
        email: None,
        address: None,
    };

    let result = service.create_patient(request, "test-token").await;
    assert_matches!(result, Err(PatientError::ValidationError(_)));
}

#[tokio::test]
async fn create_returns_stored_record() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![stored_patient(patient_id)]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server).await;
    let request = CreatePatientRequest {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
        phone: Some("555-0100".to_string()),
        email: Some("john.doe@example.com".to_string()),
        address: None,
    };

    let patient = service
        .create_patient(request, "test-token")
        .await
        .expect("valid patient should be created");

    assert_eq!(patient.id, patient_id);
    assert_eq!(patient.full_name(), "John Doe");
}

#[tokio::test]
async fn note_for_missing_patient_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patient_notes"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server).await;
    let request = CreatePatientNoteRequest {
        text: "BP normal".to_string(),
        appointment_id: None,
    };

    let result = service
        .add_note(Uuid::new_v4(), Uuid::new_v4(), request, "test-token")
        .await;

    assert_matches!(result, Err(PatientError::NotFound));
}

#[tokio::test]
async fn note_carries_the_authenticated_author() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![stored_patient(patient_id)]))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patient_notes"))
        .and(wiremock::matchers::body_partial_json(json!({
            "patient_id": patient_id,
            "author_user_id": author_id
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![json!({
            "id": Uuid::new_v4(),
            "patient_id": patient_id,
            "author_user_id": author_id,
            "appointment_id": null,
            "text": "BP normal",
            "created_at": "2025-06-20T10:00:00Z"
        })]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_against(&mock_server).await;
    let request = CreatePatientNoteRequest {
        text: "BP normal".to_string(),
        appointment_id: None,
    };

    let note = service
        .add_note(patient_id, author_id, request, "test-token")
        .await
        .expect("note on existing patient should be created");

    assert_eq!(note.author_user_id, author_id);
}
