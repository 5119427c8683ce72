//! Patient resource HTTP handlers

use axum::{
    Json,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use ehr_fhir_core::{Patient, PatientSearch};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{parse_body, parse_id, parse_query};
use crate::controllers::PatientController;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for patient search
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub name: Option<String>,
    pub birthdate: Option<String>,
}

impl From<SearchParams> for PatientSearch {
    fn from(params: SearchParams) -> Self {
        PatientSearch {
            name: params.name,
            dob: params.birthdate,
        }
    }
}

/// POST /fhir/Patient - Create a new patient
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Response, AppError> {
    let patient: Patient = parse_body(payload, "Patient")?;
    let saved = PatientController::new(state.patients).post(&patient).await?;

    Ok(saved.respond("Patient"))
}

/// GET /fhir/Patient/{id} - Read a patient
pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let pid = parse_id("Patient", &id)?;
    let patient = PatientController::new(state.patients).get_one(pid).await?;

    Ok(Json(patient))
}

/// PUT /fhir/Patient/{id} - Update a patient
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<Patient>, AppError> {
    let pid = parse_id("Patient", &id)?;
    let patient: Patient = parse_body(payload, "Patient")?;
    let updated = PatientController::new(state.patients)
        .put(pid, &patient)
        .await?;

    Ok(Json(updated))
}

/// GET /fhir/Patient - Search patients by name and birthdate
pub async fn search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = parse_query(query)?;
    let (resource_url, self_url) = state.request_urls(&uri);
    let search = PatientSearch::from(params);

    let bundle = PatientController::new(state.patients)
        .get_all(&search, &resource_url, &self_url)
        .await?;

    Ok(Json(bundle))
}
