//! Handlers for list-backed resources
//! (Condition, AllergyIntolerance, MedicationAdministration, Procedure)

use axum::{
    Json,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use ehr_fhir_core::ListResource;
use ehr_fhir_core::mapping::inbound::strip_patient_prefix;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{parse_body, parse_id, parse_query};
use crate::controllers::ListController;
use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for list searches; `patient` wins over `pid`
#[derive(Debug, Deserialize, Default)]
pub struct ListSearchParams {
    pub patient: Option<String>,
    pub pid: Option<String>,
}

impl ListSearchParams {
    fn pid(&self) -> Option<String> {
        self.patient
            .as_deref()
            .or(self.pid.as_deref())
            .filter(|value| !value.is_empty())
            .map(strip_patient_prefix)
    }
}

/// POST /fhir/{type}
pub async fn create<R: ListResource>(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Response, AppError> {
    let resource: R = parse_body(payload, R::RESOURCE_TYPE)?;
    let saved = ListController::<R>::new(state.lists).post(&resource).await?;

    Ok(saved.respond(R::RESOURCE_TYPE))
}

/// PUT /fhir/{type}/{id}
pub async fn update<R: ListResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<R>, AppError> {
    let id = parse_id(R::RESOURCE_TYPE, &id)?;
    let resource: R = parse_body(payload, R::RESOURCE_TYPE)?;
    let updated = ListController::<R>::new(state.lists).put(id, &resource).await?;

    Ok(Json(updated))
}

/// GET /fhir/{type}/{id}
pub async fn read<R: ListResource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, AppError> {
    let id = parse_id(R::RESOURCE_TYPE, &id)?;
    let resource = ListController::<R>::new(state.lists).get_one(id).await?;

    Ok(Json(resource))
}

/// GET /fhir/{type}?patient=
pub async fn search<R: ListResource>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListSearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = parse_query(query)?;
    let (resource_url, self_url) = state.request_urls(&uri);
    let pid = params.pid();

    let bundle = ListController::<R>::new(state.lists)
        .get_all(pid.as_deref(), &resource_url, &self_url)
        .await?;

    Ok(Json(bundle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pid_prefers_patient() {
        let params = ListSearchParams {
            patient: Some("Patient/7".to_string()),
            pid: Some("3".to_string()),
        };
        assert_eq!(params.pid().as_deref(), Some("7"));

        let params = ListSearchParams {
            patient: None,
            pid: Some("3".to_string()),
        };
        assert_eq!(params.pid().as_deref(), Some("3"));

        assert_eq!(ListSearchParams::default().pid(), None);
    }
}
