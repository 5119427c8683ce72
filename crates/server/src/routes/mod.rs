pub mod health;
pub mod list;
pub mod metadata;
pub mod metrics;
pub mod patient;

use axum::{
    Json, Router,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::get,
};
use ehr_fhir_core::{
    AllergyIntolerance, Condition, ListResource, MedicationAdministration, Procedure,
    parse_resource,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::state::AppState;

/// Build FHIR routes
pub fn fhir_routes() -> Router<AppState> {
    Router::new()
        .route("/Patient", get(patient::search).post(patient::create))
        .route("/Patient/{id}", get(patient::read).put(patient::update))
        .merge(list_routes::<Condition>())
        .merge(list_routes::<AllergyIntolerance>())
        .merge(list_routes::<MedicationAdministration>())
        .merge(list_routes::<Procedure>())
}

/// Type and instance routes for a list-backed resource
fn list_routes<R: ListResource>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{}", R::RESOURCE_TYPE),
            get(list::search::<R>).post(list::create::<R>),
        )
        .route(
            &format!("/{}/{{id}}", R::RESOURCE_TYPE),
            get(list::read::<R>).put(list::update::<R>),
        )
}

/// Decode a request body into the expected resource type
fn parse_body<R: DeserializeOwned>(
    payload: Result<Json<JsonValue>, JsonRejection>,
    expected: &'static str,
) -> Result<R, AppError> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(parse_resource(body, expected)?)
}

/// Query strings that do not fit the search parameters are a client error
fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    let Query(params) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(params)
}

/// Path ids are numeric; anything else cannot name a stored record
fn parse_id(resource_type: &str, raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{}/{} not found", resource_type, raw)))
}
