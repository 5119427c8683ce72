//! Application error handling
//!
//! Every failure leaves the server as an OperationOutcome.

use std::error::Error;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ehr_fhir_core::mapping::outbound;
use ehr_fhir_core::{FhirError, OperationOutcome};

use crate::db::StoreError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Record failed validation; carries the `validationfail` outcome
    Validation(OperationOutcome),
    /// Failure without an underlying error value
    Internal(String),
    /// Caught error from a collaborator
    Exception(Box<dyn Error + Send + Sync>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, OperationOutcome::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, OperationOutcome::invalid(&msg)),
            AppError::Validation(outcome) => (StatusCode::BAD_REQUEST, outcome),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    outbound::outcome_from_general_error(&msg),
                )
            }
            AppError::Exception(err) => {
                tracing::error!(error = ?err, "Request failed with exception");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    outbound::outcome_from_error(err.as_ref()),
                )
            }
        };

        (status, Json(outcome)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Exception(Box::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Exception(Box::new(err))
    }
}

impl From<FhirError> for AppError {
    fn from(err: FhirError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
