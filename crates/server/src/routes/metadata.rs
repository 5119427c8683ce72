//! Metadata endpoint handler

use axum::Json;
use ehr_fhir_core::CapabilityStatement;

/// GET /metadata - Return the STU3 capability statement
pub async fn get() -> Json<CapabilityStatement> {
    Json(CapabilityStatement::new())
}
