//! Resource controllers
//!
//! A controller turns one FHIR interaction into calls on the record
//! services: map the payload, validate, dedupe, write, then re-fetch so the
//! client always sees what the EHR actually stored.

mod list;
mod patient;

pub use list::ListController;
pub use patient::PatientController;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Result of a create interaction
pub struct Saved<R> {
    pub id: i64,
    pub resource: R,
    /// False when an identical record already existed
    pub created: bool,
}

impl<R: Serialize> Saved<R> {
    /// 201 with `Location` for a new record, 200 for an existing one
    pub fn respond(self, resource_type: &str) -> Response {
        if !self.created {
            return (StatusCode::OK, Json(self.resource)).into_response();
        }

        let mut headers = HeaderMap::new();
        if let Ok(location) = format!("/fhir/{}/{}", resource_type, self.id).parse() {
            headers.insert(header::LOCATION, location);
        }
        (StatusCode::CREATED, headers, Json(self.resource)).into_response()
    }
}
