//! Audit logging middleware for writes to clinical records

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::request_id::RequestId;

/// FHIR resource type addressed by a `/fhir/{type}[/{id}]` path
fn resource_type(path: &str) -> Option<&str> {
    let mut segments = path.trim_start_matches('/').split('/');
    match (segments.next(), segments.next()) {
        (Some("fhir"), Some(resource_type)) if !resource_type.is_empty() => Some(resource_type),
        _ => None,
    }
}

/// Middleware to log record writes (POST, PUT) for audit purposes
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    if matches!(method, Method::POST | Method::PUT) {
        let status = response.status().as_u16();

        tracing::info!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %uri,
            resource_type = resource_type(&uri).unwrap_or("-"),
            status = %status,
            "Clinical record write"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_from_path() {
        assert_eq!(resource_type("/fhir/Condition"), Some("Condition"));
        assert_eq!(resource_type("/fhir/Patient/12"), Some("Patient"));
        assert_eq!(resource_type("/metadata"), None);
        assert_eq!(resource_type("/fhir/"), None);
    }
}
