use thiserror::Error;

/// Errors raised while reading a client-supplied FHIR resource
#[derive(Debug, Error)]
pub enum FhirError {
    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    #[error("Missing required field: resourceType")]
    MissingResourceType,

    #[error("Expected resourceType '{expected}', got '{found}'")]
    WrongResourceType {
        expected: &'static str,
        found: String,
    },

    #[error("Invalid resource: {0}")]
    Invalid(#[from] serde_json::Error),
}
