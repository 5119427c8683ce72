//! ehr-fhir-core: FHIR STU3 types and EHR record mapping
//!
//! This crate holds the simplified STU3 resources the bridge exchanges
//! (Patient, Condition, AllergyIntolerance, MedicationAdministration,
//! Procedure), Bundle and OperationOutcome, the EHR's flat records, the
//! validation rules applied to them, and the mappers in both directions.

pub mod bundle;
pub mod capability;
pub mod datatypes;
pub mod error;
pub mod mapping;
pub mod outcome;
pub mod record;
pub mod resources;
pub mod validation;

pub use bundle::{Bundle, BundleEntry, BundleLink, BundleType};
pub use capability::CapabilityStatement;
pub use error::FhirError;
pub use mapping::{ListResource, parse_resource};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use record::{
    ListId, ListRecord, ListType, PatientId, PatientRecord, PatientSearch, StoredList,
    StoredPatient,
};
pub use resources::{AllergyIntolerance, Condition, MedicationAdministration, Patient, Procedure};
pub use validation::{ValidationFailure, ValidationResult, validate_list, validate_patient};
