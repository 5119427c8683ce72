//! Bidirectional mapping between FHIR resources and EHR records

pub mod inbound;
pub mod outbound;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::FhirError;
use crate::record::{ListId, ListRecord, ListType};
use crate::resources::{AllergyIntolerance, Condition, MedicationAdministration, Procedure};

/// Deserialize a client payload after checking its `resourceType`
pub fn parse_resource<R: DeserializeOwned>(
    body: JsonValue,
    expected: &'static str,
) -> Result<R, FhirError> {
    let found = body
        .get("resourceType")
        .and_then(|v| v.as_str())
        .map(str::to_owned);

    match found {
        Some(found) if found == expected => Ok(serde_json::from_value(body)?),
        Some(found) => Err(FhirError::WrongResourceType { expected, found }),
        None => Err(FhirError::MissingResourceType),
    }
}

/// A FHIR resource stored by the EHR as a clinical list item
pub trait ListResource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const RESOURCE_TYPE: &'static str;
    const LIST_TYPE: ListType;

    fn resource_id(&self) -> Option<&str>;

    fn to_list_record(&self) -> Result<ListRecord, FhirError>;

    fn from_list_record(id: ListId, record: &ListRecord) -> Self;

    /// Resource type in lowerCamelCase, as used in error messages
    fn label() -> String {
        let mut chars = Self::RESOURCE_TYPE.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl ListResource for Condition {
    const RESOURCE_TYPE: &'static str = "Condition";
    const LIST_TYPE: ListType = ListType::MedicalProblem;

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_list_record(&self) -> Result<ListRecord, FhirError> {
        inbound::condition_record(self)
    }

    fn from_list_record(id: ListId, record: &ListRecord) -> Self {
        outbound::condition_resource(id, record)
    }
}

impl ListResource for AllergyIntolerance {
    const RESOURCE_TYPE: &'static str = "AllergyIntolerance";
    const LIST_TYPE: ListType = ListType::Allergy;

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_list_record(&self) -> Result<ListRecord, FhirError> {
        inbound::allergy_intolerance_record(self)
    }

    fn from_list_record(id: ListId, record: &ListRecord) -> Self {
        outbound::allergy_intolerance_resource(id, record)
    }
}

impl ListResource for MedicationAdministration {
    const RESOURCE_TYPE: &'static str = "MedicationAdministration";
    const LIST_TYPE: ListType = ListType::Medication;

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_list_record(&self) -> Result<ListRecord, FhirError> {
        inbound::medication_administration_record(self)
    }

    fn from_list_record(id: ListId, record: &ListRecord) -> Self {
        outbound::medication_administration_resource(id, record)
    }
}

impl ListResource for Procedure {
    const RESOURCE_TYPE: &'static str = "Procedure";
    const LIST_TYPE: ListType = ListType::Surgery;

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_list_record(&self) -> Result<ListRecord, FhirError> {
        inbound::procedure_record(self)
    }

    fn from_list_record(id: ListId, record: &ListRecord) -> Self {
        outbound::procedure_resource(id, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Patient;
    use serde_json::json;

    #[test]
    fn test_labels() {
        assert_eq!(Condition::label(), "condition");
        assert_eq!(AllergyIntolerance::label(), "allergyIntolerance");
        assert_eq!(MedicationAdministration::label(), "medicationAdministration");
        assert_eq!(Procedure::label(), "procedure");
    }

    #[test]
    fn test_parse_resource_checks_type() {
        let patient: Patient =
            parse_resource(json!({"resourceType": "Patient", "gender": "male"}), "Patient")
                .unwrap();
        assert_eq!(patient.gender.as_deref(), Some("male"));

        let wrong = parse_resource::<Patient>(json!({"resourceType": "Observation"}), "Patient");
        assert!(matches!(wrong, Err(FhirError::WrongResourceType { .. })));

        let missing = parse_resource::<Patient>(json!({"gender": "male"}), "Patient");
        assert!(matches!(missing, Err(FhirError::MissingResourceType)));

        let malformed = parse_resource::<Patient>(
            json!({"resourceType": "Patient", "name": "not-a-list"}),
            "Patient",
        );
        assert!(matches!(malformed, Err(FhirError::Invalid(_))));
    }

    #[test]
    fn test_list_resource_round_trip_through_record() {
        let record = ListRecord {
            pid: "2".to_string(),
            list_type: ListType::Allergy,
            title: "Latex".to_string(),
            begdate: "2012-08-08".to_string(),
            enddate: "2012-08-08".to_string(),
            diagnosis: "Latex".to_string(),
        };

        let resource = AllergyIntolerance::from_list_record(11, &record);
        assert_eq!(resource.resource_id(), Some("11"));
        assert_eq!(resource.to_list_record().unwrap(), record);
    }
}
