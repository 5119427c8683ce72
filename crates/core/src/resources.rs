//! FHIR STU3 resources exchanged with clients (simplified to the mapped elements)
//!
//! Elements the mappers do not touch are dropped on deserialization.

use serde::{Deserialize, Serialize};

use crate::datatypes::{Address, CodeableConcept, ContactPoint, HumanName, Meta, Reference};

/// FHIR Patient resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
}

impl Patient {
    pub fn new() -> Self {
        Self {
            resource_type: "Patient".to_string(),
            id: None,
            meta: None,
            active: None,
            name: Vec::new(),
            telecom: Vec::new(),
            gender: None,
            birth_date: None,
            address: Vec::new(),
        }
    }
}

impl Default for Patient {
    fn default() -> Self {
        Self::new()
    }
}

/// FHIR Condition resource, backed by a `medical_problem` list item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub abatement_date_time: Option<String>,
}

impl Condition {
    pub fn new() -> Self {
        Self {
            resource_type: "Condition".to_string(),
            id: None,
            meta: None,
            subject: None,
            code: None,
            onset_date_time: None,
            abatement_date_time: None,
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new()
    }
}

/// FHIR AllergyIntolerance resource, backed by an `allergy` list item.
///
/// STU3 names the patient link `patient`, not `subject`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyIntolerance {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_date_time: Option<String>,
}

impl AllergyIntolerance {
    pub fn new() -> Self {
        Self {
            resource_type: "AllergyIntolerance".to_string(),
            id: None,
            meta: None,
            patient: None,
            code: None,
            onset_date_time: None,
        }
    }
}

impl Default for AllergyIntolerance {
    fn default() -> Self {
        Self::new()
    }
}

/// FHIR MedicationAdministration resource, backed by a `medication` list item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationAdministration {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,
}

impl MedicationAdministration {
    pub fn new() -> Self {
        Self {
            resource_type: "MedicationAdministration".to_string(),
            id: None,
            meta: None,
            status: None,
            medication_codeable_concept: None,
            subject: None,
            effective_date_time: None,
        }
    }
}

impl Default for MedicationAdministration {
    fn default() -> Self {
        Self::new()
    }
}

/// FHIR Procedure resource, backed by a `surgery` list item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_date_time: Option<String>,
}

impl Procedure {
    pub fn new() -> Self {
        Self {
            resource_type: "Procedure".to_string(),
            id: None,
            meta: None,
            status: None,
            subject: None,
            code: None,
            performed_date_time: None,
        }
    }
}

impl Default for Procedure {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_parses_client_payload() {
        let payload = r#"{"name":[{"use":"official","given":["TJ"]}],"telecom":[{"value":"(857) 285-0000","system":"phone"}],"gender":"male","birthDate":"1984-10-04","address":[{"line":["30 Bowdoin St","10"],"city":"Boston","state":"MA","postalCode":"02114"}],"contact":[{"name":{"use":"official","given":["ndkdk"]}}],"resourceType":"Patient"}"#;

        let patient: Patient = serde_json::from_str(payload).unwrap();

        assert_eq!(patient.name[0].given[0], "TJ");
        assert_eq!(patient.birth_date.as_deref(), Some("1984-10-04"));
        assert_eq!(patient.address[0].postal_code.as_deref(), Some("02114"));
        assert_eq!(patient.telecom[0].system.as_deref(), Some("phone"));
    }

    #[test]
    fn test_condition_serializes_camel_case() {
        let condition = Condition {
            id: Some("7".to_string()),
            onset_date_time: Some("2019-01-01".to_string()),
            ..Condition::new()
        };

        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(json["resourceType"], "Condition");
        assert_eq!(json["onsetDateTime"], "2019-01-01");
        assert!(json.get("abatementDateTime").is_none());
    }
}
