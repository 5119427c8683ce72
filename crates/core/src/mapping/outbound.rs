//! EHR → FHIR: build resources, bundles and outcomes from flat records

use std::error::Error;

use crate::bundle::{Bundle, BundleEntry};
use crate::datatypes::{
    Address, CodeableConcept, ContactPoint, HumanName, Identifier, Meta, Reference,
};
use crate::outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
use crate::record::{ListId, ListRecord, PatientId, PatientRecord};
use crate::resources::{AllergyIntolerance, Condition, MedicationAdministration, Patient, Procedure};
use crate::validation::ValidationResult;

/// Current instant as `YYYY-MM-DDTHH:MM:SS`
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Abatement is only reported when the item has a distinct end date
fn end_date(record: &ListRecord) -> Option<String> {
    non_empty(&record.enddate).filter(|end| *end != record.begdate)
}

pub fn patient_resource(pid: PatientId, record: &PatientRecord) -> Patient {
    let given = [&record.fname, &record.mname]
        .into_iter()
        .filter_map(|part| non_empty(part))
        .collect();

    let name = HumanName {
        name_use: Some("official".to_string()),
        family: non_empty(&record.lname),
        given,
        prefix: non_empty(&record.title).into_iter().collect(),
    };

    let address = Address {
        line: non_empty(&record.street).into_iter().collect(),
        city: non_empty(&record.city),
        state: non_empty(&record.state),
        postal_code: non_empty(&record.postal_code),
        country: non_empty(&record.country_code),
    };

    let telecom = non_empty(&record.phone_contact)
        .map(|phone| ContactPoint {
            system: Some("phone".to_string()),
            value: Some(phone),
        })
        .into_iter()
        .collect();

    Patient {
        id: Some(pid.to_string()),
        meta: Some(Meta {
            version_id: Some("1".to_string()),
            last_updated: Some(now_timestamp()),
        }),
        active: Some(true),
        name: vec![name],
        telecom,
        gender: non_empty(&record.sex).map(|sex| sex.to_lowercase()),
        birth_date: non_empty(&record.dob),
        address: if address == Address::default() {
            Vec::new()
        } else {
            vec![address]
        },
        ..Patient::new()
    }
}

pub fn condition_resource(id: ListId, record: &ListRecord) -> Condition {
    Condition {
        id: Some(id.to_string()),
        subject: Some(Reference::patient(&record.pid)),
        code: Some(CodeableConcept::text(&record.title)),
        onset_date_time: non_empty(&record.begdate),
        abatement_date_time: end_date(record),
        ..Condition::new()
    }
}

pub fn allergy_intolerance_resource(id: ListId, record: &ListRecord) -> AllergyIntolerance {
    AllergyIntolerance {
        id: Some(id.to_string()),
        patient: Some(Reference::patient(&record.pid)),
        code: Some(CodeableConcept::text(&record.title)),
        onset_date_time: non_empty(&record.begdate),
        ..AllergyIntolerance::new()
    }
}

pub fn medication_administration_resource(
    id: ListId,
    record: &ListRecord,
) -> MedicationAdministration {
    MedicationAdministration {
        id: Some(id.to_string()),
        status: Some("completed".to_string()),
        medication_codeable_concept: Some(CodeableConcept::text(&record.title)),
        subject: Some(Reference::patient(&record.pid)),
        effective_date_time: non_empty(&record.begdate),
        ..MedicationAdministration::new()
    }
}

pub fn procedure_resource(id: ListId, record: &ListRecord) -> Procedure {
    Procedure {
        id: Some(id.to_string()),
        status: Some("completed".to_string()),
        subject: Some(Reference::patient(&record.pid)),
        code: Some(CodeableConcept::text(&record.title)),
        performed_date_time: non_empty(&record.begdate),
        ..Procedure::new()
    }
}

/// Wrap search results in a collection bundle linking back to the request
pub fn bundle(resource_type: &str, self_url: &str, entries: Vec<BundleEntry>) -> Bundle {
    let mut bundle = Bundle::collection(entries).with_link("self", self_url);
    bundle.identifier = Some(Identifier {
        system: None,
        value: Some(format!("{}bundle", resource_type)),
    });
    bundle.meta = Some(Meta::updated_at(now_timestamp()));
    bundle
}

/// `allok` when valid, otherwise one `invariant` issue per failure
pub fn outcome_from_validation(result: &ValidationResult) -> OperationOutcome {
    if result.is_valid() {
        return OperationOutcome::with_id("allok");
    }

    let mut outcome = OperationOutcome::with_id("validationfail");
    for failure in result.failures() {
        outcome.push_issue(OperationOutcomeIssue::new(
            IssueSeverity::Error,
            IssueType::Invariant,
            &failure.reason,
        ));
    }
    outcome
}

/// Outcome for a failure that carries no error value
pub fn outcome_from_general_error(message: &str) -> OperationOutcome {
    let mut outcome = OperationOutcome::with_id("exception");
    outcome.push_issue(OperationOutcomeIssue::new(
        IssueSeverity::Error,
        IssueType::Exception,
        message,
    ));
    outcome
}

/// Outcome for a caught error; the text includes the whole source chain
pub fn outcome_from_error(err: &(dyn Error + 'static)) -> OperationOutcome {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    outcome_from_general_error(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleType;
    use crate::record::ListType;
    use crate::validation::validate_patient;

    fn sample_patient() -> PatientRecord {
        PatientRecord {
            title: "Ms.".to_string(),
            fname: "Jane".to_string(),
            mname: "Marie".to_string(),
            lname: "Doe".to_string(),
            street: "1 Main St".to_string(),
            postal_code: "02114".to_string(),
            city: "Boston".to_string(),
            state: "MA".to_string(),
            country_code: "US".to_string(),
            phone_contact: "555-0100".to_string(),
            dob: "1988-12-01".to_string(),
            sex: "Female".to_string(),
            ..Default::default()
        }
    }

    fn sample_list(enddate: &str) -> ListRecord {
        ListRecord {
            pid: "4".to_string(),
            list_type: ListType::MedicalProblem,
            title: "Asthma".to_string(),
            begdate: "2015-05-05".to_string(),
            enddate: enddate.to_string(),
            diagnosis: "Asthma".to_string(),
        }
    }

    #[test]
    fn test_patient_resource() {
        let patient = patient_resource(3, &sample_patient());

        assert_eq!(patient.id.as_deref(), Some("3"));
        assert_eq!(patient.active, Some(true));
        assert_eq!(patient.gender.as_deref(), Some("female"));
        assert_eq!(patient.name[0].name_use.as_deref(), Some("official"));
        assert_eq!(patient.name[0].given, vec!["Jane", "Marie"]);
        assert_eq!(patient.name[0].prefix, vec!["Ms."]);
        assert_eq!(patient.address[0].line, vec!["1 Main St"]);
        assert_eq!(patient.birth_date.as_deref(), Some("1988-12-01"));
        assert_eq!(patient.telecom[0].value.as_deref(), Some("555-0100"));

        let meta = patient.meta.unwrap();
        assert_eq!(meta.version_id.as_deref(), Some("1"));
        assert_eq!(meta.last_updated.unwrap().len(), "2019-01-07T16:27:00".len());
    }

    #[test]
    fn test_patient_resource_skips_empty_middle_name() {
        let mut record = sample_patient();
        record.mname.clear();
        record.phone_contact.clear();

        let patient = patient_resource(3, &record);
        assert_eq!(patient.name[0].given, vec!["Jane"]);
        assert!(patient.telecom.is_empty());
    }

    #[test]
    fn test_patient_resource_omits_empty_demographics() {
        let record = PatientRecord {
            fname: "Jane".to_string(),
            ..Default::default()
        };

        let patient = patient_resource(5, &record);
        assert!(patient.gender.is_none());
        assert!(patient.name[0].family.is_none());
        assert_eq!(patient.name[0].given, vec!["Jane"]);
        assert!(patient.address.is_empty());

        let json = serde_json::to_value(&patient).unwrap();
        assert!(json.get("gender").is_none());
        assert!(json["name"][0].get("family").is_none());
    }

    #[test]
    fn test_condition_resource_abatement() {
        let same_day = condition_resource(9, &sample_list("2015-05-05"));
        assert_eq!(same_day.subject.unwrap().reference.as_deref(), Some("Patient/4"));
        assert_eq!(same_day.code.unwrap().text.as_deref(), Some("Asthma"));
        assert_eq!(same_day.onset_date_time.as_deref(), Some("2015-05-05"));
        assert!(same_day.abatement_date_time.is_none());

        let resolved = condition_resource(9, &sample_list("2016-01-01"));
        assert_eq!(resolved.abatement_date_time.as_deref(), Some("2016-01-01"));
    }

    #[test]
    fn test_bundle_shape() {
        let entries = vec![
            BundleEntry::new(Some("http://x/fhir/Condition/1".to_string()), serde_json::json!({})),
            BundleEntry::new(Some("http://x/fhir/Condition/2".to_string()), serde_json::json!({})),
        ];

        let bundle = bundle("Condition", "http://x/fhir/Condition?patient=4", entries);

        assert_eq!(bundle.bundle_type, BundleType::Collection);
        assert_eq!(bundle.total, Some(2));
        assert_eq!(
            bundle.identifier.unwrap().value.as_deref(),
            Some("Conditionbundle")
        );
        assert_eq!(bundle.link[0].relation, "self");
        assert_eq!(bundle.link[0].url, "http://x/fhir/Condition?patient=4");
        assert!(bundle.meta.unwrap().last_updated.is_some());
    }

    #[test]
    fn test_outcome_from_validation() {
        let ok = outcome_from_validation(&ValidationResult::default());
        assert_eq!(ok.id.as_deref(), Some("allok"));
        assert!(ok.issue.is_empty());

        let failed = outcome_from_validation(&validate_patient(&PatientRecord::default()));
        assert_eq!(failed.id.as_deref(), Some("validationfail"));
        assert_eq!(failed.issue.len(), 4);
        assert!(failed.issue.iter().all(|i| i.code == IssueType::Invariant));
        assert!(failed.issue.iter().all(|i| i.severity == IssueSeverity::Error));
    }

    #[test]
    fn test_outcome_from_error_includes_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("query failed")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::other("connection reset"));
        let outcome = outcome_from_error(&err);

        assert_eq!(outcome.id.as_deref(), Some("exception"));
        assert_eq!(outcome.issue[0].code, IssueType::Exception);
        assert_eq!(
            outcome.issue[0].details.as_ref().unwrap().text.as_deref(),
            Some("query failed: connection reset")
        );
    }
}
