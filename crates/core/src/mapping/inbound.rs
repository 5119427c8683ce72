//! FHIR → EHR: extract flat records from client-supplied resources

use crate::datatypes::{CodeableConcept, Reference};
use crate::error::FhirError;
use crate::record::{ListRecord, ListType, PatientRecord};
use crate::resources::{AllergyIntolerance, Condition, MedicationAdministration, Patient, Procedure};

/// Remove every `Patient/` (any case) from a reference, leaving the pid
pub fn strip_patient_prefix(reference: &str) -> String {
    const PREFIX: &str = "patient/";

    // ASCII lowercasing keeps byte offsets aligned with the original
    let lowered = reference.to_ascii_lowercase();
    let mut out = String::with_capacity(reference.len());
    let mut cursor = 0;
    while let Some(pos) = lowered[cursor..].find(PREFIX) {
        out.push_str(&reference[cursor..cursor + pos]);
        cursor += pos + PREFIX.len();
    }
    out.push_str(&reference[cursor..]);
    out
}

fn patient_id(reference: Option<&Reference>, element: &'static str) -> Result<String, FhirError> {
    reference
        .and_then(|r| r.reference.as_deref())
        .map(strip_patient_prefix)
        .ok_or(FhirError::MissingElement(element))
}

fn concept_text(
    concept: Option<&CodeableConcept>,
    element: &'static str,
) -> Result<String, FhirError> {
    concept
        .and_then(|c| c.text.clone())
        .ok_or(FhirError::MissingElement(element))
}

fn required(value: Option<&String>, element: &'static str) -> Result<String, FhirError> {
    value.cloned().ok_or(FhirError::MissingElement(element))
}

/// Build a list item; the begin date doubles as end date and the title as diagnosis
fn list_record(pid: String, list_type: ListType, title: String, date: String) -> ListRecord {
    tracing::debug!(
        pid = %pid,
        list_type = %list_type,
        title = %title,
        date = %date,
        "Mapped FHIR resource to list item"
    );

    ListRecord {
        pid,
        list_type,
        diagnosis: title.clone(),
        title,
        enddate: date.clone(),
        begdate: date,
    }
}

fn first_or_empty(values: &[String]) -> String {
    values.first().cloned().unwrap_or_default()
}

/// Patient demographics from the first name, address and telecom entries
pub fn patient_record(patient: &Patient) -> PatientRecord {
    let name = patient.name.first();
    let address = patient.address.first();
    let contact = patient.telecom.first();

    PatientRecord {
        title: name.map(|n| first_or_empty(&n.prefix)).unwrap_or_default(),
        fname: name.map(|n| first_or_empty(&n.given)).unwrap_or_default(),
        mname: String::new(),
        lname: name.and_then(|n| n.family.clone()).unwrap_or_default(),
        street: address.map(|a| first_or_empty(&a.line)).unwrap_or_default(),
        postal_code: address
            .and_then(|a| a.postal_code.clone())
            .unwrap_or_default(),
        city: address.and_then(|a| a.city.clone()).unwrap_or_default(),
        state: address.and_then(|a| a.state.clone()).unwrap_or_default(),
        country_code: address.and_then(|a| a.country.clone()).unwrap_or_default(),
        phone_contact: contact.and_then(|c| c.value.clone()).unwrap_or_default(),
        dob: patient.birth_date.clone().unwrap_or_default(),
        sex: patient.gender.clone().unwrap_or_default(),
        // TODO: map race and ethnicity once the US Core extensions are modelled
        race: String::new(),
        ethnicity: String::new(),
    }
}

pub fn condition_record(condition: &Condition) -> Result<ListRecord, FhirError> {
    Ok(list_record(
        patient_id(condition.subject.as_ref(), "Condition.subject.reference")?,
        ListType::MedicalProblem,
        concept_text(condition.code.as_ref(), "Condition.code.text")?,
        required(
            condition.onset_date_time.as_ref(),
            "Condition.onsetDateTime",
        )?,
    ))
}

pub fn procedure_record(procedure: &Procedure) -> Result<ListRecord, FhirError> {
    Ok(list_record(
        patient_id(procedure.subject.as_ref(), "Procedure.subject.reference")?,
        ListType::Surgery,
        concept_text(procedure.code.as_ref(), "Procedure.code.text")?,
        required(
            procedure.performed_date_time.as_ref(),
            "Procedure.performedDateTime",
        )?,
    ))
}

pub fn medication_administration_record(
    administration: &MedicationAdministration,
) -> Result<ListRecord, FhirError> {
    Ok(list_record(
        patient_id(
            administration.subject.as_ref(),
            "MedicationAdministration.subject.reference",
        )?,
        ListType::Medication,
        concept_text(
            administration.medication_codeable_concept.as_ref(),
            "MedicationAdministration.medicationCodeableConcept.text",
        )?,
        required(
            administration.effective_date_time.as_ref(),
            "MedicationAdministration.effectiveDateTime",
        )?,
    ))
}

pub fn allergy_intolerance_record(allergy: &AllergyIntolerance) -> Result<ListRecord, FhirError> {
    Ok(list_record(
        patient_id(
            allergy.patient.as_ref(),
            "AllergyIntolerance.patient.reference",
        )?,
        ListType::Allergy,
        concept_text(allergy.code.as_ref(), "AllergyIntolerance.code.text")?,
        required(
            allergy.onset_date_time.as_ref(),
            "AllergyIntolerance.onsetDateTime",
        )?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{Address, ContactPoint, HumanName};

    #[test]
    fn test_strip_patient_prefix() {
        assert_eq!(strip_patient_prefix("Patient/42"), "42");
        assert_eq!(strip_patient_prefix("patient/42"), "42");
        assert_eq!(strip_patient_prefix("PATIENT/Patient/7"), "7");
        assert_eq!(strip_patient_prefix("42"), "42");
        assert_eq!(
            strip_patient_prefix("http://ehr/fhir/Patient/9"),
            "http://ehr/fhir/9"
        );
    }

    #[test]
    fn test_patient_record_from_first_entries() {
        let patient = Patient {
            name: vec![HumanName {
                name_use: Some("official".to_string()),
                family: Some("Janela".to_string()),
                given: vec!["TJ".to_string(), "Second".to_string()],
                prefix: vec!["Mr.".to_string()],
            }],
            telecom: vec![ContactPoint {
                system: Some("phone".to_string()),
                value: Some("(857) 285-0000".to_string()),
            }],
            gender: Some("male".to_string()),
            birth_date: Some("1984-10-04".to_string()),
            address: vec![Address {
                line: vec!["30 Bowdoin St".to_string(), "10".to_string()],
                city: Some("Boston".to_string()),
                state: Some("MA".to_string()),
                postal_code: Some("02114".to_string()),
                country: None,
            }],
            ..Patient::new()
        };

        let record = patient_record(&patient);

        assert_eq!(record.title, "Mr.");
        assert_eq!(record.fname, "TJ");
        assert_eq!(record.mname, "");
        assert_eq!(record.lname, "Janela");
        assert_eq!(record.street, "30 Bowdoin St");
        assert_eq!(record.postal_code, "02114");
        assert_eq!(record.city, "Boston");
        assert_eq!(record.state, "MA");
        assert_eq!(record.country_code, "");
        assert_eq!(record.phone_contact, "(857) 285-0000");
        assert_eq!(record.dob, "1984-10-04");
        assert_eq!(record.sex, "male");
    }

    #[test]
    fn test_patient_record_tolerates_missing_elements() {
        let record = patient_record(&Patient::new());
        assert_eq!(record, PatientRecord::default());
    }

    #[test]
    fn test_condition_record() {
        let condition = Condition {
            subject: Some(Reference::patient("12")),
            code: Some(CodeableConcept::text("Hypertension")),
            onset_date_time: Some("2018-03-01".to_string()),
            ..Condition::new()
        };

        let record = condition_record(&condition).unwrap();

        assert_eq!(record.pid, "12");
        assert_eq!(record.list_type, ListType::MedicalProblem);
        assert_eq!(record.title, "Hypertension");
        assert_eq!(record.diagnosis, "Hypertension");
        assert_eq!(record.begdate, "2018-03-01");
        assert_eq!(record.enddate, "2018-03-01");
    }

    #[test]
    fn test_condition_without_subject_is_rejected() {
        let condition = Condition {
            code: Some(CodeableConcept::text("Hypertension")),
            onset_date_time: Some("2018-03-01".to_string()),
            ..Condition::new()
        };

        let err = condition_record(&condition).unwrap_err();
        assert!(matches!(
            err,
            FhirError::MissingElement("Condition.subject.reference")
        ));
    }

    #[test]
    fn test_allergy_reads_patient_reference() {
        let allergy = AllergyIntolerance {
            patient: Some(Reference::patient("5")),
            code: Some(CodeableConcept::text("Penicillin")),
            onset_date_time: Some("2001-06-30".to_string()),
            ..AllergyIntolerance::new()
        };

        let record = allergy_intolerance_record(&allergy).unwrap();
        assert_eq!(record.pid, "5");
        assert_eq!(record.list_type, ListType::Allergy);
    }

    #[test]
    fn test_medication_and_procedure_list_types() {
        let administration = MedicationAdministration {
            subject: Some(Reference::patient("8")),
            medication_codeable_concept: Some(CodeableConcept::text("Ibuprofen 200mg")),
            effective_date_time: Some("2020-02-02".to_string()),
            ..MedicationAdministration::new()
        };
        let procedure = Procedure {
            subject: Some(Reference::patient("8")),
            code: Some(CodeableConcept::text("Appendectomy")),
            performed_date_time: Some("2010-10-10".to_string()),
            ..Procedure::new()
        };

        let medication = medication_administration_record(&administration).unwrap();
        let surgery = procedure_record(&procedure).unwrap();

        assert_eq!(medication.list_type, ListType::Medication);
        assert_eq!(medication.title, "Ibuprofen 200mg");
        assert_eq!(surgery.list_type, ListType::Surgery);
        assert_eq!(surgery.begdate, "2010-10-10");
    }
}
