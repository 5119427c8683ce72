//! Record validation applied before anything reaches the EHR

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::record::{ListRecord, PatientRecord};

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub reason: String,
}

/// Outcome of validating one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    fn fail(&mut self, field: &'static str, reason: String) {
        self.failures.push(ValidationFailure { field, reason });
    }

    fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, format!("{} is required", field));
            false
        } else {
            true
        }
    }

    fn length_between(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.fail(
                field,
                format!("{} must be between {} and {} characters long", field, min, max),
            );
        }
    }
}

/// FHIR `date` (`YYYY-MM-DD`)
pub fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// FHIR `date` or `dateTime` (with or without offset)
fn is_date_or_datetime(value: &str) -> bool {
    is_date(value)
        || DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
}

/// Validate a clinical list item
pub fn validate_list(record: &ListRecord) -> ValidationResult {
    let mut result = ValidationResult::default();

    if result.required("title", &record.title) {
        result.length_between("title", &record.title, 2, 255);
    }

    if result.required("pid", &record.pid) && record.pid.parse::<i64>().is_err() {
        result.fail("pid", "pid must be numeric".to_string());
    }

    if !record.diagnosis.is_empty() {
        result.length_between("diagnosis", &record.diagnosis, 2, 255);
    }

    if result.required("begdate", &record.begdate) && !is_date_or_datetime(&record.begdate) {
        result.fail(
            "begdate",
            format!("begdate '{}' is not a valid date", record.begdate),
        );
    }

    if !record.enddate.is_empty() && !is_date_or_datetime(&record.enddate) {
        result.fail(
            "enddate",
            format!("enddate '{}' is not a valid date", record.enddate),
        );
    }

    result
}

/// Validate patient demographics
pub fn validate_patient(record: &PatientRecord) -> ValidationResult {
    let mut result = ValidationResult::default();

    if result.required("fname", &record.fname) {
        result.length_between("fname", &record.fname, 2, 255);
    }
    if result.required("lname", &record.lname) {
        result.length_between("lname", &record.lname, 2, 255);
    }
    if result.required("sex", &record.sex) {
        result.length_between("sex", &record.sex, 4, 30);
    }
    if result.required("dob", &record.dob) && !is_date(&record.dob) {
        result.fail("dob", format!("dob '{}' must be YYYY-MM-DD", record.dob));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ListType;

    fn list(pid: &str, title: &str, begdate: &str) -> ListRecord {
        ListRecord {
            pid: pid.to_string(),
            list_type: ListType::MedicalProblem,
            title: title.to_string(),
            begdate: begdate.to_string(),
            enddate: begdate.to_string(),
            diagnosis: title.to_string(),
        }
    }

    #[test]
    fn test_valid_list_record() {
        assert!(validate_list(&list("1", "Hypertension", "2019-01-01")).is_valid());
        assert!(validate_list(&list("1", "Asthma", "2019-01-01T10:00:00Z")).is_valid());
    }

    #[test]
    fn test_list_record_failures() {
        let result = validate_list(&list("abc", "A", "yesterday"));

        let fields: Vec<_> = result.failures().iter().map(|f| f.field).collect();
        assert!(!result.is_valid());
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"pid"));
        assert!(fields.contains(&"begdate"));
    }

    #[test]
    fn test_empty_diagnosis_is_allowed() {
        let mut record = list("3", "Hay fever", "2020-04-01");
        record.diagnosis.clear();
        record.enddate.clear();

        assert!(validate_list(&record).is_valid());
    }

    #[test]
    fn test_patient_requires_names_sex_and_dob() {
        let result = validate_patient(&PatientRecord::default());

        let fields: Vec<_> = result.failures().iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["fname", "lname", "sex", "dob"]);
    }

    #[test]
    fn test_patient_valid() {
        let record = PatientRecord {
            fname: "TJ".to_string(),
            lname: "Janela".to_string(),
            sex: "male".to_string(),
            dob: "1984-10-04".to_string(),
            ..Default::default()
        };

        assert!(validate_patient(&record).is_valid());
    }
}
