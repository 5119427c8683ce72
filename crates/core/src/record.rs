//! EHR-side flat records
//!
//! These mirror the rows the EHR keeps for a patient and for a clinical list
//! item. Values are kept as the EHR stores them (plain strings, empty when
//! unknown) so that validation can judge them before anything is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Id of a stored list item
pub type ListId = i64;

/// Id of a stored patient
pub type PatientId = i64;

/// Kind of clinical list item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    MedicalProblem,
    Allergy,
    Medication,
    Surgery,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::MedicalProblem => "medical_problem",
            ListType::Allergy => "allergy",
            ListType::Medication => "medication",
            ListType::Surgery => "surgery",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medical_problem" => Ok(ListType::MedicalProblem),
            "allergy" => Ok(ListType::Allergy),
            "medication" => Ok(ListType::Medication),
            "surgery" => Ok(ListType::Surgery),
            other => Err(format!("unknown list type '{}'", other)),
        }
    }
}

/// A clinical list item (problem, allergy, medication, procedure)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListRecord {
    /// Owning patient, as extracted from the FHIR reference
    pub pid: String,
    pub list_type: ListType,
    pub title: String,
    pub begdate: String,
    pub enddate: String,
    pub diagnosis: String,
}

/// Numeric pids compare by value, so `007` and `7` name one patient
fn same_pid(a: &str, b: &str) -> bool {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

impl ListRecord {
    pub fn belongs_to(&self, pid: &str) -> bool {
        same_pid(&self.pid, pid)
    }

    /// Copy with a numeric pid in its canonical form, as the EHR stores it
    pub fn normalized(&self) -> ListRecord {
        let mut record = self.clone();
        if let Ok(pid) = record.pid.parse::<i64>() {
            record.pid = pid.to_string();
        }
        record
    }

    /// True when `other` describes the same item for the same patient
    pub fn same_item(&self, other: &ListRecord) -> bool {
        self.belongs_to(&other.pid)
            && self.list_type == other.list_type
            && self.title == other.title
            && self.begdate == other.begdate
            && self.enddate == other.enddate
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredList {
    pub id: ListId,
    pub record: ListRecord,
}

/// Patient demographics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    pub title: String,
    pub fname: String,
    pub mname: String,
    pub lname: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub country_code: String,
    pub phone_contact: String,
    pub dob: String,
    pub sex: String,
    pub race: String,
    pub ethnicity: String,
}

impl PatientRecord {
    /// Case-insensitive substring match against any name part
    pub fn name_matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.fname, &self.mname, &self.lname]
            .iter()
            .any(|part| part.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPatient {
    pub pid: PatientId,
    pub record: PatientRecord,
}

/// Patient search criteria; empty or absent values do not filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSearch {
    pub name: Option<String>,
    pub dob: Option<String>,
}

impl PatientSearch {
    pub fn matches(&self, record: &PatientRecord) -> bool {
        let name_ok = match self.name.as_deref() {
            Some(name) if !name.is_empty() => record.name_matches(name),
            _ => true,
        };
        let dob_ok = match self.dob.as_deref() {
            Some(dob) if !dob.is_empty() => record.dob == dob,
            _ => true,
        };
        name_ok && dob_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_type_round_trips_through_str() {
        for list_type in [
            ListType::MedicalProblem,
            ListType::Allergy,
            ListType::Medication,
            ListType::Surgery,
        ] {
            assert_eq!(list_type.as_str().parse::<ListType>(), Ok(list_type));
        }
        assert!("encounter".parse::<ListType>().is_err());
    }

    #[test]
    fn test_list_pid_compares_numerically() {
        let record = ListRecord {
            pid: "007".to_string(),
            list_type: ListType::Allergy,
            title: "Latex".to_string(),
            begdate: "2019-01-01".to_string(),
            enddate: "2019-01-01".to_string(),
            diagnosis: "Latex".to_string(),
        };

        assert!(record.belongs_to("7"));
        assert!(!record.belongs_to("70"));
        assert_eq!(record.normalized().pid, "7");
        assert!(record.same_item(&record.normalized()));
    }

    #[test]
    fn test_patient_search_filters() {
        let record = PatientRecord {
            fname: "Maria".to_string(),
            lname: "Garcia".to_string(),
            dob: "1995-07-22".to_string(),
            ..Default::default()
        };

        assert!(PatientSearch::default().matches(&record));
        assert!(
            PatientSearch {
                name: Some("garc".to_string()),
                dob: Some(String::new()),
            }
            .matches(&record)
        );
        assert!(
            !PatientSearch {
                name: Some("maria".to_string()),
                dob: Some("1995-07-23".to_string()),
            }
            .matches(&record)
        );
    }
}
