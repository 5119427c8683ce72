use serde::{Deserialize, Serialize};

use crate::datatypes::CodeableConcept;

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// Type of issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Invalid,
    Structure,
    Required,
    Value,
    Invariant,
    Security,
    Login,
    Unknown,
    Expired,
    Forbidden,
    Suppressed,
    Processing,
    NotSupported,
    Duplicate,
    NotFound,
    TooLong,
    CodeInvalid,
    Extension,
    TooCostly,
    BusinessRule,
    Conflict,
    Incomplete,
    Transient,
    LockError,
    NoStore,
    Exception,
    Timeout,
    Throttled,
    Informational,
}

/// A single issue within an OperationOutcome.
///
/// STU3 carries the human readable text in `details.text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CodeableConcept>,
}

impl OperationOutcomeIssue {
    pub fn new(severity: IssueSeverity, code: IssueType, text: &str) -> Self {
        Self {
            severity,
            code,
            details: Some(CodeableConcept::text(text)),
        }
    }
}

/// FHIR OperationOutcome resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue: Vec<OperationOutcomeIssue>,
}

impl OperationOutcome {
    /// An outcome with the given id and no issues
    pub fn with_id(id: &str) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            id: Some(id.to_string()),
            issue: Vec::new(),
        }
    }

    /// Single error-severity issue
    pub fn error(code: IssueType, text: &str) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            id: None,
            issue: vec![OperationOutcomeIssue::new(IssueSeverity::Error, code, text)],
        }
    }

    pub fn not_found(text: &str) -> Self {
        Self::error(IssueType::NotFound, text)
    }

    pub fn invalid(text: &str) -> Self {
        Self::error(IssueType::Invalid, text)
    }

    pub fn push_issue(&mut self, issue: OperationOutcomeIssue) {
        self.issue.push(issue);
    }
}
