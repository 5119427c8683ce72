use serde::{Deserialize, Serialize};

/// Resource types this server exposes, in the order they are advertised
pub const SUPPORTED_RESOURCES: [&str; 5] = [
    "Patient",
    "Condition",
    "AllergyIntolerance",
    "MedicationAdministration",
    "Procedure",
];

/// FHIR CapabilityStatement resource (simplified)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,
    pub status: String,
    pub date: String,
    pub kind: String,
    pub fhir_version: String,
    pub format: Vec<String>,
    pub rest: Vec<CapabilityRest>,
}

impl CapabilityStatement {
    /// Create a default capability statement for this server
    pub fn new() -> Self {
        Self {
            resource_type: "CapabilityStatement".to_string(),
            status: "active".to_string(),
            date: "2026-10-19".to_string(),
            kind: "instance".to_string(),
            fhir_version: "3.0.1".to_string(), // STU3
            format: vec!["json".to_string()],
            rest: vec![CapabilityRest::default()],
        }
    }
}

impl Default for CapabilityStatement {
    fn default() -> Self {
        Self::new()
    }
}

/// REST capability declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRest {
    pub mode: String,
    pub resource: Vec<CapabilityResource>,
}

impl Default for CapabilityRest {
    fn default() -> Self {
        Self {
            mode: "server".to_string(),
            resource: SUPPORTED_RESOURCES
                .iter()
                .map(|name| CapabilityResource::crud(name))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub interaction: Vec<CapabilityInteraction>,
}

impl CapabilityResource {
    /// read, update, create and search-type
    pub fn crud(resource_type: &str) -> Self {
        let interaction = ["read", "update", "create", "search-type"]
            .into_iter()
            .map(|code| CapabilityInteraction {
                code: code.to_string(),
            })
            .collect();

        Self {
            resource_type: resource_type.to_string(),
            interaction,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityInteraction {
    pub code: String,
}
