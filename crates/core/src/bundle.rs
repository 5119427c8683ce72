use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::datatypes::{Identifier, Meta};

/// FHIR Bundle types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
}

/// FHIR Bundle resource (simplified for search responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Create a collection bundle; total is the number of entries
    pub fn collection(entries: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            identifier: None,
            meta: None,
            bundle_type: BundleType::Collection,
            total: Some(entries.len() as u32),
            link: Vec::new(),
            entry: entries,
        }
    }

    pub fn with_link(mut self, relation: &str, url: &str) -> Self {
        self.link.push(BundleLink {
            relation: relation.to_string(),
            url: url.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    pub resource: JsonValue,
}

impl BundleEntry {
    pub fn new(full_url: Option<String>, resource: JsonValue) -> Self {
        Self { full_url, resource }
    }
}
