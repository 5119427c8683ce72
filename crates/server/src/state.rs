//! Shared handler state

use std::sync::Arc;

use axum::http::Uri;

use crate::db::{ListService, PatientService};

/// Record services plus the public base URL, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub lists: Arc<dyn ListService>,
    pub patients: Arc<dyn PatientService>,
    base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        lists: Arc<dyn ListService>,
        patients: Arc<dyn PatientService>,
        base_url: &str,
    ) -> Self {
        Self {
            lists,
            patients,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// State where one store serves both lists and patients
    pub fn from_store<S>(store: Arc<S>, base_url: &str) -> Self
    where
        S: ListService + PatientService + 'static,
    {
        Self::new(store.clone(), store, base_url)
    }

    /// Absolute resource URL (query stripped) and full self URL for a request
    pub fn request_urls(&self, uri: &Uri) -> (String, String) {
        let resource_url = format!("{}{}", self.base_url, uri.path());
        let self_url = match uri.query() {
            Some(query) => format!("{}?{}", resource_url, query),
            None => resource_url.clone(),
        };
        (resource_url, self_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_request_urls() {
        let state = AppState::from_store(Arc::new(MemoryStore::new()), "https://ehr.example/");
        let uri: Uri = "/fhir/Condition?patient=Patient/4".parse().unwrap();

        let (resource_url, self_url) = state.request_urls(&uri);

        assert_eq!(resource_url, "https://ehr.example/fhir/Condition");
        assert_eq!(self_url, "https://ehr.example/fhir/Condition?patient=Patient/4");
    }
}
