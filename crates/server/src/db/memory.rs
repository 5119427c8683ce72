use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use ehr_fhir_core::{
    ListId, ListRecord, ListType, PatientId, PatientRecord, PatientSearch, StoredList,
    StoredPatient,
};
use tokio::sync::RwLock;

use super::{ListService, PatientService, StoreError};

/// In-process record store; ids start at 1 and are never reused
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: RwLock<BTreeMap<ListId, ListRecord>>,
    patients: RwLock<BTreeMap<PatientId, PatientRecord>>,
    last_list_id: AtomicI64,
    last_pid: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListService for MemoryStore {
    async fn find_matching(&self, record: &ListRecord) -> Result<Vec<StoredList>, StoreError> {
        let lists = self.lists.read().await;
        Ok(lists
            .iter()
            .filter(|(_, stored)| stored.same_item(record))
            .map(|(id, stored)| StoredList {
                id: *id,
                record: stored.clone(),
            })
            .collect())
    }

    async fn insert(&self, record: &ListRecord) -> Result<Option<ListId>, StoreError> {
        let id = self.last_list_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.lists.write().await.insert(id, record.normalized());
        Ok(Some(id))
    }

    async fn update(&self, id: ListId, record: &ListRecord) -> Result<bool, StoreError> {
        let mut lists = self.lists.write().await;
        match lists.get_mut(&id) {
            Some(stored) if stored.list_type == record.list_type => {
                *stored = record.normalized();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_one(
        &self,
        id: ListId,
        list_type: ListType,
    ) -> Result<Option<ListRecord>, StoreError> {
        let lists = self.lists.read().await;
        Ok(lists
            .get(&id)
            .filter(|stored| stored.list_type == list_type)
            .cloned())
    }

    async fn get_all(
        &self,
        pid: Option<&str>,
        list_type: ListType,
    ) -> Result<Vec<StoredList>, StoreError> {
        let lists = self.lists.read().await;
        Ok(lists
            .iter()
            .filter(|(_, stored)| stored.list_type == list_type)
            .filter(|(_, stored)| pid.is_none_or(|pid| stored.belongs_to(pid)))
            .map(|(id, stored)| StoredList {
                id: *id,
                record: stored.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl PatientService for MemoryStore {
    async fn insert(&self, record: &PatientRecord) -> Result<Option<PatientId>, StoreError> {
        let pid = self.last_pid.fetch_add(1, Ordering::SeqCst) + 1;
        self.patients.write().await.insert(pid, record.clone());
        Ok(Some(pid))
    }

    async fn update(&self, pid: PatientId, record: &PatientRecord) -> Result<bool, StoreError> {
        let mut patients = self.patients.write().await;
        match patients.get_mut(&pid) {
            Some(stored) => {
                *stored = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_one(&self, pid: PatientId) -> Result<Option<PatientRecord>, StoreError> {
        Ok(self.patients.read().await.get(&pid).cloned())
    }

    async fn get_all(&self, search: &PatientSearch) -> Result<Vec<StoredPatient>, StoreError> {
        let patients = self.patients.read().await;
        Ok(patients
            .iter()
            .filter(|(_, record)| search.matches(record))
            .map(|(pid, record)| StoredPatient {
                pid: *pid,
                record: record.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pid: &str, list_type: ListType, title: &str) -> ListRecord {
        ListRecord {
            pid: pid.to_string(),
            list_type,
            title: title.to_string(),
            begdate: "2019-01-01".to_string(),
            enddate: "2019-01-01".to_string(),
            diagnosis: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_lifecycle() {
        let store = MemoryStore::new();
        let asthma = item("1", ListType::MedicalProblem, "Asthma");

        let id = ListService::insert(&store, &asthma).await.unwrap().unwrap();
        assert_eq!(id, 1);

        let matches = store.find_matching(&asthma).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, id);

        // Wrong list type hides the item
        assert!(
            ListService::get_one(&store, id, ListType::Allergy)
                .await
                .unwrap()
                .is_none()
        );

        let renamed = item("1", ListType::MedicalProblem, "Severe asthma");
        assert!(ListService::update(&store, id, &renamed).await.unwrap());
        assert!(!ListService::update(&store, 99, &renamed).await.unwrap());

        let fetched = ListService::get_one(&store, id, ListType::MedicalProblem)
            .await
            .unwrap();
        assert_eq!(fetched, Some(renamed));
    }

    #[tokio::test]
    async fn test_update_keeps_items_of_another_type() {
        let store = MemoryStore::new();
        let latex = item("1", ListType::Allergy, "Latex");
        let id = ListService::insert(&store, &latex).await.unwrap().unwrap();

        let gout = item("1", ListType::MedicalProblem, "Gout");
        assert!(!ListService::update(&store, id, &gout).await.unwrap());

        let fetched = ListService::get_one(&store, id, ListType::Allergy)
            .await
            .unwrap();
        assert_eq!(fetched, Some(latex));
    }

    #[tokio::test]
    async fn test_pid_is_stored_in_canonical_form() {
        let store = MemoryStore::new();
        ListService::insert(&store, &item("007", ListType::Allergy, "Latex"))
            .await
            .unwrap();

        let found = ListService::get_all(&store, Some("7"), ListType::Allergy)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.pid, "7");
    }

    #[tokio::test]
    async fn test_get_all_filters_by_patient_and_type() {
        let store = MemoryStore::new();
        for record in [
            item("1", ListType::MedicalProblem, "Asthma"),
            item("2", ListType::MedicalProblem, "Gout"),
            item("1", ListType::Allergy, "Latex"),
        ] {
            ListService::insert(&store, &record).await.unwrap();
        }

        let for_one = ListService::get_all(&store, Some("1"), ListType::MedicalProblem)
            .await
            .unwrap();
        assert_eq!(for_one.len(), 1);
        assert_eq!(for_one[0].record.title, "Asthma");

        let all = ListService::get_all(&store, None, ListType::MedicalProblem)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
