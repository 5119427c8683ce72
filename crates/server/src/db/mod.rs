//! EHR record services
//!
//! The bridge never owns clinical data; it talks to the EHR through these
//! two services. `PgStore` reads and writes the EHR's own tables,
//! `MemoryStore` keeps everything in process.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use ehr_fhir_core::{
    ListId, ListRecord, ListType, PatientId, PatientRecord, PatientSearch, StoredList,
    StoredPatient, ValidationResult, validate_list, validate_patient,
};
use thiserror::Error;
use tokio_postgres::NoTls;

/// Failure talking to the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database pool error")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Database error")]
    Query(#[from] tokio_postgres::Error),

    #[error("Record rejected by store: {0}")]
    InvalidRecord(String),
}

/// Clinical list items (problems, allergies, medications, surgeries)
#[async_trait]
pub trait ListService: Send + Sync {
    fn validate(&self, record: &ListRecord) -> ValidationResult {
        validate_list(record)
    }

    /// Items with the same pid, type, title, begin and end date
    async fn find_matching(&self, record: &ListRecord) -> Result<Vec<StoredList>, StoreError>;

    /// Store a new item; `None` when the store declined to create it
    async fn insert(&self, record: &ListRecord) -> Result<Option<ListId>, StoreError>;

    /// Overwrite an item of the record's list type; `false` when no such
    /// item exists, in which case nothing is written
    async fn update(&self, id: ListId, record: &ListRecord) -> Result<bool, StoreError>;

    async fn get_one(
        &self,
        id: ListId,
        list_type: ListType,
    ) -> Result<Option<ListRecord>, StoreError>;

    /// All items of a type, optionally for one patient, ordered by id.
    /// A pid that cannot exist yields no items.
    async fn get_all(
        &self,
        pid: Option<&str>,
        list_type: ListType,
    ) -> Result<Vec<StoredList>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Patient demographics
#[async_trait]
pub trait PatientService: Send + Sync {
    fn validate(&self, record: &PatientRecord) -> ValidationResult {
        validate_patient(record)
    }

    async fn insert(&self, record: &PatientRecord) -> Result<Option<PatientId>, StoreError>;

    async fn update(&self, pid: PatientId, record: &PatientRecord) -> Result<bool, StoreError>;

    async fn get_one(&self, pid: PatientId) -> Result<Option<PatientRecord>, StoreError>;

    async fn get_all(&self, search: &PatientSearch) -> Result<Vec<StoredPatient>, StoreError>;
}

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}
