use std::marker::PhantomData;
use std::sync::Arc;

use ehr_fhir_core::mapping::outbound;
use ehr_fhir_core::{Bundle, BundleEntry, ListId, ListResource};

use super::Saved;
use crate::db::ListService;
use crate::error::AppError;

/// Controller for a resource type stored as a clinical list item
pub struct ListController<R> {
    lists: Arc<dyn ListService>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: ListResource> ListController<R> {
    pub fn new(lists: Arc<dyn ListService>) -> Self {
        Self {
            lists,
            _resource: PhantomData,
        }
    }

    /// Create; an identical existing item is returned instead of a duplicate
    pub async fn post(&self, resource: &R) -> Result<Saved<R>, AppError> {
        let record = resource.to_list_record()?;

        let validation = self.lists.validate(&record);
        if !validation.is_valid() {
            return Err(AppError::Validation(outbound::outcome_from_validation(
                &validation,
            )));
        }

        let existing = self.lists.find_matching(&record).await?;
        if let Some(found) = existing.first() {
            tracing::debug!(
                resource_type = R::RESOURCE_TYPE,
                id = found.id,
                "Matching list item exists, skipping insert"
            );
            return Ok(Saved {
                id: found.id,
                resource: self.get_one(found.id).await?,
                created: false,
            });
        }

        let Some(id) = self.lists.insert(&record).await? else {
            return Err(AppError::Internal(format!("Couldn't insert {}.", R::label())));
        };

        tracing::info!(resource_type = R::RESOURCE_TYPE, id = id, "List item created");

        Ok(Saved {
            id,
            resource: self.get_one(id).await?,
            created: true,
        })
    }

    pub async fn put(&self, id: ListId, resource: &R) -> Result<R, AppError> {
        if let Some(body_id) = resource.resource_id() {
            if body_id != id.to_string() {
                return Err(AppError::BadRequest(format!(
                    "Resource id '{}' does not match {}/{}",
                    body_id,
                    R::RESOURCE_TYPE,
                    id
                )));
            }
        }

        let record = resource.to_list_record()?;

        let validation = self.lists.validate(&record);
        if !validation.is_valid() {
            return Err(AppError::Validation(outbound::outcome_from_validation(
                &validation,
            )));
        }

        if !self.lists.update(id, &record).await? {
            return Err(AppError::Internal(format!("Couldn't update {}.", R::label())));
        }

        tracing::info!(resource_type = R::RESOURCE_TYPE, id = id, "List item updated");

        self.get_one(id).await
    }

    pub async fn get_one(&self, id: ListId) -> Result<R, AppError> {
        match self.lists.get_one(id, R::LIST_TYPE).await? {
            Some(record) => Ok(R::from_list_record(id, &record)),
            None => Err(AppError::NotFound(format!(
                "{}/{} not found",
                R::RESOURCE_TYPE,
                id
            ))),
        }
    }

    /// Collection bundle of a patient's items (all patients when `pid` is None)
    pub async fn get_all(
        &self,
        pid: Option<&str>,
        resource_url: &str,
        self_url: &str,
    ) -> Result<Bundle, AppError> {
        let items = self.lists.get_all(pid, R::LIST_TYPE).await?;

        let entries = items
            .iter()
            .map(|item| -> Result<BundleEntry, AppError> {
                let resource = serde_json::to_value(R::from_list_record(item.id, &item.record))?;
                Ok(BundleEntry::new(
                    Some(format!("{}/{}", resource_url, item.id)),
                    resource,
                ))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(outbound::bundle(R::RESOURCE_TYPE, self_url, entries))
    }
}
