use std::sync::Arc;

use ehr_fhir_core::mapping::{inbound, outbound};
use ehr_fhir_core::{Bundle, BundleEntry, Patient, PatientId, PatientSearch};

use super::Saved;
use crate::db::PatientService;
use crate::error::AppError;

/// Controller for the Patient resource
pub struct PatientController {
    patients: Arc<dyn PatientService>,
}

impl PatientController {
    pub fn new(patients: Arc<dyn PatientService>) -> Self {
        Self { patients }
    }

    pub async fn post(&self, resource: &Patient) -> Result<Saved<Patient>, AppError> {
        let record = inbound::patient_record(resource);

        let validation = self.patients.validate(&record);
        if !validation.is_valid() {
            return Err(AppError::Validation(outbound::outcome_from_validation(
                &validation,
            )));
        }

        let Some(pid) = self.patients.insert(&record).await? else {
            return Err(AppError::Internal("Couldn't insert patient.".to_string()));
        };

        tracing::info!(pid = pid, "Patient created");

        Ok(Saved {
            id: pid,
            resource: self.get_one(pid).await?,
            created: true,
        })
    }

    pub async fn put(&self, pid: PatientId, resource: &Patient) -> Result<Patient, AppError> {
        if let Some(body_id) = resource.id.as_deref() {
            if body_id != pid.to_string() {
                return Err(AppError::BadRequest(format!(
                    "Resource id '{}' does not match Patient/{}",
                    body_id, pid
                )));
            }
        }

        let record = inbound::patient_record(resource);

        let validation = self.patients.validate(&record);
        if !validation.is_valid() {
            return Err(AppError::Validation(outbound::outcome_from_validation(
                &validation,
            )));
        }

        if !self.patients.update(pid, &record).await? {
            return Err(AppError::Internal("Couldn't update patient.".to_string()));
        }

        tracing::info!(pid = pid, "Patient updated");

        self.get_one(pid).await
    }

    pub async fn get_one(&self, pid: PatientId) -> Result<Patient, AppError> {
        match self.patients.get_one(pid).await? {
            Some(record) => Ok(outbound::patient_resource(pid, &record)),
            None => Err(AppError::NotFound(format!("Patient/{} not found", pid))),
        }
    }

    pub async fn get_all(
        &self,
        search: &PatientSearch,
        resource_url: &str,
        self_url: &str,
    ) -> Result<Bundle, AppError> {
        let patients = self.patients.get_all(search).await?;

        let entries = patients
            .iter()
            .map(|stored| -> Result<BundleEntry, AppError> {
                let resource = serde_json::to_value(outbound::patient_resource(
                    stored.pid,
                    &stored.record,
                ))?;
                Ok(BundleEntry::new(
                    Some(format!("{}/{}", resource_url, stored.pid)),
                    resource,
                ))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(outbound::bundle("Patient", self_url, entries))
    }
}
