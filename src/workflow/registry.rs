//! Public tracking, the faculty registry and its spreadsheet export.

use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::portal::{require_department, require_faculty, PortalService};
use super::views::{RegistryExport, TrackedRequest, TrackingResult};
use crate::domain::{OdRequest, Profile};
use crate::error_handling::types::PortalError;
use crate::export;
use crate::storage::request_filter;

impl PortalService {
    /// Status lookup by register number. Needs no session.
    pub async fn track(&self, register_no: &str) -> Result<TrackingResult, PortalError> {
        let register_no = register_no.trim();
        if register_no.is_empty() {
            return Err(PortalError::Validation("Register number is required".into()));
        }
        let requests = self
            .storage
            .find_requests(&request_filter::by_register_no(register_no))
            .await?;
        let found = !requests.is_empty();
        Ok(TrackingResult {
            register_no: register_no.to_string(),
            found,
            message: (!found)
                .then(|| format!("No OD requests found for register number {}", register_no)),
            requests: requests.iter().map(TrackedRequest::from).collect(),
        })
    }

    /// Approved and completed requests of the actor's department.
    pub async fn registry(
        &self,
        actor: &Profile,
        search: Option<&str>,
    ) -> Result<Vec<OdRequest>, PortalError> {
        require_faculty(actor)?;
        let filter = request_filter::registry(actor.department.clone(), search.map(str::to_string));
        Ok(self.storage.find_requests(&filter).await?)
    }

    pub async fn update_achievement(
        &self,
        actor: &Profile,
        id: Uuid,
        notes: &str,
    ) -> Result<OdRequest, PortalError> {
        require_faculty(actor)?;
        let request = self.load_request(id).await?;
        require_department(actor, &request)?;
        let notes = Some(notes.trim().to_string()).filter(|n| !n.is_empty());
        if !self.storage.set_achievement(id, notes).await? {
            return Err(PortalError::NotFound("Request".into()));
        }
        info!("Achievement notes of {} updated by {}", id, actor.user_id);
        self.load_request(id).await
    }

    /// The current registry view as an `.xlsx` workbook.
    pub async fn export_registry(
        &self,
        actor: &Profile,
        search: Option<&str>,
    ) -> Result<RegistryExport, PortalError> {
        let requests = self.registry(actor, search).await?;
        let bytes = export::registry_workbook(&export::registry_rows(&requests))?;
        let file_name = export::export_file_name(Utc::now().date_naive());
        info!("Exported {} registry row(s) as {}", requests.len(), file_name);
        Ok(RegistryExport { file_name, bytes })
    }
}
