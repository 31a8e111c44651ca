// License service - License listing and per-user workspace
use crate::application::license_repository::{FetchResult, LicenseRepository};
use crate::domain::license::{UserId, WorkspaceRow};
use crate::domain::notification::ActionError;
use std::sync::Arc;

#[derive(Clone)]
pub struct LicenseService {
    repository: Arc<dyn LicenseRepository>,
}

impl LicenseService {
    pub fn new(repository: Arc<dyn LicenseRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_licenses(&self) -> FetchResult<Vec<WorkspaceRow>> {
        let records = self.repository.list_licenses().await?;
        Ok(WorkspaceRow::from_records(&records))
    }

    /// Sessions and usage for one user
    pub async fn user_workspace(&self, id: UserId) -> Result<Vec<WorkspaceRow>, ActionError> {
        let records = self.repository.user_licenses(id).await.map_err(|e| {
            tracing::error!("Error fetching licenses for user {}: {}", id, e);
            ActionError::new(e, "Failed to load workspace details.")
        })?;
        Ok(WorkspaceRow::from_records(&records))
    }
}
