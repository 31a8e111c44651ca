// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::license_repository::LicenseRepository;
use crate::application::license_service::LicenseService;
use crate::application::user_directory::UserDirectory;
use std::sync::Arc;

pub struct AppState {
    pub dashboard_service: DashboardService,
    pub license_service: LicenseService,
    pub repository: Arc<dyn LicenseRepository>,
}

impl AppState {
    /// A fresh users view for one request. Nothing is shared between clients.
    pub fn user_directory(&self) -> UserDirectory {
        UserDirectory::new(self.repository.clone())
    }
}
