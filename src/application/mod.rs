// Application layer - Use cases behind the dashboard views
pub mod dashboard_service;
pub mod license_repository;
pub mod license_service;
pub mod user_directory;

#[cfg(test)]
pub mod testing;
