// Domain layer - View-model types and pure transforms
pub mod dashboard;
pub mod error;
pub mod license;
pub mod metric;
pub mod notification;
pub mod usage;
