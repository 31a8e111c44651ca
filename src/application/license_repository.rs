// Repository trait for license server access
use crate::domain::error::FetchError;
use crate::domain::license::{LicenseRecord, NewUser, User, UserId};
use async_trait::async_trait;
use serde_json::{Map, Value};

pub type FetchResult<T> = Result<T, FetchError>;

#[async_trait]
pub trait LicenseRepository: Send + Sync {
    /// Number of licenses handed out
    async fn license_count(&self) -> FetchResult<u64>;

    /// Number of registered users
    async fn user_count(&self) -> FetchResult<u64>;

    /// Number of sessions across all licenses
    async fn session_count(&self) -> FetchResult<u64>;

    /// Raw `date -> total use time` mapping, in the order the server sent it
    async fn daily_usage(&self) -> FetchResult<Map<String, Value>>;

    async fn list_users(&self) -> FetchResult<Vec<User>>;

    /// License records belonging to one user (their workspace)
    async fn user_licenses(&self, id: UserId) -> FetchResult<Vec<LicenseRecord>>;

    /// Create a user; succeeds only on HTTP 201 and returns the stored record
    async fn create_user(&self, user: &NewUser) -> FetchResult<User>;

    async fn delete_user(&self, id: UserId) -> FetchResult<()>;

    async fn list_licenses(&self) -> FetchResult<Vec<LicenseRecord>>;
}
