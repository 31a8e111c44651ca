// In-memory license server used by the application-layer tests
use crate::application::license_repository::{FetchResult, LicenseRepository};
use crate::domain::license::{LicenseRecord, NewUser, User, UserId};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

pub struct FakeRepository {
    pub license_count: FetchResult<u64>,
    pub user_count: FetchResult<u64>,
    pub session_count: FetchResult<u64>,
    pub daily_usage: FetchResult<Map<String, Value>>,
    pub users: FetchResult<Vec<User>>,
    pub user_licenses: FetchResult<Vec<LicenseRecord>>,
    pub licenses: FetchResult<Vec<LicenseRecord>>,
    pub created: FetchResult<User>,
    pub deleted: FetchResult<()>,
    /// When set, `license_count` blocks until a permit is released
    pub license_gate: Option<Semaphore>,
    /// When set, `delete_user` blocks until a permit is released
    pub delete_gate: Option<Semaphore>,
    pub license_completed: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeRepository {
    fn default() -> Self {
        Self {
            license_count: Ok(1),
            user_count: Ok(2),
            session_count: Ok(3),
            daily_usage: Ok(Map::new()),
            users: Ok(Vec::new()),
            user_licenses: Ok(Vec::new()),
            licenses: Ok(Vec::new()),
            created: Ok(user(1, "new@example.com")),
            deleted: Ok(()),
            license_gate: None,
            delete_gate: None,
            license_completed: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRepository {
    pub fn gated() -> Self {
        Self {
            license_gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self) {
        self.release_all(1);
    }

    pub fn release_all(&self, permits: usize) {
        if let Some(gate) = &self.license_gate {
            gate.add_permits(permits);
        }
    }

    pub fn release_deletes(&self, permits: usize) {
        if let Some(gate) = &self.delete_gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

pub fn user(id: UserId, email: &str) -> User {
    User {
        id,
        email: Some(email.to_string()),
        register_date: Some("2024-01-01T00:00:00Z".to_string()),
        ip: None,
        enabled: Some(true),
    }
}

#[async_trait]
impl LicenseRepository for FakeRepository {
    async fn license_count(&self) -> FetchResult<u64> {
        self.record("license_count");
        if let Some(gate) = &self.license_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.license_completed.fetch_add(1, Ordering::SeqCst);
        self.license_count.clone()
    }

    async fn user_count(&self) -> FetchResult<u64> {
        self.record("user_count");
        self.user_count.clone()
    }

    async fn session_count(&self) -> FetchResult<u64> {
        self.record("session_count");
        self.session_count.clone()
    }

    async fn daily_usage(&self) -> FetchResult<Map<String, Value>> {
        self.record("daily_usage");
        self.daily_usage.clone()
    }

    async fn list_users(&self) -> FetchResult<Vec<User>> {
        self.record("list_users");
        self.users.clone()
    }

    async fn user_licenses(&self, id: UserId) -> FetchResult<Vec<LicenseRecord>> {
        self.record(format!("user_licenses:{}", id));
        self.user_licenses.clone()
    }

    async fn create_user(&self, user: &NewUser) -> FetchResult<User> {
        self.record(format!("create_user:{}", user.email));
        self.created.clone()
    }

    async fn delete_user(&self, id: UserId) -> FetchResult<()> {
        self.record(format!("delete_user:{}", id));
        if let Some(gate) = &self.delete_gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.deleted.clone()
    }

    async fn list_licenses(&self) -> FetchResult<Vec<LicenseRecord>> {
        self.record("list_licenses");
        self.licenses.clone()
    }
}
