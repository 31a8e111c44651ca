// User directory - The users table with create and delete actions
use crate::application::license_repository::LicenseRepository;
use crate::domain::license::{NewUserForm, User, UserId, UserRow};
use crate::domain::metric::MetricState;
use crate::domain::notification::{ActionError, Notification};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Cancelled
        }
    }
}

pub struct UserDirectory {
    repository: Arc<dyn LicenseRepository>,
    users: MetricState<Vec<User>>,
}

impl UserDirectory {
    pub fn new(repository: Arc<dyn LicenseRepository>) -> Self {
        Self {
            repository,
            users: MetricState::Idle,
        }
    }

    /// Fetch the user list, replacing whatever was held before
    pub async fn load(&mut self) -> &MetricState<Vec<User>> {
        self.users = MetricState::Loading;
        self.users = match self.repository.list_users().await {
            Ok(users) => {
                tracing::debug!("Loaded {} users", users.len());
                MetricState::Loaded(users)
            }
            Err(e) => {
                tracing::error!("Error fetching users: {}", e);
                MetricState::Failed(e)
            }
        };
        &self.users
    }

    pub fn state(&self) -> &MetricState<Vec<User>> {
        &self.users
    }

    pub fn users(&self) -> &[User] {
        self.users.value().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<UserRow> {
        self.users().iter().map(UserRow::from).collect()
    }

    pub fn len(&self) -> usize {
        self.users().len()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.users().iter().any(|u| u.id == id)
    }

    /// Validate and submit a new user. The list only grows once the server
    /// confirms the creation.
    pub async fn create_user(&mut self, form: NewUserForm) -> Result<Notification, ActionError> {
        let new_user = form
            .validate()
            .map_err(|e| ActionError::new(e, "Please fill in all fields."))?;

        let created = self.repository.create_user(&new_user).await.map_err(|e| {
            tracing::error!("Error creating user {}: {}", new_user.email, e);
            ActionError::new(e, "An error occurred while creating the user.")
        })?;

        tracing::info!("Created user {} ({})", created.id, new_user.email);
        if let MetricState::Loaded(users) = &mut self.users {
            users.push(created);
        }

        Ok(Notification::success("Success!", "User created successfully."))
    }

    /// Delete a user after confirmation. The entry is removed locally only
    /// after the server call succeeds.
    pub async fn delete_user(
        &mut self,
        id: UserId,
        confirmation: Confirmation,
    ) -> Result<Notification, ActionError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(Notification::info("Cancelled", "The user was not deleted."));
        }

        self.repository.delete_user(id).await.map_err(|e| {
            tracing::error!("Error deleting user {}: {}", id, e);
            ActionError::new(e, "An error occurred while deleting the user.")
        })?;

        tracing::info!("Deleted user {}", id);
        if let MetricState::Loaded(users) = &mut self.users {
            users.retain(|u| u.id != id);
        }

        Ok(Notification::success("Deleted!", "The user has been deleted."))
    }
}
