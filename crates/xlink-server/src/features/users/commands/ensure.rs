use serde::{Deserialize, Serialize};

use crate::api::AppError;
use crate::db::{Store, StoreError, UserRepository};
use crate::models::{NewUser, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsureUserCommand {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnsureUserError {
    #[error("Email is required and must contain '@'")]
    InvalidEmail,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EnsureUserCommand {
    pub fn service_account(email: &str) -> Self {
        Self {
            email: email.to_string(),
            first_name: Some("Data".to_string()),
            last_name: Some("Importer".to_string()),
        }
    }

    fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), EnsureUserError> {
        let email = self.normalized_email();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(EnsureUserError::InvalidEmail),
        }
    }
}

/// Find the user by email, creating them when absent.
#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, command: EnsureUserCommand) -> Result<User, EnsureUserError> {
    command.validate()?;
    let email = command.normalized_email();

    if let Some(existing) = store.find_user_by_email(&email).await? {
        return Ok(existing);
    }

    let user = store
        .insert_user_if_absent(&NewUser {
            email,
            first_name: command.first_name,
            last_name: command.last_name,
        })
        .await?;
    tracing::info!(user_id = %user.id, "User ensured");
    Ok(user)
}

impl From<EnsureUserError> for AppError {
    fn from(err: EnsureUserError) -> Self {
        match err {
            EnsureUserError::InvalidEmail => AppError::BadRequest(err.to_string()),
            EnsureUserError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_email_identity_is_case_insensitive() {
        let store = MemoryStore::new();
        let a = handle(&store, EnsureUserCommand::service_account("Importer@Xlink.local"))
            .await
            .unwrap();
        let b = handle(&store, EnsureUserCommand::service_account(" importer@xlink.local "))
            .await
            .unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.email, "importer@xlink.local");
    }

    #[test]
    fn test_invalid_email() {
        for email in ["", "nobody", "@x", "x@"] {
            assert!(matches!(
                EnsureUserCommand::service_account(email).validate(),
                Err(EnsureUserError::InvalidEmail)
            ));
        }
    }
}
