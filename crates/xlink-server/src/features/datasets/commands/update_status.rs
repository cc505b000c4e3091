use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppError;
use crate::db::{DatasetRepository, Store, StoreError};
use crate::models::{Dataset, DatasetStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusCommand {
    #[serde(skip)]
    pub dataset_id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub status: DatasetStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateStatusError {
    #[error("Dataset {0} not found")]
    NotFound(Uuid),
    #[error("Dataset {0} belongs to another user")]
    Forbidden(Uuid),
    #[error("Cannot move dataset from '{from}' to '{to}'")]
    InvalidTransition { from: DatasetStatus, to: DatasetStatus },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Advance a dataset's status. Status never moves backwards.
#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, command: UpdateStatusCommand) -> Result<Dataset, UpdateStatusError> {
    let dataset = store
        .find_dataset(command.dataset_id)
        .await?
        .ok_or(UpdateStatusError::NotFound(command.dataset_id))?;

    if dataset.user_id != command.user_id {
        return Err(UpdateStatusError::Forbidden(dataset.id));
    }
    if !dataset.status.can_transition_to(command.status) {
        return Err(UpdateStatusError::InvalidTransition {
            from: dataset.status,
            to: command.status,
        });
    }
    if dataset.status == command.status {
        return Ok(dataset);
    }

    let updated = store.update_dataset_status(dataset.id, command.status).await?;
    tracing::info!(dataset_id = %updated.id, status = %updated.status, "Dataset status updated");
    Ok(updated)
}

impl From<UpdateStatusError> for AppError {
    fn from(err: UpdateStatusError) -> Self {
        match err {
            UpdateStatusError::NotFound(_) => AppError::NotFound(err.to_string()),
            UpdateStatusError::Forbidden(_) => AppError::Forbidden(err.to_string()),
            UpdateStatusError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            UpdateStatusError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, OrganelleRepository, OrganismRepository, UserRepository};
    use crate::models::{NewDataset, NewOrganism, NewUser};

    async fn owned_dataset(store: &MemoryStore) -> Dataset {
        store
            .insert_organism_if_absent(&NewOrganism {
                taxon_id: 9606,
                scientific_name: "Homo sapiens".into(),
                common_name: None,
            })
            .await
            .unwrap();
        let organelle = store.insert_organelle_if_absent("Nucleus").await.unwrap();
        let user = store
            .insert_user_if_absent(&NewUser {
                email: "owner@lab.org".into(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();
        store
            .create_dataset(&NewDataset {
                user_id: user.id,
                organism_taxon_id: 9606,
                organelle_id: organelle.id,
                filename: "Human_Nucleus.csv".into(),
                file_sha256: None,
                experiment: None,
                description: None,
            })
            .await
            .unwrap()
    }

    fn command(dataset: &Dataset, status: DatasetStatus) -> UpdateStatusCommand {
        UpdateStatusCommand {
            dataset_id: dataset.id,
            user_id: dataset.user_id,
            status,
        }
    }

    #[tokio::test]
    async fn test_status_moves_forward_only() {
        let store = MemoryStore::new();
        let dataset = owned_dataset(&store).await;

        let validated = handle(&store, command(&dataset, DatasetStatus::Validated)).await.unwrap();
        assert_eq!(validated.status, DatasetStatus::Validated);

        let regression = handle(&store, command(&dataset, DatasetStatus::Parsed)).await;
        assert!(matches!(regression, Err(UpdateStatusError::InvalidTransition { .. })));

        let failed = handle(&store, command(&dataset, DatasetStatus::Failed)).await.unwrap();
        assert_eq!(failed.status, DatasetStatus::Failed);
    }

    #[tokio::test]
    async fn test_only_the_owner_may_update() {
        let store = MemoryStore::new();
        let dataset = owned_dataset(&store).await;

        let mut cmd = command(&dataset, DatasetStatus::Validated);
        cmd.user_id = Uuid::new_v4();
        assert!(matches!(handle(&store, cmd).await, Err(UpdateStatusError::Forbidden(_))));

        let mut cmd = command(&dataset, DatasetStatus::Validated);
        cmd.dataset_id = Uuid::new_v4();
        let err = handle(&store, cmd).await.unwrap_err();
        assert_eq!(AppError::from(err).status(), axum::http::StatusCode::NOT_FOUND);
    }
}
