use serde::Serialize;
use uuid::Uuid;

use crate::api::AppError;
use crate::db::{DatasetRepository, Store, StoreError};

#[derive(Debug, Clone)]
pub struct DeleteDatasetCommand {
    pub dataset_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteDatasetResponse {
    pub id: Uuid,
    pub deleted_crosslinks: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDatasetError {
    #[error("Dataset {0} not found")]
    NotFound(Uuid),
    #[error("Dataset {0} belongs to another user")]
    Forbidden(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Delete a dataset owned by the caller. Its crosslinks go with it.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn Store,
    command: DeleteDatasetCommand,
) -> Result<DeleteDatasetResponse, DeleteDatasetError> {
    let dataset = store
        .find_dataset(command.dataset_id)
        .await?
        .ok_or(DeleteDatasetError::NotFound(command.dataset_id))?;

    if dataset.user_id != command.user_id {
        return Err(DeleteDatasetError::Forbidden(dataset.id));
    }

    if !store.delete_dataset(dataset.id).await? {
        return Err(DeleteDatasetError::NotFound(dataset.id));
    }

    tracing::info!(dataset_id = %dataset.id, rows = dataset.row_count, "Dataset deleted");
    Ok(DeleteDatasetResponse {
        id: dataset.id,
        deleted_crosslinks: dataset.row_count,
    })
}

impl From<DeleteDatasetError> for AppError {
    fn from(err: DeleteDatasetError) -> Self {
        match err {
            DeleteDatasetError::NotFound(_) => AppError::NotFound(err.to_string()),
            DeleteDatasetError::Forbidden(_) => AppError::Forbidden(err.to_string()),
            DeleteDatasetError::Store(e) => e.into(),
        }
    }
}
