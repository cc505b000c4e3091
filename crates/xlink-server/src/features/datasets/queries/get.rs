use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppError;
use crate::db::{DatasetRepository, Store, StoreError};
use crate::models::Dataset;

#[derive(Debug, Clone, Deserialize)]
pub struct GetDatasetQuery {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetDatasetError {
    #[error("Dataset {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, query: GetDatasetQuery) -> Result<Dataset, GetDatasetError> {
    store
        .find_dataset(query.id)
        .await?
        .ok_or(GetDatasetError::NotFound(query.id))
}

impl From<GetDatasetError> for AppError {
    fn from(err: GetDatasetError) -> Self {
        match err {
            GetDatasetError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetDatasetError::Store(e) => e.into(),
        }
    }
}
