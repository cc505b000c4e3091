use serde::Deserialize;

use crate::api::AppError;
use crate::db::{OrganismRepository, Store, StoreError};
use crate::models::Organism;

#[derive(Debug, Clone, Deserialize)]
pub struct GetOrganismQuery {
    pub taxon_id: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum GetOrganismError {
    #[error("Organism {0} not found")]
    NotFound(i32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, query: GetOrganismQuery) -> Result<Organism, GetOrganismError> {
    store
        .find_organism(query.taxon_id)
        .await?
        .ok_or(GetOrganismError::NotFound(query.taxon_id))
}

impl From<GetOrganismError> for AppError {
    fn from(err: GetOrganismError) -> Self {
        match err {
            GetOrganismError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetOrganismError::Store(e) => e.into(),
        }
    }
}
