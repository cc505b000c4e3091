use serde::Deserialize;

use crate::api::AppError;
use crate::db::{ProteinRepository, Store, StoreError};
use crate::models::Protein;

#[derive(Debug, Clone, Deserialize)]
pub struct GetProteinQuery {
    pub accession: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetProteinError {
    #[error("Protein '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, query: GetProteinQuery) -> Result<Protein, GetProteinError> {
    let accession = query.accession.trim();
    store
        .find_protein(accession)
        .await?
        .ok_or_else(|| GetProteinError::NotFound(accession.to_string()))
}

impl From<GetProteinError> for AppError {
    fn from(err: GetProteinError) -> Self {
        match err {
            GetProteinError::NotFound(_) => AppError::NotFound(err.to_string()),
            GetProteinError::Store(e) => e.into(),
        }
    }
}
