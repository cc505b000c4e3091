use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppError;
use crate::db::{DatasetRepository, Store, StoreError};
use crate::models::{Dataset, NewDataset};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatasetCommand {
    pub user_id: Uuid,
    pub organism_taxon_id: i32,
    pub organelle_id: Uuid,
    pub filename: String,
    #[serde(default)]
    pub file_sha256: Option<String>,
    #[serde(default)]
    pub experiment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDatasetError {
    #[error("Filename is required and cannot be empty")]
    FilenameRequired,
    #[error("Filename must be between 1 and 255 characters")]
    FilenameLength,
    #[error("A dataset named '{0}' already exists for this user")]
    Conflict(String),
    #[error("Dataset references an unknown user, organism or organelle")]
    UnknownReference,
    #[error(transparent)]
    Store(StoreError),
}

impl CreateDatasetCommand {
    pub fn validate(&self) -> Result<(), CreateDatasetError> {
        let filename = self.filename.trim();
        if filename.is_empty() {
            return Err(CreateDatasetError::FilenameRequired);
        }
        if filename.len() > 255 {
            return Err(CreateDatasetError::FilenameLength);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store), fields(filename = %command.filename))]
pub async fn handle(store: &dyn Store, command: CreateDatasetCommand) -> Result<Dataset, CreateDatasetError> {
    command.validate()?;
    let filename = command.filename.trim().to_string();

    let new = NewDataset {
        user_id: command.user_id,
        organism_taxon_id: command.organism_taxon_id,
        organelle_id: command.organelle_id,
        filename: filename.clone(),
        file_sha256: command.file_sha256,
        experiment: command.experiment,
        description: command.description,
    };

    store.create_dataset(&new).await.map_err(|e| match e {
        StoreError::UniqueViolation(_) => CreateDatasetError::Conflict(filename),
        StoreError::ForeignKeyViolation(_) => CreateDatasetError::UnknownReference,
        other => CreateDatasetError::Store(other),
    })
}

impl From<CreateDatasetError> for AppError {
    fn from(err: CreateDatasetError) -> Self {
        match err {
            CreateDatasetError::Conflict(_) => AppError::Conflict(err.to_string()),
            CreateDatasetError::Store(e) => e.into(),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(filename: &str) -> CreateDatasetCommand {
        CreateDatasetCommand {
            user_id: Uuid::new_v4(),
            organism_taxon_id: 9913,
            organelle_id: Uuid::new_v4(),
            filename: filename.to_string(),
            file_sha256: None,
            experiment: None,
            description: None,
        }
    }

    #[test]
    fn test_validation() {
        assert!(command("Bos_taurus_Mitochondrion.csv").validate().is_ok());
        assert!(matches!(command(" ").validate(), Err(CreateDatasetError::FilenameRequired)));
        assert!(matches!(
            command(&"a".repeat(256)).validate(),
            Err(CreateDatasetError::FilenameLength)
        ));
    }
}
