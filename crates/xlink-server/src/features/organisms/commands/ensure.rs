use serde::{Deserialize, Serialize};

use crate::api::AppError;
use crate::db::{OrganismRepository, Store, StoreError};
use crate::models::{NewOrganism, Organism};
use crate::uniprot::OrganismInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsureOrganismCommand {
    pub taxon_id: i32,
    pub scientific_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    /// Overwrite the stored names when the organism already exists.
    #[serde(default)]
    pub refresh_names: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EnsureOrganismError {
    #[error("Taxon ID must be greater than 0")]
    InvalidTaxonId,
    #[error("Scientific name is required and cannot be empty")]
    ScientificNameRequired,
    #[error("Scientific name must be between 1 and 255 characters")]
    ScientificNameLength,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<OrganismInfo> for EnsureOrganismCommand {
    fn from(info: OrganismInfo) -> Self {
        Self {
            taxon_id: info.taxon_id,
            scientific_name: info.scientific_name,
            common_name: info.common_name,
            refresh_names: false,
        }
    }
}

impl EnsureOrganismCommand {
    pub fn validate(&self) -> Result<(), EnsureOrganismError> {
        if self.taxon_id <= 0 {
            return Err(EnsureOrganismError::InvalidTaxonId);
        }
        if self.scientific_name.trim().is_empty() {
            return Err(EnsureOrganismError::ScientificNameRequired);
        }
        if self.scientific_name.len() > 255 {
            return Err(EnsureOrganismError::ScientificNameLength);
        }
        Ok(())
    }
}

/// Return the stored organism, creating it when absent.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn Store,
    command: EnsureOrganismCommand,
) -> Result<Organism, EnsureOrganismError> {
    command.validate()?;

    let new = NewOrganism {
        taxon_id: command.taxon_id,
        scientific_name: command.scientific_name.trim().to_string(),
        common_name: command
            .common_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
    };

    if let Some(existing) = store.find_organism(new.taxon_id).await? {
        let stale = existing.scientific_name != new.scientific_name
            || existing.common_name != new.common_name;
        if command.refresh_names && stale {
            tracing::info!(taxon_id = new.taxon_id, "Refreshing organism names");
            return Ok(store.update_organism_names(&new).await?);
        }
        return Ok(existing);
    }

    let organism = store.insert_organism_if_absent(&new).await?;
    tracing::info!(
        taxon_id = organism.taxon_id,
        name = %organism.scientific_name,
        "Organism ensured"
    );
    Ok(organism)
}

impl From<EnsureOrganismError> for AppError {
    fn from(err: EnsureOrganismError) -> Self {
        match err {
            EnsureOrganismError::Store(e) => e.into(),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
