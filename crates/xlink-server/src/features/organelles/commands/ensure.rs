use serde::{Deserialize, Serialize};

use crate::api::AppError;
use crate::db::{OrganelleRepository, Store, StoreError};
use crate::models::Organelle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsureOrganelleCommand {
    pub name: String,
    /// Reuse an existing organelle whose name differs only in case.
    #[serde(default)]
    pub case_insensitive: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EnsureOrganelleError {
    #[error("Organelle name is required and cannot be empty")]
    NameRequired,
    #[error("Organelle name must be between 1 and 255 characters")]
    NameLength,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Trim and collapse internal whitespace.
pub fn normalize_organelle_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl EnsureOrganelleCommand {
    pub fn validate(&self) -> Result<(), EnsureOrganelleError> {
        let name = normalize_organelle_name(&self.name);
        if name.is_empty() {
            return Err(EnsureOrganelleError::NameRequired);
        }
        if name.len() > 255 {
            return Err(EnsureOrganelleError::NameLength);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn Store,
    command: EnsureOrganelleCommand,
) -> Result<Organelle, EnsureOrganelleError> {
    command.validate()?;
    let name = normalize_organelle_name(&command.name);

    if let Some(existing) = store
        .find_organelle_by_name(&name, command.case_insensitive)
        .await?
    {
        return Ok(existing);
    }

    let organelle = store.insert_organelle_if_absent(&name).await?;
    tracing::info!(organelle_id = %organelle.id, name = %organelle.name, "Organelle ensured");
    Ok(organelle)
}

impl From<EnsureOrganelleError> for AppError {
    fn from(err: EnsureOrganelleError) -> Self {
        match err {
            EnsureOrganelleError::Store(e) => e.into(),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn ensure(name: &str, case_insensitive: bool) -> EnsureOrganelleCommand {
        EnsureOrganelleCommand {
            name: name.to_string(),
            case_insensitive,
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_organelle_name("  Golgi \t  apparatus "), "Golgi apparatus");
        assert!(matches!(
            ensure(" \n ", false).validate(),
            Err(EnsureOrganelleError::NameRequired)
        ));
    }

    #[tokio::test]
    async fn test_whitespace_variants_resolve_to_one_row() {
        let store = MemoryStore::new();
        let a = handle(&store, ensure("Golgi apparatus", false)).await.unwrap();
        let b = handle(&store, ensure("  Golgi   apparatus ", false)).await.unwrap();
        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_case_sensitivity_is_configurable() {
        let store = MemoryStore::new();
        let a = handle(&store, ensure("Mitochondrion", false)).await.unwrap();

        let exact = handle(&store, ensure("mitochondrion", false)).await.unwrap();
        assert_ne!(a.id, exact.id);

        let folded = handle(&store, ensure("MITOCHONDRION", true)).await.unwrap();
        assert_eq!(folded.name.to_lowercase(), "mitochondrion");
        assert_eq!(store.list_organelles().await.unwrap().len(), 2);
    }
}
