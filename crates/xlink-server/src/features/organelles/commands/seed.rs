//! Built-in organelle catalog

use crate::db::Store;
use crate::models::Organelle;

use super::ensure::{self, EnsureOrganelleCommand, EnsureOrganelleError};

pub const ORGANELLE_CATALOG: [&str; 18] = [
    "Whole cell",
    "Mitochondrion",
    "Golgi apparatus",
    "Endoplasmic reticulum",
    "Nucleus",
    "Lysosome",
    "Peroxisome",
    "Vesicles",
    "Cytoplasm",
    "Centrioles",
    "Cytoskeleton",
    "Cell wall",
    "Chloroplasts",
    "Vacuole",
    "Cilia and flagella",
    "Nucleolus",
    "Plasma membrane",
    "Plastids",
];

/// Ensure every catalog organelle exists. Safe to run repeatedly.
#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store) -> Result<Vec<Organelle>, EnsureOrganelleError> {
    let mut organelles = Vec::with_capacity(ORGANELLE_CATALOG.len());
    for name in ORGANELLE_CATALOG {
        let command = EnsureOrganelleCommand {
            name: name.to_string(),
            case_insensitive: true,
        };
        organelles.push(ensure::handle(store, command).await?);
    }
    tracing::info!(count = organelles.len(), "Organelle catalog seeded");
    Ok(organelles)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, OrganelleRepository};

    #[tokio::test]
    async fn test_seeding_twice_keeps_one_row_per_name() {
        let store = MemoryStore::new();
        handle(&store).await.unwrap();
        handle(&store).await.unwrap();
        assert_eq!(store.list_organelles().await.unwrap().len(), ORGANELLE_CATALOG.len());
    }
}
