use crate::db::{OrganismRepository, Store, StoreResult};
use crate::models::Organism;

/// Every known organism, ordered by scientific name.
#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store) -> StoreResult<Vec<Organism>> {
    store.list_organisms().await
}
