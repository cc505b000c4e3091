use crate::db::{OrganelleRepository, Store, StoreResult};
use crate::models::Organelle;

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store) -> StoreResult<Vec<Organelle>> {
    store.list_organelles().await
}
