use serde::Deserialize;
use uuid::Uuid;

use crate::db::{CrosslinkRepository, DatasetRepository, Store};
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::Crosslink;

use super::get::GetDatasetError;

/// `?page=&per_page=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCrosslinksQuery {
    #[serde(skip)]
    pub dataset_id: Uuid,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ListCrosslinksResponse {
    pub items: Vec<Crosslink>,
    pub pagination: PaginationMetadata,
}

/// Crosslinks of one dataset in insertion order.
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn Store,
    query: ListCrosslinksQuery,
) -> Result<ListCrosslinksResponse, GetDatasetError> {
    if store.find_dataset(query.dataset_id).await?.is_none() {
        return Err(GetDatasetError::NotFound(query.dataset_id));
    }

    let pagination = PaginationParams::new(query.page, query.per_page);
    let page = store
        .list_crosslinks(query.dataset_id, pagination.per_page(), pagination.offset())
        .await?;

    Ok(ListCrosslinksResponse {
        items: page.items,
        pagination: PaginationMetadata::from_params(&pagination, page.total),
    })
}
