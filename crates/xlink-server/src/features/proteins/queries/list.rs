use serde::Deserialize;

use crate::db::{ProteinRepository, Store, StoreResult};
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::Protein;

/// `?taxon_id=&page=&per_page=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProteinsQuery {
    pub taxon_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListProteinsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct ListProteinsResponse {
    pub items: Vec<Protein>,
    pub pagination: PaginationMetadata,
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, query: ListProteinsQuery) -> StoreResult<ListProteinsResponse> {
    let pagination = query.pagination();
    let page = store
        .list_proteins(query.taxon_id, pagination.per_page(), pagination.offset())
        .await?;

    Ok(ListProteinsResponse {
        items: page.items,
        pagination: PaginationMetadata::from_params(&pagination, page.total),
    })
}
