use serde::Deserialize;
use uuid::Uuid;

use crate::db::{DatasetRepository, Store, StoreResult};
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::{Dataset, DatasetFilter, DatasetStatus};

/// `?organism_taxon_id=&organelle_id=&user_id=&status=&q=&page=&per_page=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDatasetsQuery {
    pub organism_taxon_id: Option<i32>,
    pub organelle_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<DatasetStatus>,
    /// Filename substring
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListDatasetsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn filter(&self) -> DatasetFilter {
        DatasetFilter {
            organism_taxon_id: self.organism_taxon_id,
            organelle_id: self.organelle_id,
            user_id: self.user_id,
            status: self.status,
            filename_contains: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListDatasetsResponse {
    pub items: Vec<Dataset>,
    pub pagination: PaginationMetadata,
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn Store, query: ListDatasetsQuery) -> StoreResult<ListDatasetsResponse> {
    let pagination = query.pagination();
    let page = store
        .list_datasets(&query.filter(), pagination.per_page(), pagination.offset())
        .await?;

    Ok(ListDatasetsResponse {
        items: page.items,
        pagination: PaginationMetadata::from_params(&pagination, page.total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ListDatasetsQuery {
            q: Some("  ".into()),
            status: Some(DatasetStatus::Parsed),
            ..Default::default()
        };
        let filter = query.filter();
        assert_eq!(filter.filename_contains, None);
        assert_eq!(filter.status, Some(DatasetStatus::Parsed));
    }
}
