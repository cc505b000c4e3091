//! Storage seam
//!
//! One repository trait per entity, combined into [`Store`]. [`PgStore`] is
//! the production implementation; [`MemoryStore`] backs tests and dry runs.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{
    Crosslink, Dataset, DatasetFilter, DatasetStatus, NewDataset, NewOrganism, NewUser,
    NormalizedCrosslink, Organelle, Organism, Page, Protein, User,
};

/// Rows per INSERT statement when appending crosslinks.
pub const DEFAULT_CROSSLINK_CHUNK_SIZE: usize = 2000;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Record already exists
    #[error("{0}")]
    UniqueViolation(String),

    /// Referenced record does not exist
    #[error("{0}")]
    ForeignKeyViolation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to encode stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a successful crosslink append.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    /// Dataset after `row_count` and `status` were updated.
    pub dataset: Dataset,
    pub inserted: u64,
}

#[async_trait]
pub trait OrganismRepository: Send + Sync {
    async fn find_organism(&self, taxon_id: i32) -> StoreResult<Option<Organism>>;

    /// Insert unless the taxon exists; returns the stored row either way.
    async fn insert_organism_if_absent(&self, organism: &NewOrganism) -> StoreResult<Organism>;

    async fn update_organism_names(&self, organism: &NewOrganism) -> StoreResult<Organism>;

    async fn list_organisms(&self) -> StoreResult<Vec<Organism>>;
}

#[async_trait]
pub trait OrganelleRepository: Send + Sync {
    async fn find_organelle(&self, id: Uuid) -> StoreResult<Option<Organelle>>;

    async fn find_organelle_by_name(
        &self,
        name: &str,
        case_insensitive: bool,
    ) -> StoreResult<Option<Organelle>>;

    async fn insert_organelle_if_absent(&self, name: &str) -> StoreResult<Organelle>;

    async fn list_organelles(&self) -> StoreResult<Vec<Organelle>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn insert_user_if_absent(&self, user: &NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait ProteinRepository: Send + Sync {
    /// Subset of `accessions` stored with real data. Placeholders are left
    /// out so they get enriched again.
    async fn existing_protein_accessions(&self, accessions: &[String]) -> StoreResult<Vec<String>>;

    /// Insert or fully overwrite a protein.
    async fn upsert_protein(&self, protein: &Protein) -> StoreResult<()>;

    /// Insert a placeholder unless a row for the accession already exists.
    async fn insert_protein_placeholder(&self, protein: &Protein) -> StoreResult<()>;

    async fn find_protein(&self, accession: &str) -> StoreResult<Option<Protein>>;

    async fn list_proteins(
        &self,
        taxon_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Protein>>;
}

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Fails with [`StoreError::UniqueViolation`] when the user already has a dataset for the filename.
    async fn create_dataset(&self, dataset: &NewDataset) -> StoreResult<Dataset>;

    async fn find_dataset(&self, id: Uuid) -> StoreResult<Option<Dataset>>;

    async fn find_dataset_by_filename(
        &self,
        user_id: Uuid,
        filename: &str,
    ) -> StoreResult<Option<Dataset>>;

    async fn list_datasets(
        &self,
        filter: &DatasetFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Dataset>>;

    async fn update_dataset_status(&self, id: Uuid, status: DatasetStatus) -> StoreResult<Dataset>;

    async fn update_dataset_details(
        &self,
        id: Uuid,
        experiment: Option<&str>,
        description: Option<&str>,
    ) -> StoreResult<Dataset>;

    /// Returns whether a dataset was removed.
    async fn delete_dataset(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CrosslinkRepository: Send + Sync {
    /// Append `rows` to the dataset in one transaction.
    ///
    /// The dataset is locked for the duration, rows go in `chunk_size` at a
    /// time, and `row_count`/`status` are updated before commit. Any failure
    /// (including a row already present in the dataset) rolls back all of it.
    async fn append_crosslinks(
        &self,
        dataset_id: Uuid,
        rows: &[NormalizedCrosslink],
        chunk_size: usize,
    ) -> StoreResult<AppendOutcome>;

    async fn list_crosslinks(
        &self,
        dataset_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Crosslink>>;
}

/// Every repository the application needs.
#[async_trait]
pub trait Store:
    OrganismRepository
    + OrganelleRepository
    + UserRepository
    + ProteinRepository
    + DatasetRepository
    + CrosslinkRepository
    + Send
    + Sync
{
    async fn ping(&self) -> StoreResult<()>;
}

pub type SharedStore = Arc<dyn Store>;

pub async fn create_pool(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
