//! PostgreSQL store
//!
//! Queries are built at runtime and decoded into private row structs so the
//! crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    AppendOutcome, CrosslinkRepository, DatasetRepository, OrganelleRepository,
    OrganismRepository, ProteinRepository, Store, StoreError, StoreResult, UserRepository,
};
use crate::features::shared::error_helpers::{check_constraint_violation, ConstraintViolation};
use crate::models::{
    Crosslink, Dataset, DatasetFilter, DatasetStatus, GoTerm, NewDataset, NewOrganism, NewUser,
    NormalizedCrosslink, Organelle, Organism, Page, Protein, SubcellularLocation, User,
};

/// PostgreSQL caps a statement at 65535 bind parameters; a crosslink row uses six.
const MAX_CROSSLINKS_PER_STATEMENT: usize = 65535 / 6;

const DATASET_COLUMNS: &str = "id, user_id, organism_taxon_id, organelle_id, filename, \
     file_sha256, row_count, status, experiment, description, created_at, updated_at";

const PROTEIN_COLUMNS: &str = "accession, taxon_id, source_taxon_id, gene_name, protein_name, \
     sequence, sequence_length, go_terms, subcellular_locations, string_refs, is_placeholder, \
     updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct OrganismRow {
    taxon_id: i32,
    scientific_name: String,
    common_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrganismRow> for Organism {
    fn from(row: OrganismRow) -> Self {
        Organism {
            taxon_id: row.taxon_id,
            scientific_name: row.scientific_name,
            common_name: row.common_name,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct OrganelleRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<OrganelleRow> for Organelle {
    fn from(row: OrganelleRow) -> Self {
        Organelle {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProteinRow {
    accession: String,
    taxon_id: i32,
    source_taxon_id: Option<i32>,
    gene_name: Option<String>,
    protein_name: Option<String>,
    sequence: Option<String>,
    sequence_length: Option<i32>,
    go_terms: Json<Vec<GoTerm>>,
    subcellular_locations: Json<Vec<SubcellularLocation>>,
    string_refs: Option<String>,
    is_placeholder: bool,
    updated_at: DateTime<Utc>,
}

impl From<ProteinRow> for Protein {
    fn from(row: ProteinRow) -> Self {
        Protein {
            accession: row.accession,
            taxon_id: row.taxon_id,
            source_taxon_id: row.source_taxon_id,
            gene_name: row.gene_name,
            protein_name: row.protein_name,
            sequence: row.sequence,
            sequence_length: row.sequence_length,
            go_terms: row.go_terms.0,
            subcellular_locations: row.subcellular_locations.0,
            string_refs: row.string_refs,
            is_placeholder: row.is_placeholder,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct DatasetRow {
    id: Uuid,
    user_id: Uuid,
    organism_taxon_id: i32,
    organelle_id: Uuid,
    filename: String,
    file_sha256: Option<String>,
    row_count: i64,
    status: String,
    experiment: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DatasetRow> for Dataset {
    type Error = StoreError;

    fn try_from(row: DatasetRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<DatasetStatus>()
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Dataset {
            id: row.id,
            user_id: row.user_id,
            organism_taxon_id: row.organism_taxon_id,
            organelle_id: row.organelle_id,
            filename: row.filename,
            file_sha256: row.file_sha256,
            row_count: row.row_count,
            status,
            experiment: row.experiment,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CrosslinkRow {
    id: i64,
    dataset_id: Uuid,
    protein1_accession: String,
    protein2_accession: String,
    pos1: i32,
    pos2: i32,
    score: Option<f64>,
}

impl From<CrosslinkRow> for Crosslink {
    fn from(row: CrosslinkRow) -> Self {
        Crosslink {
            id: row.id,
            dataset_id: row.dataset_id,
            protein1_accession: row.protein1_accession,
            protein2_accession: row.protein2_accession,
            pos1: row.pos1,
            pos2: row.pos2,
            score: row.score,
        }
    }
}

/// Map a write failure, naming the record for constraint violations.
fn write_error(error: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match check_constraint_violation(error) {
        ConstraintViolation::UniqueViolation => {
            StoreError::UniqueViolation(format!("{} already exists", what()))
        }
        ConstraintViolation::ForeignKeyViolation => {
            StoreError::ForeignKeyViolation(format!("{} references a missing record", what()))
        }
        ConstraintViolation::Other(e) => StoreError::Database(e),
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_dataset_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &DatasetFilter) {
    builder.push(" WHERE TRUE");
    if let Some(taxon_id) = filter.organism_taxon_id {
        builder.push(" AND organism_taxon_id = ").push_bind(taxon_id);
    }
    if let Some(organelle_id) = filter.organelle_id {
        builder.push(" AND organelle_id = ").push_bind(organelle_id);
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(q) = filter.filename_contains.as_deref().filter(|q| !q.is_empty()) {
        builder
            .push(" AND filename ILIKE ")
            .push_bind(format!("%{}%", escape_like(q)));
    }
}

#[async_trait]
impl OrganismRepository for PgStore {
    async fn find_organism(&self, taxon_id: i32) -> StoreResult<Option<Organism>> {
        let row = sqlx::query_as::<_, OrganismRow>(
            "SELECT taxon_id, scientific_name, common_name, created_at \
             FROM organisms WHERE taxon_id = $1",
        )
        .bind(taxon_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Organism::from))
    }

    async fn insert_organism_if_absent(&self, organism: &NewOrganism) -> StoreResult<Organism> {
        sqlx::query(
            "INSERT INTO organisms (taxon_id, scientific_name, common_name) \
             VALUES ($1, $2, $3) ON CONFLICT (taxon_id) DO NOTHING",
        )
        .bind(organism.taxon_id)
        .bind(&organism.scientific_name)
        .bind(&organism.common_name)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("Organism {}", organism.taxon_id)))?;

        self.find_organism(organism.taxon_id).await?.ok_or_else(|| {
            StoreError::NotFound(format!("Organism {} not found", organism.taxon_id))
        })
    }

    async fn update_organism_names(&self, organism: &NewOrganism) -> StoreResult<Organism> {
        let row = sqlx::query_as::<_, OrganismRow>(
            "UPDATE organisms SET scientific_name = $2, common_name = $3 \
             WHERE taxon_id = $1 \
             RETURNING taxon_id, scientific_name, common_name, created_at",
        )
        .bind(organism.taxon_id)
        .bind(&organism.scientific_name)
        .bind(&organism.common_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Organism::from).ok_or_else(|| {
            StoreError::NotFound(format!("Organism {} not found", organism.taxon_id))
        })
    }

    async fn list_organisms(&self) -> StoreResult<Vec<Organism>> {
        let rows = sqlx::query_as::<_, OrganismRow>(
            "SELECT taxon_id, scientific_name, common_name, created_at \
             FROM organisms ORDER BY scientific_name, taxon_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Organism::from).collect())
    }
}

#[async_trait]
impl OrganelleRepository for PgStore {
    async fn find_organelle(&self, id: Uuid) -> StoreResult<Option<Organelle>> {
        let row = sqlx::query_as::<_, OrganelleRow>(
            "SELECT id, name, created_at FROM organelles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Organelle::from))
    }

    async fn find_organelle_by_name(
        &self,
        name: &str,
        case_insensitive: bool,
    ) -> StoreResult<Option<Organelle>> {
        let sql = if case_insensitive {
            "SELECT id, name, created_at FROM organelles \
             WHERE LOWER(name) = LOWER($1) ORDER BY created_at LIMIT 1"
        } else {
            "SELECT id, name, created_at FROM organelles WHERE name = $1"
        };

        let row = sqlx::query_as::<_, OrganelleRow>(sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Organelle::from))
    }

    async fn insert_organelle_if_absent(&self, name: &str) -> StoreResult<Organelle> {
        sqlx::query(
            "INSERT INTO organelles (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("Organelle '{}'", name)))?;

        self.find_organelle_by_name(name, false)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Organelle '{}' not found", name)))
    }

    async fn list_organelles(&self) -> StoreResult<Vec<Organelle>> {
        let rows = sqlx::query_as::<_, OrganelleRow>(
            "SELECT id, name, created_at FROM organelles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Organelle::from).collect())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, first_name, last_name, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user_if_absent(&self, user: &NewUser) -> StoreResult<User> {
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("User '{}'", user.email)))?;

        self.find_user_by_email(&user.email)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User '{}' not found", user.email)))
    }
}

#[async_trait]
impl ProteinRepository for PgStore {
    async fn existing_protein_accessions(&self, accessions: &[String]) -> StoreResult<Vec<String>> {
        if accessions.is_empty() {
            return Ok(Vec::new());
        }

        let found = sqlx::query_scalar::<_, String>(
            "SELECT accession FROM proteins WHERE accession = ANY($1) AND NOT is_placeholder",
        )
        .bind(accessions)
        .fetch_all(&self.pool)
        .await?;

        Ok(found)
    }

    async fn upsert_protein(&self, protein: &Protein) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO proteins (accession, taxon_id, source_taxon_id, gene_name, protein_name, \
                 sequence, sequence_length, go_terms, subcellular_locations, string_refs, \
                 is_placeholder, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (accession) DO UPDATE SET \
                 taxon_id = EXCLUDED.taxon_id, \
                 source_taxon_id = EXCLUDED.source_taxon_id, \
                 gene_name = EXCLUDED.gene_name, \
                 protein_name = EXCLUDED.protein_name, \
                 sequence = EXCLUDED.sequence, \
                 sequence_length = EXCLUDED.sequence_length, \
                 go_terms = EXCLUDED.go_terms, \
                 subcellular_locations = EXCLUDED.subcellular_locations, \
                 string_refs = EXCLUDED.string_refs, \
                 is_placeholder = EXCLUDED.is_placeholder, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&protein.accession)
        .bind(protein.taxon_id)
        .bind(protein.source_taxon_id)
        .bind(&protein.gene_name)
        .bind(&protein.protein_name)
        .bind(&protein.sequence)
        .bind(protein.sequence_length)
        .bind(Json(&protein.go_terms))
        .bind(Json(&protein.subcellular_locations))
        .bind(&protein.string_refs)
        .bind(protein.is_placeholder)
        .bind(protein.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("Protein '{}'", protein.accession)))?;

        Ok(())
    }

    async fn insert_protein_placeholder(&self, protein: &Protein) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO proteins (accession, taxon_id, is_placeholder, updated_at) \
             VALUES ($1, $2, TRUE, $3) ON CONFLICT (accession) DO NOTHING",
        )
        .bind(&protein.accession)
        .bind(protein.taxon_id)
        .bind(protein.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, || format!("Protein '{}'", protein.accession)))?;

        Ok(())
    }

    async fn find_protein(&self, accession: &str) -> StoreResult<Option<Protein>> {
        let sql = format!("SELECT {} FROM proteins WHERE accession = $1", PROTEIN_COLUMNS);
        let row = sqlx::query_as::<_, ProteinRow>(&sql)
            .bind(accession)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Protein::from))
    }

    async fn list_proteins(
        &self,
        taxon_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Protein>> {
        let sql = format!(
            "SELECT {} FROM proteins WHERE ($1::INTEGER IS NULL OR taxon_id = $1) \
             ORDER BY accession LIMIT $2 OFFSET $3",
            PROTEIN_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProteinRow>(&sql)
            .bind(taxon_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM proteins WHERE ($1::INTEGER IS NULL OR taxon_id = $1)",
        )
        .bind(taxon_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page {
            items: rows.into_iter().map(Protein::from).collect(),
            total,
        })
    }
}

#[async_trait]
impl DatasetRepository for PgStore {
    async fn create_dataset(&self, dataset: &NewDataset) -> StoreResult<Dataset> {
        let sql = format!(
            "INSERT INTO datasets (id, user_id, organism_taxon_id, organelle_id, filename, \
                 file_sha256, experiment, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            DATASET_COLUMNS
        );
        let row = sqlx::query_as::<_, DatasetRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(dataset.user_id)
            .bind(dataset.organism_taxon_id)
            .bind(dataset.organelle_id)
            .bind(&dataset.filename)
            .bind(&dataset.file_sha256)
            .bind(&dataset.experiment)
            .bind(&dataset.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, || format!("Dataset '{}'", dataset.filename)))?;

        let created = Dataset::try_from(row)?;
        info!(dataset_id = %created.id, filename = %created.filename, "Created dataset");
        Ok(created)
    }

    async fn find_dataset(&self, id: Uuid) -> StoreResult<Option<Dataset>> {
        let sql = format!("SELECT {} FROM datasets WHERE id = $1", DATASET_COLUMNS);
        sqlx::query_as::<_, DatasetRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Dataset::try_from)
            .transpose()
    }

    async fn find_dataset_by_filename(
        &self,
        user_id: Uuid,
        filename: &str,
    ) -> StoreResult<Option<Dataset>> {
        let sql = format!(
            "SELECT {} FROM datasets WHERE user_id = $1 AND filename = $2",
            DATASET_COLUMNS
        );
        sqlx::query_as::<_, DatasetRow>(&sql)
            .bind(user_id)
            .bind(filename)
            .fetch_optional(&self.pool)
            .await?
            .map(Dataset::try_from)
            .transpose()
    }

    async fn list_datasets(
        &self,
        filter: &DatasetFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Dataset>> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM datasets", DATASET_COLUMNS));
        push_dataset_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<DatasetRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM datasets");
        push_dataset_filter(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Dataset::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page { items, total })
    }

    async fn update_dataset_status(&self, id: Uuid, status: DatasetStatus) -> StoreResult<Dataset> {
        let sql = format!(
            "UPDATE datasets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            DATASET_COLUMNS
        );
        sqlx::query_as::<_, DatasetRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Dataset {} not found", id)))
            .and_then(Dataset::try_from)
    }

    async fn update_dataset_details(
        &self,
        id: Uuid,
        experiment: Option<&str>,
        description: Option<&str>,
    ) -> StoreResult<Dataset> {
        let sql = format!(
            "UPDATE datasets SET experiment = COALESCE($2, experiment), \
                 description = COALESCE($3, description), updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            DATASET_COLUMNS
        );
        sqlx::query_as::<_, DatasetRow>(&sql)
            .bind(id)
            .bind(experiment)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Dataset {} not found", id)))
            .and_then(Dataset::try_from)
    }

    async fn delete_dataset(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CrosslinkRepository for PgStore {
    #[tracing::instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn append_crosslinks(
        &self,
        dataset_id: Uuid,
        rows: &[NormalizedCrosslink],
        chunk_size: usize,
    ) -> StoreResult<AppendOutcome> {
        let chunk_size = chunk_size.clamp(1, MAX_CROSSLINKS_PER_STATEMENT);
        let mut tx = self.pool.begin().await?;

        // Appends to one dataset are serialized on this lock.
        let lock_sql = format!("SELECT {} FROM datasets WHERE id = $1 FOR UPDATE", DATASET_COLUMNS);
        let current = sqlx::query_as::<_, DatasetRow>(&lock_sql)
            .bind(dataset_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Dataset {} not found", dataset_id)))
            .and_then(Dataset::try_from)?;

        let mut inserted: u64 = 0;
        for (index, chunk) in rows.chunks(chunk_size).enumerate() {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO crosslinks (dataset_id, protein1_accession, protein2_accession, \
                 pos1, pos2, score) ",
            );
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(dataset_id)
                    .push_bind(&row.protein1_accession)
                    .push_bind(&row.protein2_accession)
                    .push_bind(row.pos1)
                    .push_bind(row.pos2)
                    .push_bind(row.score);
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| write_error(e, || format!("Crosslink in dataset {}", dataset_id)))?;

            inserted += result.rows_affected();
            debug!(chunk = index, inserted, "Inserted crosslink chunk");
        }

        let status = if inserted > 0 {
            current.status.after_rows_committed()
        } else {
            current.status
        };
        let update_sql = format!(
            "UPDATE datasets SET row_count = row_count + $2, status = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            DATASET_COLUMNS
        );
        let updated = sqlx::query_as::<_, DatasetRow>(&update_sql)
            .bind(dataset_id)
            .bind(i64::try_from(inserted).unwrap_or(i64::MAX))
            .bind(status.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let dataset = Dataset::try_from(updated)?;

        tx.commit().await?;

        info!(
            dataset_id = %dataset_id,
            inserted,
            row_count = dataset.row_count,
            status = %dataset.status,
            "Committed crosslinks"
        );

        Ok(AppendOutcome { dataset, inserted })
    }

    async fn list_crosslinks(
        &self,
        dataset_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Crosslink>> {
        let rows = sqlx::query_as::<_, CrosslinkRow>(
            "SELECT id, dataset_id, protein1_accession, protein2_accession, pos1, pos2, score \
             FROM crosslinks WHERE dataset_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(dataset_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM crosslinks WHERE dataset_id = $1")
            .bind(dataset_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page {
            items: rows.into_iter().map(Crosslink::from).collect(),
            total,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
