//! In-process store with the same constraints as the PostgreSQL schema

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
#[cfg(any(test, feature = "test-support"))]
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    AppendOutcome, CrosslinkRepository, DatasetRepository, OrganelleRepository,
    OrganismRepository, ProteinRepository, Store, StoreError, StoreResult, UserRepository,
};
use crate::models::{
    Crosslink, Dataset, DatasetFilter, DatasetStatus, NewDataset, NewOrganism, NewUser,
    NormalizedCrosslink, Organelle, Organism, Page, Protein, User,
};

type CrosslinkKey = (Uuid, String, String, i32, i32);

#[derive(Default)]
struct Tables {
    organisms: BTreeMap<i32, Organism>,
    organelles: Vec<Organelle>,
    users: Vec<User>,
    proteins: BTreeMap<String, Protein>,
    datasets: Vec<Dataset>,
    crosslinks: Vec<Crosslink>,
    crosslink_keys: HashSet<CrosslinkKey>,
    next_crosslink_id: i64,
}

impl Tables {
    fn dataset_mut(&mut self, id: Uuid) -> StoreResult<&mut Dataset> {
        self.datasets
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Dataset {} not found", id)))
    }
}

/// Store backed by a single mutex; every call sees a consistent snapshot.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// When set, crosslink appends fail just before commit.
    #[cfg(any(test, feature = "test-support"))]
    fail_appends: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent crosslink appends fail just before commit.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub async fn crosslink_count(&self) -> usize {
        self.tables.lock().await.crosslinks.len()
    }
}

fn page<T: Clone>(items: &[T], limit: i64, offset: i64) -> Page<T> {
    let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    Page {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: i64::try_from(items.len()).unwrap_or(i64::MAX),
    }
}

#[async_trait]
impl OrganismRepository for MemoryStore {
    async fn find_organism(&self, taxon_id: i32) -> StoreResult<Option<Organism>> {
        Ok(self.tables.lock().await.organisms.get(&taxon_id).cloned())
    }

    async fn insert_organism_if_absent(&self, organism: &NewOrganism) -> StoreResult<Organism> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .organisms
            .entry(organism.taxon_id)
            .or_insert_with(|| Organism {
                taxon_id: organism.taxon_id,
                scientific_name: organism.scientific_name.clone(),
                common_name: organism.common_name.clone(),
                created_at: Utc::now(),
            });
        Ok(stored.clone())
    }

    async fn update_organism_names(&self, organism: &NewOrganism) -> StoreResult<Organism> {
        let mut tables = self.tables.lock().await;
        let stored = tables.organisms.get_mut(&organism.taxon_id).ok_or_else(|| {
            StoreError::NotFound(format!("Organism {} not found", organism.taxon_id))
        })?;
        stored.scientific_name = organism.scientific_name.clone();
        stored.common_name = organism.common_name.clone();
        Ok(stored.clone())
    }

    async fn list_organisms(&self) -> StoreResult<Vec<Organism>> {
        let tables = self.tables.lock().await;
        let mut organisms: Vec<Organism> = tables.organisms.values().cloned().collect();
        organisms.sort_by(|a, b| {
            a.scientific_name
                .cmp(&b.scientific_name)
                .then(a.taxon_id.cmp(&b.taxon_id))
        });
        Ok(organisms)
    }
}

#[async_trait]
impl OrganelleRepository for MemoryStore {
    async fn find_organelle(&self, id: Uuid) -> StoreResult<Option<Organelle>> {
        let tables = self.tables.lock().await;
        Ok(tables.organelles.iter().find(|o| o.id == id).cloned())
    }

    async fn find_organelle_by_name(
        &self,
        name: &str,
        case_insensitive: bool,
    ) -> StoreResult<Option<Organelle>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .organelles
            .iter()
            .find(|o| {
                if case_insensitive {
                    o.name.to_lowercase() == name.to_lowercase()
                } else {
                    o.name == name
                }
            })
            .cloned())
    }

    async fn insert_organelle_if_absent(&self, name: &str) -> StoreResult<Organelle> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.organelles.iter().find(|o| o.name == name) {
            return Ok(existing.clone());
        }
        let organelle = Organelle {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.organelles.push(organelle.clone());
        Ok(organelle)
    }

    async fn list_organelles(&self) -> StoreResult<Vec<Organelle>> {
        let mut organelles = self.tables.lock().await.organelles.clone();
        organelles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(organelles)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user_if_absent(&self, user: &NewUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.users.iter().find(|u| u.email == user.email) {
            return Ok(existing.clone());
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_hash: None,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ProteinRepository for MemoryStore {
    async fn existing_protein_accessions(&self, accessions: &[String]) -> StoreResult<Vec<String>> {
        let tables = self.tables.lock().await;
        Ok(accessions
            .iter()
            .filter(|a| tables.proteins.get(*a).is_some_and(|p| !p.is_placeholder))
            .cloned()
            .collect())
    }

    async fn upsert_protein(&self, protein: &Protein) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if !tables.organisms.contains_key(&protein.taxon_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "Protein '{}' references a missing record",
                protein.accession
            )));
        }
        tables
            .proteins
            .insert(protein.accession.clone(), protein.clone());
        Ok(())
    }

    async fn insert_protein_placeholder(&self, protein: &Protein) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if !tables.organisms.contains_key(&protein.taxon_id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "Protein '{}' references a missing record",
                protein.accession
            )));
        }
        tables
            .proteins
            .entry(protein.accession.clone())
            .or_insert_with(|| Protein::placeholder(protein.accession.clone(), protein.taxon_id));
        Ok(())
    }

    async fn find_protein(&self, accession: &str) -> StoreResult<Option<Protein>> {
        Ok(self.tables.lock().await.proteins.get(accession).cloned())
    }

    async fn list_proteins(
        &self,
        taxon_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Protein>> {
        let tables = self.tables.lock().await;
        let matching: Vec<Protein> = tables
            .proteins
            .values()
            .filter(|p| taxon_id.map_or(true, |t| p.taxon_id == t))
            .cloned()
            .collect();
        Ok(page(&matching, limit, offset))
    }
}

#[async_trait]
impl DatasetRepository for MemoryStore {
    async fn create_dataset(&self, dataset: &NewDataset) -> StoreResult<Dataset> {
        let mut tables = self.tables.lock().await;

        let references_exist = tables.users.iter().any(|u| u.id == dataset.user_id)
            && tables.organisms.contains_key(&dataset.organism_taxon_id)
            && tables.organelles.iter().any(|o| o.id == dataset.organelle_id);
        if !references_exist {
            return Err(StoreError::ForeignKeyViolation(format!(
                "Dataset '{}' references a missing record",
                dataset.filename
            )));
        }
        if tables
            .datasets
            .iter()
            .any(|d| d.user_id == dataset.user_id && d.filename == dataset.filename)
        {
            return Err(StoreError::UniqueViolation(format!(
                "Dataset '{}' already exists",
                dataset.filename
            )));
        }

        let now = Utc::now();
        let created = Dataset {
            id: Uuid::new_v4(),
            user_id: dataset.user_id,
            organism_taxon_id: dataset.organism_taxon_id,
            organelle_id: dataset.organelle_id,
            filename: dataset.filename.clone(),
            file_sha256: dataset.file_sha256.clone(),
            row_count: 0,
            status: DatasetStatus::Uploaded,
            experiment: dataset.experiment.clone(),
            description: dataset.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.datasets.push(created.clone());
        Ok(created)
    }

    async fn find_dataset(&self, id: Uuid) -> StoreResult<Option<Dataset>> {
        let tables = self.tables.lock().await;
        Ok(tables.datasets.iter().find(|d| d.id == id).cloned())
    }

    async fn find_dataset_by_filename(
        &self,
        user_id: Uuid,
        filename: &str,
    ) -> StoreResult<Option<Dataset>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .datasets
            .iter()
            .find(|d| d.user_id == user_id && d.filename == filename)
            .cloned())
    }

    async fn list_datasets(
        &self,
        filter: &DatasetFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Dataset>> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<Dataset> = tables
            .datasets
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(page(&matching, limit, offset))
    }

    async fn update_dataset_status(&self, id: Uuid, status: DatasetStatus) -> StoreResult<Dataset> {
        let mut tables = self.tables.lock().await;
        let dataset = tables.dataset_mut(id)?;
        dataset.status = status;
        dataset.updated_at = Utc::now();
        Ok(dataset.clone())
    }

    async fn update_dataset_details(
        &self,
        id: Uuid,
        experiment: Option<&str>,
        description: Option<&str>,
    ) -> StoreResult<Dataset> {
        let mut tables = self.tables.lock().await;
        let dataset = tables.dataset_mut(id)?;
        if let Some(experiment) = experiment {
            dataset.experiment = Some(experiment.to_string());
        }
        if let Some(description) = description {
            dataset.description = Some(description.to_string());
        }
        dataset.updated_at = Utc::now();
        Ok(dataset.clone())
    }

    async fn delete_dataset(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.datasets.len();
        tables.datasets.retain(|d| d.id != id);
        if tables.datasets.len() == before {
            return Ok(false);
        }
        tables.crosslinks.retain(|c| c.dataset_id != id);
        tables.crosslink_keys.retain(|k| k.0 != id);
        Ok(true)
    }
}

#[async_trait]
impl CrosslinkRepository for MemoryStore {
    async fn append_crosslinks(
        &self,
        dataset_id: Uuid,
        rows: &[NormalizedCrosslink],
        chunk_size: usize,
    ) -> StoreResult<AppendOutcome> {
        let mut tables = self.tables.lock().await;
        tables.dataset_mut(dataset_id)?;

        // Stage everything first so a failure leaves the tables untouched.
        let mut staged = Vec::with_capacity(rows.len());
        let mut staged_keys = HashSet::with_capacity(rows.len());
        let mut next_id = tables.next_crosslink_id;

        for (index, chunk) in rows.chunks(chunk_size.max(1)).enumerate() {
            tracing::debug!(chunk = index, rows = chunk.len(), "Staging crosslink chunk");
            for row in chunk {
                for accession in [&row.protein1_accession, &row.protein2_accession] {
                    if !tables.proteins.contains_key(accession) {
                        return Err(StoreError::ForeignKeyViolation(format!(
                            "Crosslink in dataset {} references a missing record",
                            dataset_id
                        )));
                    }
                }
                let key = (
                    dataset_id,
                    row.protein1_accession.clone(),
                    row.protein2_accession.clone(),
                    row.pos1,
                    row.pos2,
                );
                if tables.crosslink_keys.contains(&key) || !staged_keys.insert(key) {
                    return Err(StoreError::UniqueViolation(format!(
                        "Crosslink in dataset {} already exists",
                        dataset_id
                    )));
                }
                next_id += 1;
                staged.push(Crosslink {
                    id: next_id,
                    dataset_id,
                    protein1_accession: row.protein1_accession.clone(),
                    protein2_accession: row.protein2_accession.clone(),
                    pos1: row.pos1,
                    pos2: row.pos2,
                    score: row.score,
                });
            }
        }
        #[cfg(any(test, feature = "test-support"))]
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "injected append failure".to_string(),
            )));
        }

        let inserted = staged.len() as u64;
        tables.next_crosslink_id = next_id;
        tables.crosslinks.extend(staged);
        tables.crosslink_keys.extend(staged_keys);

        let dataset = tables.dataset_mut(dataset_id)?;
        dataset.row_count += i64::try_from(inserted).unwrap_or(i64::MAX);
        if inserted > 0 {
            dataset.status = dataset.status.after_rows_committed();
        }
        dataset.updated_at = Utc::now();

        Ok(AppendOutcome {
            dataset: dataset.clone(),
            inserted,
        })
    }

    async fn list_crosslinks(
        &self,
        dataset_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Crosslink>> {
        let tables = self.tables.lock().await;
        let matching: Vec<Crosslink> = tables
            .crosslinks
            .iter()
            .filter(|c| c.dataset_id == dataset_id)
            .cloned()
            .collect();
        Ok(page(&matching, limit, offset))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
