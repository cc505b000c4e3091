//! Crosslink import pipeline
//!
//! An upload goes through two steps:
//!
//! 1. [`CrosslinkImporter::prepare`] hashes and stages the file, parses it and
//!    resolves the organism (from the first accession) and organelle (explicit
//!    id or file name). Nothing dataset-related is written yet.
//! 2. [`CrosslinkImporter::commit`] re-reads the staged file, creates or loads
//!    the target dataset, makes sure every referenced protein exists and
//!    appends the crosslinks in one transaction. A dataset created by a
//!    commit that then fails is removed again, so the same file can be
//!    committed once more.
//!
//! [`CrosslinkImporter::import_file`] runs both steps back to back for offline
//! imports where the file name carries all the metadata.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use xlink_common::checksum::{is_sha256_hex, sha256_hex};

use crate::api::AppError;
use crate::config::Config;
use crate::db::{
    CrosslinkRepository, DatasetRepository, OrganelleRepository, OrganismRepository, SharedStore,
    StoreError, DEFAULT_CROSSLINK_CHUNK_SIZE,
};
use crate::features::datasets::commands::create::{self as create_dataset, CreateDatasetCommand};
use crate::features::datasets::CreateDatasetError;
use crate::features::organelles::commands::ensure::{self as ensure_organelle, EnsureOrganelleCommand};
use crate::features::organelles::EnsureOrganelleError;
use crate::features::organisms::commands::ensure::{self as ensure_organism, EnsureOrganismCommand};
use crate::features::organisms::EnsureOrganismError;
use crate::features::proteins::commands::ensure_batch::{self, EnrichmentReport, EnsureProteinsCommand};
use crate::features::proteins::EnsureProteinsError;
use crate::features::users::EnsureUserError;
use crate::models::{Dataset, DatasetFilter, DatasetStatus, Organelle, Organism};
use crate::parsers::columns::Column;
use crate::parsers::delimited::parse_delimited;
use crate::parsers::filename::{self, OrganelleNames};
use crate::parsers::normalize::{normalize_rows, NormalizedRows};
use crate::uniprot::{LookupError, ProteinLookup};

/// Most compatible datasets listed by `prepare`.
const MAX_EXISTING_DATASETS: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("File is empty or has no header line")]
    EmptyFile,

    #[error("No valid crosslinks in file ({dropped} rows dropped)")]
    NoValidRows { dropped: usize },

    #[error("Staged file {0} not found, run prepare again")]
    StagedFileMissing(String),

    #[error("Could not resolve the organism of '{accession}': {reason}")]
    UnresolvedOrganism { accession: String, reason: String },

    #[error("Organism {0} not found")]
    UnknownOrganism(i32),

    #[error("Organelle {0} not found")]
    UnknownOrganelle(Uuid),

    #[error("No organelle given and none found in file name '{0}'")]
    MissingOrganelle(String),

    #[error("Dataset {0} not found")]
    DatasetNotFound(Uuid),

    #[error("Dataset {0} belongs to another user")]
    DatasetForbidden(Uuid),

    #[error("Dataset {dataset_id} is for organism {dataset_taxon_id} / organelle {dataset_organelle_id}, not {taxon_id} / {organelle_id}")]
    DatasetMismatch {
        dataset_id: Uuid,
        dataset_taxon_id: i32,
        dataset_organelle_id: Uuid,
        taxon_id: i32,
        organelle_id: Uuid,
    },

    #[error("Crosslinks already present in dataset {0}")]
    DuplicateCrosslinks(Uuid),

    #[error("Sequence database unavailable: {0}")]
    Upstream(LookupError),

    #[error(transparent)]
    Organism(#[from] EnsureOrganismError),

    #[error(transparent)]
    Organelle(#[from] EnsureOrganelleError),

    #[error(transparent)]
    Dataset(#[from] CreateDatasetError),

    #[error(transparent)]
    Proteins(#[from] EnsureProteinsError),

    #[error(transparent)]
    User(#[from] EnsureUserError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Upload staging failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidInput(_)
            | IngestError::EmptyFile
            | IngestError::NoValidRows { .. }
            | IngestError::StagedFileMissing(_)
            | IngestError::UnresolvedOrganism { .. }
            | IngestError::MissingOrganelle(_)
            | IngestError::DatasetMismatch { .. } => AppError::BadRequest(err.to_string()),
            IngestError::UnknownOrganism(_)
            | IngestError::UnknownOrganelle(_)
            | IngestError::DatasetNotFound(_) => AppError::NotFound(err.to_string()),
            IngestError::DatasetForbidden(_) => AppError::Forbidden(err.to_string()),
            IngestError::DuplicateCrosslinks(_) => AppError::Conflict(err.to_string()),
            IngestError::Upstream(_) => AppError::Upstream(err.to_string()),
            IngestError::Organism(e) => e.into(),
            IngestError::Organelle(e) => e.into(),
            IngestError::Dataset(e) => e.into(),
            IngestError::Proteins(e) => e.into(),
            IngestError::User(e) => e.into(),
            IngestError::Store(e) => e.into(),
            IngestError::Io(e) => AppError::InternalError(e.to_string()),
        }
    }
}

/// Knobs of the importer, usually taken from [`Config`].
#[derive(Debug, Clone)]
pub struct ImporterSettings {
    pub upload_dir: PathBuf,
    pub chunk_size: usize,
    pub concurrency: usize,
    pub organelle_case_insensitive: bool,
}

impl ImporterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_dir: config.ingest.upload_dir.clone(),
            chunk_size: config.ingest.crosslink_chunk_size,
            concurrency: config.uniprot.concurrency,
            organelle_case_insensitive: config.ingest.organelle_case_insensitive,
        }
    }
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(crate::config::DEFAULT_UPLOAD_DIR),
            chunk_size: DEFAULT_CROSSLINK_CHUNK_SIZE,
            concurrency: crate::config::DEFAULT_ENRICHMENT_CONCURRENCY,
            organelle_case_insensitive: false,
        }
    }
}

/// A raw upload awaiting analysis.
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub user_id: Uuid,
    pub filename: String,
    pub content: Vec<u8>,
    pub organelle_id: Option<Uuid>,
}

/// What `prepare` learned about a file.
#[derive(Debug, Clone, Serialize)]
pub struct UploadAnalysis {
    pub filename: String,
    pub file_sha256: String,
    pub organism: Organism,
    pub organelle: Organelle,
    pub delimiter: String,
    pub headers: Vec<String>,
    pub missing_columns: Vec<Column>,
    pub valid_rows: usize,
    pub dropped_rows: usize,
    pub duplicate_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepareOutcome {
    pub analysis: UploadAnalysis,
    /// The caller's datasets with the same organism and organelle, newest first.
    pub existing_datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    Create,
    Append,
}

/// Body of `POST /uploads/commit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    #[serde(skip)]
    pub user_id: Uuid,
    pub file_sha256: String,
    pub filename: String,
    pub organism_taxon_id: i32,
    pub organelle_id: Uuid,
    pub mode: CommitMode,
    /// Required in append mode.
    #[serde(default)]
    pub dataset_id: Option<Uuid>,
    #[serde(default)]
    pub experiment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome {
    pub dataset: Dataset,
    pub inserted_crosslinks: u64,
    pub dropped_rows: usize,
    pub duplicate_rows: usize,
    pub proteins: EnrichmentReport,
}

/// A file whose name carries organism and organelle, imported in one go.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub user_id: Uuid,
    pub filename: String,
    pub content: String,
    pub file_sha256: String,
}

/// Parsed and normalized rows of one file.
struct ParsedFile {
    delimiter: u8,
    headers: Vec<String>,
    missing_columns: Vec<Column>,
    rows: NormalizedRows,
    dropped: usize,
}

fn parse_file(content: &str) -> IngestResult<ParsedFile> {
    let table = parse_delimited(content);
    if table.headers.is_empty() {
        return Err(IngestError::EmptyFile);
    }

    let rows = normalize_rows(&table.rows);
    let dropped = table.dropped.len() + rows.dropped.len();
    if rows.rows.is_empty() {
        return Err(IngestError::NoValidRows { dropped });
    }

    debug!(
        rows = rows.rows.len(),
        dropped,
        duplicates = rows.duplicates,
        "File parsed"
    );
    Ok(ParsedFile {
        delimiter: table.delimiter,
        headers: table.headers,
        missing_columns: table.missing_columns,
        rows,
        dropped,
    })
}

fn organism_lookup_error(accession: &str, err: LookupError) -> IngestError {
    match err {
        LookupError::NotFound(_) | LookupError::MissingOrganism(_) | LookupError::InvalidAccession(_) => {
            IngestError::UnresolvedOrganism {
                accession: accession.to_string(),
                reason: err.to_string(),
            }
        }
        other => IngestError::Upstream(other),
    }
}

/// Location of a staged upload.
pub fn staged_path(upload_dir: &Path, file_sha256: &str) -> PathBuf {
    upload_dir.join(format!("{file_sha256}.csv"))
}

pub struct CrosslinkImporter {
    store: SharedStore,
    lookup: Arc<dyn ProteinLookup>,
    organelle_names: OrganelleNames,
    settings: ImporterSettings,
}

impl CrosslinkImporter {
    pub fn new(
        store: SharedStore,
        lookup: Arc<dyn ProteinLookup>,
        settings: ImporterSettings,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            store,
            lookup,
            organelle_names: OrganelleNames::new()?,
            settings,
        })
    }

    pub fn settings(&self) -> &ImporterSettings {
        &self.settings
    }

    /// Analyse an upload and stage it under its content hash.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, filename = %request.filename, bytes = request.content.len()))]
    pub async fn prepare(&self, request: PrepareRequest) -> IngestResult<PrepareOutcome> {
        let filename = request.filename.trim().to_string();
        if filename.is_empty() {
            return Err(IngestError::InvalidInput("File name is required".to_string()));
        }
        if request.content.is_empty() {
            return Err(IngestError::EmptyFile);
        }

        let text = std::str::from_utf8(&request.content)
            .map_err(|_| IngestError::InvalidInput("File is not valid UTF-8 text".to_string()))?;
        let parsed = parse_file(text)?;

        let file_sha256 = sha256_hex(&request.content);
        self.stage(&file_sha256, &request.content).await?;

        let organism = self.resolve_organism(&parsed.rows).await?;
        let organelle = match request.organelle_id {
            Some(id) => self
                .store
                .find_organelle(id)
                .await?
                .ok_or(IngestError::UnknownOrganelle(id))?,
            None => self.organelle_from_filename(&filename).await?,
        };

        let filter = DatasetFilter {
            organism_taxon_id: Some(organism.taxon_id),
            organelle_id: Some(organelle.id),
            user_id: Some(request.user_id),
            ..DatasetFilter::default()
        };
        let existing = self
            .store
            .list_datasets(&filter, MAX_EXISTING_DATASETS, 0)
            .await?;

        info!(
            sha256 = %file_sha256,
            taxon_id = organism.taxon_id,
            organelle = %organelle.name,
            rows = parsed.rows.rows.len(),
            existing = existing.total,
            "Upload prepared"
        );

        Ok(PrepareOutcome {
            analysis: UploadAnalysis {
                filename,
                file_sha256,
                organism,
                organelle,
                delimiter: char::from(parsed.delimiter).to_string(),
                headers: parsed.headers,
                missing_columns: parsed.missing_columns,
                valid_rows: parsed.rows.rows.len(),
                dropped_rows: parsed.dropped,
                duplicate_rows: parsed.rows.duplicates,
            },
            existing_datasets: existing.items,
        })
    }

    /// Create or extend a dataset from a staged upload.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, mode = ?request.mode, sha256 = %request.file_sha256))]
    pub async fn commit(&self, request: CommitRequest) -> IngestResult<CommitOutcome> {
        let file_sha256 = request.file_sha256.trim().to_ascii_lowercase();
        if !is_sha256_hex(&file_sha256) {
            return Err(IngestError::InvalidInput(
                "file_sha256 must be 64 hexadecimal characters".to_string(),
            ));
        }
        let filename = request.filename.trim().to_string();
        if filename.is_empty() {
            return Err(IngestError::InvalidInput("File name is required".to_string()));
        }

        let content = self.read_staged(&file_sha256).await?;

        let organism = self
            .store
            .find_organism(request.organism_taxon_id)
            .await?
            .ok_or(IngestError::UnknownOrganism(request.organism_taxon_id))?;
        let organelle = self
            .store
            .find_organelle(request.organelle_id)
            .await?
            .ok_or(IngestError::UnknownOrganelle(request.organelle_id))?;

        // validation failures must not leave an empty dataset behind
        let parsed = parse_file(&content)?;

        let (dataset, created) = match request.mode {
            CommitMode::Create => {
                let dataset = create_dataset::handle(
                    self.store.as_ref(),
                    CreateDatasetCommand {
                        user_id: request.user_id,
                        organism_taxon_id: organism.taxon_id,
                        organelle_id: organelle.id,
                        filename,
                        file_sha256: Some(file_sha256),
                        experiment: request.experiment,
                        description: request.description,
                    },
                )
                .await?;
                (dataset, true)
            }
            CommitMode::Append => {
                let dataset_id = request.dataset_id.ok_or_else(|| {
                    IngestError::InvalidInput("dataset_id is required in append mode".to_string())
                })?;
                let dataset = self
                    .append_target(dataset_id, request.user_id, &organism, &organelle)
                    .await?;
                let dataset = if request.experiment.is_some() || request.description.is_some() {
                    self.store
                        .update_dataset_details(
                            dataset.id,
                            request.experiment.as_deref(),
                            request.description.as_deref(),
                        )
                        .await?
                } else {
                    dataset
                };
                (dataset, false)
            }
        };

        let dataset_id = dataset.id;
        match self.persist(dataset, &organism, parsed).await {
            Err(err) if created => Err(self.discard_dataset(dataset_id, err).await),
            result => result,
        }
    }

    /// Prepare and commit a file whose name names its organelle, creating a new dataset.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, filename = %request.filename))]
    pub async fn import_file(&self, request: ImportRequest) -> IngestResult<CommitOutcome> {
        let parsed = parse_file(&request.content)?;
        let organism = self.resolve_organism(&parsed.rows).await?;
        let organelle = self.organelle_from_filename(&request.filename).await?;

        let dataset = create_dataset::handle(
            self.store.as_ref(),
            CreateDatasetCommand {
                user_id: request.user_id,
                organism_taxon_id: organism.taxon_id,
                organelle_id: organelle.id,
                filename: request.filename,
                file_sha256: Some(request.file_sha256),
                experiment: None,
                description: None,
            },
        )
        .await?;

        let dataset_id = dataset.id;
        match self.persist(dataset, &organism, parsed).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(self.discard_dataset(dataset_id, err).await),
        }
    }

    /// Remove a dataset this commit created but could not fill.
    ///
    /// Falls back to marking it `failed` when the delete itself fails. The
    /// original error is returned either way.
    async fn discard_dataset(&self, dataset_id: Uuid, err: IngestError) -> IngestError {
        warn!(dataset_id = %dataset_id, error = %err, "Commit failed, removing new dataset");
        if let Err(delete_err) = self.store.delete_dataset(dataset_id).await {
            error!(dataset_id = %dataset_id, error = %delete_err, "Could not remove dataset");
            if let Err(status_err) = self
                .store
                .update_dataset_status(dataset_id, DatasetStatus::Failed)
                .await
            {
                error!(dataset_id = %dataset_id, error = %status_err, "Could not mark dataset failed");
            }
        }
        err
    }

    async fn append_target(
        &self,
        dataset_id: Uuid,
        user_id: Uuid,
        organism: &Organism,
        organelle: &Organelle,
    ) -> IngestResult<Dataset> {
        let dataset = self
            .store
            .find_dataset(dataset_id)
            .await?
            .ok_or(IngestError::DatasetNotFound(dataset_id))?;

        if dataset.user_id != user_id {
            return Err(IngestError::DatasetForbidden(dataset.id));
        }
        if dataset.organism_taxon_id != organism.taxon_id || dataset.organelle_id != organelle.id {
            return Err(IngestError::DatasetMismatch {
                dataset_id: dataset.id,
                dataset_taxon_id: dataset.organism_taxon_id,
                dataset_organelle_id: dataset.organelle_id,
                taxon_id: organism.taxon_id,
                organelle_id: organelle.id,
            });
        }
        Ok(dataset)
    }

    /// Ensure proteins, then append every row in one transaction.
    async fn persist(
        &self,
        dataset: Dataset,
        organism: &Organism,
        parsed: ParsedFile,
    ) -> IngestResult<CommitOutcome> {
        let proteins = ensure_batch::handle(
            self.store.as_ref(),
            self.lookup.as_ref(),
            EnsureProteinsCommand {
                accessions: parsed.rows.accessions(),
                taxon_id: organism.taxon_id,
                concurrency: self.settings.concurrency,
            },
        )
        .await?;

        let outcome = self
            .store
            .append_crosslinks(dataset.id, &parsed.rows.rows, self.settings.chunk_size)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => IngestError::DuplicateCrosslinks(dataset.id),
                other => IngestError::Store(other),
            })?;

        info!(
            dataset_id = %outcome.dataset.id,
            inserted = outcome.inserted,
            row_count = outcome.dataset.row_count,
            status = %outcome.dataset.status,
            placeholders = proteins.placeholders,
            "Crosslinks committed"
        );

        Ok(CommitOutcome {
            dataset: outcome.dataset,
            inserted_crosslinks: outcome.inserted,
            dropped_rows: parsed.dropped,
            duplicate_rows: parsed.rows.duplicates,
            proteins,
        })
    }

    /// Organism of the first accession in the file.
    async fn resolve_organism(&self, rows: &NormalizedRows) -> IngestResult<Organism> {
        let accession = rows
            .rows
            .first()
            .map(|r| r.protein1_accession.clone())
            .ok_or(IngestError::NoValidRows { dropped: rows.dropped.len() })?;

        let info = self
            .lookup
            .fetch_organism_for_accession(&accession)
            .await
            .map_err(|e| organism_lookup_error(&accession, e))?;

        Ok(ensure_organism::handle(self.store.as_ref(), EnsureOrganismCommand::from(info)).await?)
    }

    async fn organelle_from_filename(&self, filename: &str) -> IngestResult<Organelle> {
        let labels = filename::extract(filename)
            .ok_or_else(|| IngestError::MissingOrganelle(filename.to_string()))?;
        let name = self.organelle_names.resolve(&labels.organelle);

        Ok(ensure_organelle::handle(
            self.store.as_ref(),
            EnsureOrganelleCommand {
                name,
                case_insensitive: self.settings.organelle_case_insensitive,
            },
        )
        .await?)
    }

    async fn stage(&self, file_sha256: &str, content: &[u8]) -> IngestResult<PathBuf> {
        let path = staged_path(&self.settings.upload_dir, file_sha256);
        if tokio::fs::try_exists(&path).await? {
            debug!(path = %path.display(), "Upload already staged");
            return Ok(path);
        }

        tokio::fs::create_dir_all(&self.settings.upload_dir).await?;
        let partial = path.with_extension("csv.part");
        tokio::fs::write(&partial, content).await?;
        tokio::fs::rename(&partial, &path).await?;
        debug!(path = %path.display(), "Upload staged");
        Ok(path)
    }

    async fn read_staged(&self, file_sha256: &str) -> IngestResult<String> {
        let path = staged_path(&self.settings.upload_dir, file_sha256);
        match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map_err(|_| IngestError::InvalidInput("Staged file is not valid UTF-8 text".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Staged upload missing");
                Err(IngestError::StagedFileMissing(file_sha256.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_file_counts_dropped_and_duplicates() {
        let csv = "Protein1,Protein2,AbsPos1,AbsPos2,Score\n\
                   P02769,P02769,12,40,0.9\n\
                   NA,P02769,1,2,\n\
                   P02769,P02769,12,40,0.9\n\
                   ,P68871,3,4,\n";
        let parsed = parse_file(csv).unwrap();
        assert_eq!(parsed.rows.rows.len(), 1);
        assert_eq!(parsed.rows.duplicates, 1);
        assert_eq!(parsed.dropped, 2);
        assert_eq!(parsed.delimiter, b',');
    }

    #[test]
    fn test_parse_file_rejects_empty_and_invalid() {
        assert!(matches!(parse_file(""), Err(IngestError::EmptyFile)));
        assert!(matches!(
            parse_file("Protein1;Protein2;AbsPos1;AbsPos2\nNA;NA;x;y\n"),
            Err(IngestError::NoValidRows { dropped: 1 })
        ));
    }

    #[test]
    fn test_lookup_errors_split_into_client_and_upstream() {
        let missing = organism_lookup_error("P0", LookupError::NotFound("P0".into()));
        assert_eq!(AppError::from(missing).status(), StatusCode::BAD_REQUEST);

        let down = organism_lookup_error(
            "P0",
            LookupError::Status {
                accession: "P0".into(),
                status: 503,
            },
        );
        assert_eq!(AppError::from(down).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::from(IngestError::DatasetForbidden(id)).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::from(IngestError::DatasetNotFound(id)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(IngestError::DuplicateCrosslinks(id)).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(IngestError::Dataset(CreateDatasetError::Conflict("a.csv".into()))).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_staged_path_uses_hash() {
        let path = staged_path(Path::new("/tmp/uploads"), "ab");
        assert_eq!(path, PathBuf::from("/tmp/uploads/ab.csv"));
    }
}
