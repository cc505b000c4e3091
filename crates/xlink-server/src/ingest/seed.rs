//! Directory import under the service account
//!
//! Every `*.csv` file in the directory becomes one dataset owned by the
//! service account. Files already imported with the same content are skipped;
//! a failing file is recorded and the next one is tried. Empty or failed
//! datasets left by an earlier run are removed and the file is imported again.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

use xlink_common::checksum::sha256_hex;

use super::pipeline::{CrosslinkImporter, ImportRequest, IngestResult};
use crate::db::{DatasetRepository, Store};
use crate::features::users::commands::ensure::{self as ensure_user, EnsureUserCommand};
use crate::models::{Dataset, DatasetStatus};

#[derive(Debug, Clone, Serialize)]
pub struct SeededFile {
    pub filename: String,
    pub dataset_id: Uuid,
    pub organism_taxon_id: i32,
    pub rows: u64,
    pub placeholders: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedFailure {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub imported: Vec<SeededFile>,
    /// Files whose dataset already exists with identical content.
    pub skipped: Vec<String>,
    pub failed: Vec<SeedFailure>,
}

/// A dataset an import created but never filled.
fn is_leftover(dataset: &Dataset) -> bool {
    dataset.row_count == 0 || dataset.status == DatasetStatus::Failed
}

async fn csv_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Import every CSV file of `dir`.
#[tracing::instrument(skip(store, importer))]
pub async fn seed_directory(
    store: &dyn Store,
    importer: &CrosslinkImporter,
    dir: &Path,
    service_account_email: &str,
) -> IngestResult<SeedReport> {
    let user = ensure_user::handle(store, EnsureUserCommand::service_account(service_account_email)).await?;

    let files = csv_files(dir).await?;
    info!(files = files.len(), dir = %dir.display(), "Seeding crosslink datasets");

    let mut report = SeedReport::default();
    for path in files {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };

        let bytes = tokio::fs::read(&path).await?;
        let file_sha256 = sha256_hex(&bytes);

        if let Some(existing) = store.find_dataset_by_filename(user.id, &filename).await? {
            if is_leftover(&existing) {
                warn!(filename = %filename, dataset_id = %existing.id, "Removing dataset of an earlier failed import");
                store.delete_dataset(existing.id).await?;
            } else if existing.file_sha256.as_deref() == Some(file_sha256.as_str()) {
                info!(filename = %filename, dataset_id = %existing.id, "Already imported, skipping");
                report.skipped.push(filename);
                continue;
            }
        }

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => {
                error!(filename = %filename, "File is not valid UTF-8");
                report.failed.push(SeedFailure {
                    filename,
                    error: "File is not valid UTF-8 text".to_string(),
                });
                continue;
            }
        };

        let request = ImportRequest {
            user_id: user.id,
            filename: filename.clone(),
            content,
            file_sha256,
        };
        match importer.import_file(request).await {
            Ok(outcome) => {
                info!(
                    filename = %filename,
                    dataset_id = %outcome.dataset.id,
                    rows = outcome.inserted_crosslinks,
                    "Imported"
                );
                report.imported.push(SeededFile {
                    filename,
                    dataset_id: outcome.dataset.id,
                    organism_taxon_id: outcome.dataset.organism_taxon_id,
                    rows: outcome.inserted_crosslinks,
                    placeholders: outcome.proteins.placeholders,
                });
            }
            Err(e) => {
                error!(filename = %filename, error = %e, "Import failed");
                report.failed.push(SeedFailure {
                    filename,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Seeding finished"
    );
    Ok(report)
}
