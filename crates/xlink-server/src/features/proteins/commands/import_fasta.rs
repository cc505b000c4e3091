//! Load proteins from a UniProt-style FASTA archive
//!
//! Each record ensures its organism from `OS=`/`OX=` and then writes the
//! sequence, gene and description. Annotation already stored for the
//! accession (GO terms, locations, STRING references) is kept.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::api::AppError;
use crate::db::{ProteinRepository, Store, StoreError};
use crate::features::organisms::commands::ensure::{self as ensure_organism, EnsureOrganismCommand};
use crate::features::organisms::EnsureOrganismError;
use crate::models::Protein;
use crate::parsers::fasta::{FastaParser, FastaRecord};

#[derive(Debug, Clone)]
pub struct ImportFastaCommand {
    pub content: String,
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub header: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FastaImportReport {
    pub records: usize,
    pub imported: usize,
    pub organisms: BTreeSet<i32>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportFastaError {
    #[error("FASTA input contains no records")]
    Empty,
    #[error(transparent)]
    Organism(#[from] EnsureOrganismError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn skip(record: &FastaRecord, reason: &str) -> SkippedRecord {
    warn!(header = %record.header, reason, "Skipping FASTA record");
    SkippedRecord {
        header: record.header.clone(),
        reason: reason.to_string(),
    }
}

fn merge(existing: Option<Protein>, record: &FastaRecord, accession: &str, taxon_id: i32) -> Protein {
    let mut protein = existing.unwrap_or_else(|| Protein::placeholder(accession, taxon_id));
    let sequence_length = i32::try_from(record.sequence.len()).ok();

    if !record.sequence.is_empty() {
        protein.sequence = Some(record.sequence.clone());
        protein.sequence_length = sequence_length;
    }
    if record.gene_name.is_some() {
        protein.gene_name = record.gene_name.clone();
    }
    if record.description.is_some() {
        protein.protein_name = record.description.clone();
    }
    protein.source_taxon_id = Some(taxon_id);
    protein.is_placeholder = false;
    protein.updated_at = Utc::now();
    protein
}

#[tracing::instrument(skip(store, parser, command), fields(bytes = command.content.len()))]
pub async fn handle(
    store: &dyn Store,
    parser: &FastaParser,
    command: ImportFastaCommand,
) -> Result<FastaImportReport, ImportFastaError> {
    let records = parser.parse(&command.content);
    if records.is_empty() {
        return Err(ImportFastaError::Empty);
    }

    let mut report = FastaImportReport {
        records: records.len(),
        ..FastaImportReport::default()
    };

    for record in &records {
        let Some(accession) = record.accession.as_deref() else {
            report.skipped.push(skip(record, "missing accession"));
            continue;
        };
        let Some(taxon_id) = record.taxon_id.filter(|t| *t > 0) else {
            report.skipped.push(skip(record, "missing OX= taxon id"));
            continue;
        };

        // The organism table is the FK target, so it goes first.
        if !report.organisms.contains(&taxon_id) {
            ensure_organism::handle(
                store,
                EnsureOrganismCommand {
                    taxon_id,
                    scientific_name: record
                        .organism_name
                        .clone()
                        .unwrap_or_else(|| taxon_id.to_string()),
                    common_name: None,
                    refresh_names: false,
                },
            )
            .await?;
            report.organisms.insert(taxon_id);
        }

        let existing = store.find_protein(accession).await?;
        let protein = merge(existing, record, accession, taxon_id);
        store.upsert_protein(&protein).await?;
        report.imported += 1;
    }

    info!(
        records = report.records,
        imported = report.imported,
        skipped = report.skipped.len(),
        "FASTA import finished"
    );
    Ok(report)
}

impl From<ImportFastaError> for AppError {
    fn from(err: ImportFastaError) -> Self {
        match err {
            ImportFastaError::Empty => AppError::BadRequest(err.to_string()),
            ImportFastaError::Organism(e) => e.into(),
            ImportFastaError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, OrganismRepository};
    use crate::models::{GoAspect, GoTerm};

    const ARCHIVE: &str = "\
>sp|P02769|ALBU_BOVIN Albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
MKWVTFISLL
LLFSSAYS
>sp|P68871|HBB_HUMAN Hemoglobin subunit beta OS=Homo sapiens OX=9606 GN=HBB PE=1 SV=2
MVHLTPEEKS
>generic header without fields
ACGT
";

    async fn import(store: &MemoryStore, content: &str) -> Result<FastaImportReport, ImportFastaError> {
        let parser = FastaParser::new().unwrap();
        handle(store, &parser, ImportFastaCommand { content: content.to_string() }).await
    }

    #[tokio::test]
    async fn test_import_creates_organisms_and_proteins() {
        let store = MemoryStore::new();
        let report = import(&store, ARCHIVE).await.unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.organisms.iter().copied().collect::<Vec<_>>(), vec![9606, 9913]);

        let albumin = store.find_protein("P02769").await.unwrap().unwrap();
        assert_eq!(albumin.sequence.as_deref(), Some("MKWVTFISLLLLFSSAYS"));
        assert_eq!(albumin.sequence_length, Some(18));
        assert_eq!(albumin.protein_name.as_deref(), Some("Albumin"));
        assert_eq!(
            store.find_organism(9606).await.unwrap().unwrap().scientific_name,
            "Homo sapiens"
        );
    }

    #[tokio::test]
    async fn test_import_keeps_existing_annotation() {
        let store = MemoryStore::new();
        import(&store, ARCHIVE).await.unwrap();

        let mut annotated = store.find_protein("P02769").await.unwrap().unwrap();
        annotated.go_terms = vec![GoTerm {
            id: "GO:0005615".into(),
            term: "extracellular space".into(),
            aspect: GoAspect::Component,
        }];
        store.upsert_protein(&annotated).await.unwrap();

        import(&store, ">sp|P02769|ALBU_BOVIN Albumin OS=Bos taurus OX=9913\nMKWV\n")
            .await
            .unwrap();

        let reimported = store.find_protein("P02769").await.unwrap().unwrap();
        assert_eq!(reimported.sequence.as_deref(), Some("MKWV"));
        assert_eq!(reimported.go_terms.len(), 1);
        assert_eq!(reimported.gene_name.as_deref(), Some("ALB"));
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(import(&store, "\n\n").await, Err(ImportFastaError::Empty)));
    }
}
