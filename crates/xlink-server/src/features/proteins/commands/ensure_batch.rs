//! Make sure every referenced protein has a row
//!
//! Accessions already stored with real data are left alone. Missing ones and
//! placeholders are looked up with at most `concurrency` requests in flight;
//! each answer is written as soon as it arrives. A failed lookup degrades to a
//! placeholder row so crosslinks can still reference the accession.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::api::AppError;
use crate::db::{ProteinRepository, Store, StoreError};
use crate::models::Protein;
use crate::uniprot::ProteinLookup;

#[derive(Debug, Clone)]
pub struct EnsureProteinsCommand {
    pub accessions: Vec<String>,
    /// Organism the proteins are imported under.
    pub taxon_id: i32,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    /// Distinct accessions asked for.
    pub requested: usize,
    pub existing: usize,
    pub enriched: usize,
    pub placeholders: usize,
    /// Accessions whose lookup failed, sorted.
    pub failed_accessions: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnsureProteinsError {
    #[error("Taxon ID must be greater than 0")]
    InvalidTaxonId,
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum Outcome {
    Enriched,
    Placeholder,
}

fn distinct(accessions: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    accessions
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .filter(|a| seen.insert(*a))
        .map(String::from)
        .collect()
}

#[tracing::instrument(skip(store, lookup, command), fields(accessions = command.accessions.len(), taxon_id = command.taxon_id))]
pub async fn handle(
    store: &dyn Store,
    lookup: &dyn ProteinLookup,
    command: EnsureProteinsCommand,
) -> Result<EnrichmentReport, EnsureProteinsError> {
    if command.taxon_id <= 0 {
        return Err(EnsureProteinsError::InvalidTaxonId);
    }

    let requested = distinct(&command.accessions);
    let present: HashSet<String> = store
        .existing_protein_accessions(&requested)
        .await?
        .into_iter()
        .collect();
    let missing: Vec<String> = requested
        .iter()
        .filter(|a| !present.contains(*a))
        .cloned()
        .collect();

    let mut report = EnrichmentReport {
        requested: requested.len(),
        existing: requested.len() - missing.len(),
        ..EnrichmentReport::default()
    };
    if missing.is_empty() {
        debug!("All proteins already present");
        return Ok(report);
    }

    let taxon_id = command.taxon_id;
    let results: Vec<(String, Outcome, Result<(), StoreError>)> = stream::iter(missing)
        .map(|accession| async move {
            match lookup.fetch_protein_record(&accession).await {
                Ok(record) => {
                    let written = store.upsert_protein(&record.into_protein(taxon_id)).await;
                    (accession, Outcome::Enriched, written)
                }
                Err(e) => {
                    warn!(accession = %accession, error = %e, "Lookup failed, storing placeholder");
                    let placeholder = Protein::placeholder(accession.clone(), taxon_id);
                    let written = store.insert_protein_placeholder(&placeholder).await;
                    (accession, Outcome::Placeholder, written)
                }
            }
        })
        .buffer_unordered(command.concurrency.max(1))
        .collect()
        .await;

    let mut first_error = None;
    for (accession, outcome, written) in results {
        if let Err(e) = written {
            warn!(accession = %accession, error = %e, "Failed to store protein");
            first_error.get_or_insert(e);
            continue;
        }
        match outcome {
            Outcome::Enriched => report.enriched += 1,
            Outcome::Placeholder => {
                report.placeholders += 1;
                report.failed_accessions.push(accession);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e.into());
    }
    report.failed_accessions.sort();

    info!(
        requested = report.requested,
        existing = report.existing,
        enriched = report.enriched,
        placeholders = report.placeholders,
        "Proteins ensured"
    );
    Ok(report)
}

impl From<EnsureProteinsError> for AppError {
    fn from(err: EnsureProteinsError) -> Self {
        match err {
            EnsureProteinsError::InvalidTaxonId => AppError::BadRequest(err.to_string()),
            EnsureProteinsError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, OrganismRepository};
    use crate::models::NewOrganism;
    use crate::uniprot::{LookupError, OrganismInfo, ProteinRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Knows every accession except those starting with `X`.
    #[derive(Default)]
    struct FakeLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProteinLookup for FakeLookup {
        async fn fetch_protein_record(&self, accession: &str) -> crate::uniprot::Result<ProteinRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if accession.starts_with('X') {
                return Err(LookupError::NotFound(accession.to_string()));
            }
            Ok(ProteinRecord {
                accession: accession.to_string(),
                taxon_id: Some(9913),
                gene_name: Some(format!("G{accession}")),
                protein_name: None,
                sequence: Some("MKW".into()),
                sequence_length: Some(3),
                go_terms: Vec::new(),
                subcellular_locations: Vec::new(),
                string_refs: None,
            })
        }

        async fn fetch_organism_for_accession(&self, accession: &str) -> crate::uniprot::Result<OrganismInfo> {
            Err(LookupError::NotFound(accession.to_string()))
        }
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_organism_if_absent(&NewOrganism {
                taxon_id: 9913,
                scientific_name: "Bos taurus".into(),
                common_name: None,
            })
            .await
            .unwrap();
        store
    }

    fn command(accessions: &[&str]) -> EnsureProteinsCommand {
        EnsureProteinsCommand {
            accessions: accessions.iter().map(|a| a.to_string()).collect(),
            taxon_id: 9913,
            concurrency: 2,
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_becomes_placeholder() {
        let store = store().await;
        let lookup = FakeLookup::default();

        let report = handle(&store, &lookup, command(&["P1", "X9", "P2", "P1"]))
            .await
            .unwrap();

        assert_eq!(report.requested, 3);
        assert_eq!(report.enriched, 2);
        assert_eq!(report.placeholders, 1);
        assert_eq!(report.failed_accessions, vec!["X9"]);

        let placeholder = store.find_protein("X9").await.unwrap().unwrap();
        assert!(placeholder.is_placeholder);
        let enriched = store.find_protein("P1").await.unwrap().unwrap();
        assert_eq!(enriched.gene_name.as_deref(), Some("GP1"));
    }

    #[tokio::test]
    async fn test_present_proteins_are_not_fetched_again() {
        let store = store().await;
        let lookup = FakeLookup::default();

        handle(&store, &lookup, command(&["P1", "P2"])).await.unwrap();
        let report = handle(&store, &lookup, command(&["P2", "P3"])).await.unwrap();

        assert_eq!(report.existing, 1);
        assert_eq!(report.enriched, 1);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_placeholders_are_looked_up_again() {
        let store = store().await;
        let lookup = FakeLookup::default();
        store
            .insert_protein_placeholder(&Protein::placeholder(String::from("P7"), 9913))
            .await
            .unwrap();

        let report = handle(&store, &lookup, command(&["P7", "X9"])).await.unwrap();
        assert_eq!(report.existing, 0);
        assert_eq!(report.enriched, 1);
        assert_eq!(report.placeholders, 1);
        let enriched = store.find_protein("P7").await.unwrap().unwrap();
        assert!(!enriched.is_placeholder);
        assert_eq!(enriched.gene_name.as_deref(), Some("GP7"));

        // a still unresolvable accession is tried on every run
        let again = handle(&store, &lookup, command(&["P7", "X9"])).await.unwrap();
        assert_eq!(again.existing, 1);
        assert_eq!(again.failed_accessions, vec!["X9"]);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
        assert!(store.find_protein("X9").await.unwrap().unwrap().is_placeholder);
    }

    /// Records how many lookups overlap; accessions starting with `X` fail.
    #[derive(Default)]
    struct SlowLookup {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ProteinLookup for SlowLookup {
        async fn fetch_protein_record(&self, accession: &str) -> crate::uniprot::Result<ProteinRecord> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            FakeLookup::default().fetch_protein_record(accession).await
        }

        async fn fetch_organism_for_accession(&self, accession: &str) -> crate::uniprot::Result<OrganismInfo> {
            Err(LookupError::NotFound(accession.to_string()))
        }
    }

    #[tokio::test]
    async fn test_lookups_stay_within_concurrency() {
        let store = store().await;
        let lookup = SlowLookup::default();
        let accessions: Vec<String> = (0..12)
            .map(|i| if i % 4 == 0 { format!("X{i}") } else { format!("P{i}") })
            .collect();

        let report = handle(
            &store,
            &lookup,
            EnsureProteinsCommand {
                accessions: accessions.clone(),
                taxon_id: 9913,
                concurrency: 3,
            },
        )
        .await
        .unwrap();

        let peak = lookup.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak of {peak} concurrent lookups");
        assert!(peak > 1);
        assert_eq!(report.requested, 12);
        assert_eq!(report.enriched, 9);
        assert_eq!(report.placeholders, 3);
        assert_eq!(report.failed_accessions, vec!["X0", "X4", "X8"]);
        for accession in &accessions {
            let protein = store.find_protein(accession).await.unwrap().unwrap();
            assert_eq!(protein.is_placeholder, accession.starts_with('X'));
        }
    }

    #[tokio::test]
    async fn test_unknown_organism_is_a_store_error() {
        let store = MemoryStore::new();
        let result = handle(&store, &FakeLookup::default(), command(&["P1"])).await;
        assert!(matches!(
            result,
            Err(EnsureProteinsError::Store(StoreError::ForeignKeyViolation(_)))
        ));
    }
}
