//! UniProtKB enrichment
//!
//! [`ProteinLookup`] is the seam the ingestion pipeline talks to;
//! [`UniProtClient`] implements it over the public REST API and tests plug in
//! scripted fakes.

pub mod client;
pub mod extract;
pub mod models;

pub use client::{UniProtClient, DEFAULT_UNIPROT_BASE_URL, DEFAULT_UNIPROT_TIMEOUT_SECS};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::models::{GoTerm, NewOrganism, Protein, SubcellularLocation};

/// Errors for a single accession lookup
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Accession '{0}' not found")]
    NotFound(String),

    #[error("Lookup of '{accession}' returned HTTP {status}")]
    Status { accession: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not decode entry '{accession}': {message}")]
    Decode { accession: String, message: String },

    #[error("Entry '{0}' carries no organism")]
    MissingOrganism(String),

    #[error("Invalid accession '{0}'")]
    InvalidAccession(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;

/// Protein metadata as reported by the sequence database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinRecord {
    pub accession: String,
    /// Taxon of the entry, when it has one.
    pub taxon_id: Option<i32>,
    pub gene_name: Option<String>,
    pub protein_name: Option<String>,
    pub sequence: Option<String>,
    pub sequence_length: Option<i32>,
    pub go_terms: Vec<GoTerm>,
    pub subcellular_locations: Vec<SubcellularLocation>,
    pub string_refs: Option<String>,
}

impl ProteinRecord {
    /// Storable protein imported under `taxon_id`.
    pub fn into_protein(self, taxon_id: i32) -> Protein {
        Protein {
            accession: self.accession,
            taxon_id,
            source_taxon_id: self.taxon_id,
            gene_name: self.gene_name,
            protein_name: self.protein_name,
            sequence: self.sequence,
            sequence_length: self.sequence_length,
            go_terms: self.go_terms,
            subcellular_locations: self.subcellular_locations,
            string_refs: self.string_refs,
            is_placeholder: false,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganismInfo {
    pub taxon_id: i32,
    pub scientific_name: String,
    pub common_name: Option<String>,
}

impl From<OrganismInfo> for NewOrganism {
    fn from(info: OrganismInfo) -> Self {
        NewOrganism {
            taxon_id: info.taxon_id,
            scientific_name: info.scientific_name,
            common_name: info.common_name,
        }
    }
}

/// Source of protein and organism metadata keyed by accession
#[async_trait]
pub trait ProteinLookup: Send + Sync {
    async fn fetch_protein_record(&self, accession: &str) -> Result<ProteinRecord>;

    async fn fetch_organism_for_accession(&self, accession: &str) -> Result<OrganismInfo>;
}

/// Whether `accession` is safe to put in a lookup URL.
pub fn is_valid_accession(accession: &str) -> bool {
    !accession.is_empty()
        && accession
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accession_validation() {
        assert!(is_valid_accession("P02769"));
        assert!(is_valid_accession("P02769-2"));
        assert!(is_valid_accession("A0A024R161.1"));
        assert!(!is_valid_accession(""));
        assert!(!is_valid_accession("P1/../x"));
        assert!(!is_valid_accession("P1 P2"));
    }

    #[test]
    fn test_record_keeps_reported_taxon_separately() {
        let record = ProteinRecord {
            accession: "P1".into(),
            taxon_id: Some(9606),
            gene_name: Some("G".into()),
            protein_name: None,
            sequence: None,
            sequence_length: None,
            go_terms: Vec::new(),
            subcellular_locations: Vec::new(),
            string_refs: None,
        };
        let protein = record.into_protein(9913);
        assert_eq!(protein.taxon_id, 9913);
        assert_eq!(protein.source_taxon_id, Some(9606));
        assert!(!protein.is_placeholder);
    }
}
