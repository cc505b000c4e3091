//! Domain models shared by storage, features and the ingestion pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A taxon known to the atlas, keyed by its NCBI taxonomy id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub taxon_id: i32,
    pub scientific_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrganism {
    pub taxon_id: i32,
    pub scientific_name: String,
    pub common_name: Option<String>,
}

/// A subcellular compartment used to scope datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organelle {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Gene Ontology aspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoAspect {
    /// Cellular component
    #[serde(rename = "C")]
    Component,
    /// Molecular function
    #[serde(rename = "F")]
    Function,
    /// Biological process
    #[serde(rename = "P")]
    Process,
}

impl GoAspect {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'C' => Some(GoAspect::Component),
            'F' => Some(GoAspect::Function),
            'P' => Some(GoAspect::Process),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoTerm {
    /// e.g. `GO:0005739`
    pub id: String,
    pub term: String,
    pub aspect: GoAspect,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Evidence {
    pub evidence_code: Option<String>,
    pub source: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Location,
    Topology,
    Orientation,
    Note,
}

impl LocationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationKind::Location => "location",
            LocationKind::Topology => "topology",
            LocationKind::Orientation => "orientation",
            LocationKind::Note => "note",
        }
    }
}

/// One subcellular-location statement with its merged evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcellularLocation {
    pub kind: LocationKind,
    /// Controlled-vocabulary id such as `SL-0173`; empty for free-text notes.
    pub id: String,
    pub value: String,
    pub evidences: Vec<Evidence>,
}

/// Protein metadata keyed by accession
///
/// Rows created when enrichment fails carry only the accession and taxon and
/// have `is_placeholder` set; a later successful enrichment overwrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protein {
    pub accession: String,
    /// Organism this protein was imported under.
    pub taxon_id: i32,
    /// Organism reported by the sequence database, when it differs or is known.
    pub source_taxon_id: Option<i32>,
    pub gene_name: Option<String>,
    pub protein_name: Option<String>,
    pub sequence: Option<String>,
    pub sequence_length: Option<i32>,
    pub go_terms: Vec<GoTerm>,
    pub subcellular_locations: Vec<SubcellularLocation>,
    /// STRING cross-references joined with `;`.
    pub string_refs: Option<String>,
    pub is_placeholder: bool,
    pub updated_at: DateTime<Utc>,
}

impl Protein {
    pub fn placeholder(accession: impl Into<String>, taxon_id: i32) -> Self {
        Self {
            accession: accession.into(),
            taxon_id,
            source_taxon_id: None,
            gene_name: None,
            protein_name: None,
            sequence: None,
            sequence_length: None,
            go_terms: Vec::new(),
            subcellular_locations: Vec::new(),
            string_refs: None,
            is_placeholder: true,
            updated_at: Utc::now(),
        }
    }
}

/// Dataset lifecycle
///
/// `uploaded → parsed → validated`, with `failed` reachable from anywhere.
/// Status never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Uploaded,
    Parsed,
    Validated,
    Failed,
}

impl DatasetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetStatus::Uploaded => "uploaded",
            DatasetStatus::Parsed => "parsed",
            DatasetStatus::Validated => "validated",
            DatasetStatus::Failed => "failed",
        }
    }

    fn rank(self) -> u8 {
        match self {
            DatasetStatus::Uploaded => 0,
            DatasetStatus::Parsed => 1,
            DatasetStatus::Validated => 2,
            DatasetStatus::Failed => 3,
        }
    }

    /// Whether moving from `self` to `next` is a forward step (or a no-op).
    pub fn can_transition_to(self, next: DatasetStatus) -> bool {
        match (self, next) {
            (current, next) if current == next => true,
            (DatasetStatus::Failed, _) => false,
            (_, DatasetStatus::Failed) => true,
            (current, next) => next.rank() > current.rank(),
        }
    }

    /// Status after rows were committed.
    pub fn after_rows_committed(self) -> DatasetStatus {
        match self {
            DatasetStatus::Uploaded => DatasetStatus::Parsed,
            other => other,
        }
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dataset status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for DatasetStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uploaded" => Ok(DatasetStatus::Uploaded),
            "parsed" => Ok(DatasetStatus::Parsed),
            "validated" => Ok(DatasetStatus::Validated),
            "failed" => Ok(DatasetStatus::Failed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A user-owned collection of crosslinks for one organism/organelle pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organism_taxon_id: i32,
    pub organelle_id: Uuid,
    pub filename: String,
    /// SHA-256 of the file that created the dataset.
    pub file_sha256: Option<String>,
    pub row_count: i64,
    pub status: DatasetStatus,
    pub experiment: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDataset {
    pub user_id: Uuid,
    pub organism_taxon_id: i32,
    pub organelle_id: Uuid,
    pub filename: String,
    pub file_sha256: Option<String>,
    pub experiment: Option<String>,
    pub description: Option<String>,
}

/// Optional filters for dataset listings; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetFilter {
    pub organism_taxon_id: Option<i32>,
    pub organelle_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<DatasetStatus>,
    /// Case-insensitive substring of the filename.
    pub filename_contains: Option<String>,
}

impl DatasetFilter {
    pub fn matches(&self, dataset: &Dataset) -> bool {
        self.organism_taxon_id.map_or(true, |t| dataset.organism_taxon_id == t)
            && self.organelle_id.map_or(true, |o| dataset.organelle_id == o)
            && self.user_id.map_or(true, |u| dataset.user_id == u)
            && self.status.map_or(true, |s| dataset.status == s)
            && self.filename_contains.as_ref().map_or(true, |q| {
                dataset.filename.to_lowercase().contains(&q.to_lowercase())
            })
    }
}

/// A crosslink row ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCrosslink {
    pub protein1_accession: String,
    pub protein2_accession: String,
    pub pos1: i32,
    pub pos2: i32,
    pub score: Option<f64>,
}

impl NormalizedCrosslink {
    /// Identity within a dataset.
    pub fn key(&self) -> (&str, &str, i32, i32) {
        (&self.protein1_accession, &self.protein2_accession, self.pos1, self.pos2)
    }
}

/// A stored crosslink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crosslink {
    pub id: i64,
    pub dataset_id: Uuid,
    pub protein1_accession: String,
    pub protein2_accession: String,
    pub pos1: i32,
    pub pos2: i32,
    pub score: Option<f64>,
}

/// One page of a listing plus the unpaged total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_moves_forward_only() {
        use DatasetStatus::*;
        assert!(Uploaded.can_transition_to(Parsed));
        assert!(Uploaded.can_transition_to(Validated));
        assert!(Parsed.can_transition_to(Parsed));
        assert!(!Validated.can_transition_to(Parsed));
        assert!(!Parsed.can_transition_to(Uploaded));
    }

    #[test]
    fn test_failed_is_reachable_and_terminal() {
        use DatasetStatus::*;
        for status in [Uploaded, Parsed, Validated] {
            assert!(status.can_transition_to(Failed));
            assert!(!Failed.can_transition_to(status));
        }
    }

    #[test]
    fn test_after_rows_committed() {
        assert_eq!(DatasetStatus::Uploaded.after_rows_committed(), DatasetStatus::Parsed);
        assert_eq!(DatasetStatus::Validated.after_rows_committed(), DatasetStatus::Validated);
        assert_eq!(DatasetStatus::Failed.after_rows_committed(), DatasetStatus::Failed);
    }

    #[test]
    fn test_status_round_trips_through_text() {
        assert_eq!("Parsed".parse::<DatasetStatus>(), Ok(DatasetStatus::Parsed));
        assert!("archived".parse::<DatasetStatus>().is_err());
        assert_eq!(serde_json::to_string(&DatasetStatus::Validated).ok().as_deref(), Some("\"validated\""));
    }

    #[test]
    fn test_go_aspect_letters() {
        assert_eq!(GoAspect::from_letter('C'), Some(GoAspect::Component));
        assert_eq!(GoAspect::from_letter('X'), None);
        assert_eq!(serde_json::to_string(&GoAspect::Process).ok().as_deref(), Some("\"P\""));
    }

    #[test]
    fn test_filter_matches_filename_case_insensitively() {
        let dataset = Dataset {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            organism_taxon_id: 9913,
            organelle_id: Uuid::new_v4(),
            filename: "Bos_taurus_Mitochondrion.csv".into(),
            file_sha256: None,
            row_count: 0,
            status: DatasetStatus::Uploaded,
            experiment: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let filter = DatasetFilter {
            filename_contains: Some("MITO".into()),
            organism_taxon_id: Some(9913),
            ..DatasetFilter::default()
        };
        assert!(filter.matches(&dataset));
        assert!(!DatasetFilter { organism_taxon_id: Some(9606), ..filter }.matches(&dataset));
    }
}
