//! Subset of the UniProtKB REST entry JSON the atlas reads
//!
//! Every field is optional or defaulted: entries in the knowledgebase vary a
//! lot and a missing block must never fail decoding.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniProtEntry {
    #[serde(default)]
    pub primary_accession: Option<String>,
    /// Entry name, e.g. `ALBU_BOVIN`
    #[serde(default)]
    pub uni_protkb_id: Option<String>,
    #[serde(default)]
    pub organism: Option<EntryOrganism>,
    #[serde(default)]
    pub protein_description: Option<ProteinDescription>,
    #[serde(default)]
    pub genes: Vec<Gene>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, rename = "uniProtKBCrossReferences")]
    pub cross_references: Vec<CrossReference>,
    #[serde(default)]
    pub sequence: Option<EntrySequence>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOrganism {
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub taxon_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinDescription {
    #[serde(default)]
    pub recommended_name: Option<ProteinName>,
    #[serde(default)]
    pub submission_names: Vec<ProteinName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinName {
    #[serde(default)]
    pub full_name: Option<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    #[serde(default)]
    pub gene_name: Option<TextValue>,
}

/// `{ "value": ..., "evidences": [...] }`, the knowledgebase's universal text wrapper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub evidences: Vec<EntryEvidence>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryEvidence {
    #[serde(default)]
    pub evidence_code: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub comment_type: Option<String>,
    #[serde(default)]
    pub subcellular_locations: Vec<SubcellularLocationBlock>,
    #[serde(default)]
    pub note: Option<CommentNote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubcellularLocationBlock {
    #[serde(default)]
    pub location: Option<TextValue>,
    #[serde(default)]
    pub topology: Option<TextValue>,
    #[serde(default)]
    pub orientation: Option<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentNote {
    #[serde(default)]
    pub texts: Vec<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossReference {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Vec<CrossReferenceProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossReferenceProperty {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntrySequence {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub length: Option<i64>,
}
