//! Pure extraction of atlas fields from a decoded UniProtKB entry

use std::collections::HashSet;

use super::models::{CrossReference, EntryEvidence, TextValue, UniProtEntry};
use super::{OrganismInfo, ProteinRecord};
use crate::models::{Evidence, GoAspect, GoTerm, LocationKind, SubcellularLocation};

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Recommended name, else the first submitted name, else the entry name.
pub fn protein_name(entry: &UniProtEntry) -> Option<String> {
    let description = entry.protein_description.as_ref();
    let recommended = description
        .and_then(|d| d.recommended_name.as_ref())
        .and_then(|n| n.full_name.as_ref())
        .and_then(|t| non_empty(t.value.as_deref()));
    let submitted = || {
        description
            .and_then(|d| d.submission_names.first())
            .and_then(|n| n.full_name.as_ref())
            .and_then(|t| non_empty(t.value.as_deref()))
    };

    recommended
        .or_else(submitted)
        .or_else(|| non_empty(entry.uni_protkb_id.as_deref()))
}

pub fn gene_name(entry: &UniProtEntry) -> Option<String> {
    entry
        .genes
        .first()
        .and_then(|g| g.gene_name.as_ref())
        .and_then(|t| non_empty(t.value.as_deref()))
}

/// GO cross-references whose `GoTerm` property reads `<aspect>:<term>`.
pub fn go_terms(xrefs: &[CrossReference]) -> Vec<GoTerm> {
    xrefs
        .iter()
        .filter(|x| x.database.as_deref() == Some("GO"))
        .filter_map(|x| {
            let id = non_empty(x.id.as_deref())?;
            let raw = x
                .properties
                .iter()
                .find(|p| p.key.as_deref() == Some("GoTerm"))
                .and_then(|p| p.value.as_deref())?;
            let (letter, term) = raw.split_once(':')?;
            let mut letters = letter.trim().chars();
            let aspect = match (letters.next(), letters.next()) {
                (Some(c), None) => GoAspect::from_letter(c)?,
                _ => return None,
            };
            let term = non_empty(Some(term))?;
            Some(GoTerm { id, term, aspect })
        })
        .collect()
}

/// STRING interaction ids joined with `;`.
pub fn string_refs(xrefs: &[CrossReference]) -> Option<String> {
    let ids: Vec<String> = xrefs
        .iter()
        .filter(|x| x.database.as_deref() == Some("STRING"))
        .filter_map(|x| non_empty(x.id.as_deref()))
        .collect();
    (!ids.is_empty()).then(|| ids.join(";"))
}

fn is_subcellular_comment(comment_type: Option<&str>) -> bool {
    comment_type.is_some_and(|t| {
        t.chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .eq_ignore_ascii_case("SUBCELLULARLOCATION")
    })
}

fn evidences(raw: &[EntryEvidence]) -> Vec<Evidence> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|e| Evidence {
            evidence_code: non_empty(e.evidence_code.as_deref()),
            source: non_empty(e.source.as_deref()),
            id: non_empty(e.id.as_deref()),
        })
        .filter(|e| e.evidence_code.is_some() || e.source.is_some() || e.id.is_some())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

fn location(kind: LocationKind, text: &TextValue) -> Option<SubcellularLocation> {
    Some(SubcellularLocation {
        kind,
        id: non_empty(text.id.as_deref()).unwrap_or_default(),
        value: non_empty(text.value.as_deref())?,
        evidences: evidences(&text.evidences),
    })
}

/// Subcellular-location statements, merged by `(kind, id, value)` ignoring case.
pub fn subcellular_locations(entry: &UniProtEntry) -> Vec<SubcellularLocation> {
    let mut merged: Vec<SubcellularLocation> = Vec::new();

    let statements = entry
        .comments
        .iter()
        .filter(|c| is_subcellular_comment(c.comment_type.as_deref()))
        .flat_map(|comment| {
            let blocks = comment.subcellular_locations.iter().flat_map(|block| {
                [
                    (LocationKind::Location, block.location.as_ref()),
                    (LocationKind::Topology, block.topology.as_ref()),
                    (LocationKind::Orientation, block.orientation.as_ref()),
                ]
                .into_iter()
                .filter_map(|(kind, text)| location(kind, text?))
            });
            let notes = comment
                .note
                .iter()
                .flat_map(|n| n.texts.iter())
                .filter_map(|text| {
                    location(LocationKind::Note, text).map(|l| SubcellularLocation {
                        id: String::new(),
                        ..l
                    })
                });
            blocks.chain(notes).collect::<Vec<_>>()
        });

    for statement in statements {
        let key = |l: &SubcellularLocation| {
            format!("{}|{}|{}", l.kind.as_str(), l.id, l.value).to_uppercase()
        };
        let statement_key = key(&statement);
        match merged.iter_mut().find(|existing| key(existing) == statement_key) {
            Some(existing) => {
                for evidence in statement.evidences {
                    if !existing.evidences.contains(&evidence) {
                        existing.evidences.push(evidence);
                    }
                }
            }
            None => merged.push(statement),
        }
    }

    merged
}

/// Everything the atlas stores about a protein.
pub fn protein_record(accession: &str, entry: &UniProtEntry) -> ProteinRecord {
    let sequence = entry
        .sequence
        .as_ref()
        .and_then(|s| non_empty(s.value.as_deref()));
    let sequence_length = entry
        .sequence
        .as_ref()
        .and_then(|s| s.length)
        .and_then(|l| i32::try_from(l).ok())
        .or_else(|| sequence.as_ref().and_then(|s| i32::try_from(s.len()).ok()));

    ProteinRecord {
        accession: accession.to_string(),
        taxon_id: taxon_id(entry),
        gene_name: gene_name(entry),
        protein_name: protein_name(entry),
        sequence,
        sequence_length,
        go_terms: go_terms(&entry.cross_references),
        subcellular_locations: subcellular_locations(entry),
        string_refs: string_refs(&entry.cross_references),
    }
}

pub fn taxon_id(entry: &UniProtEntry) -> Option<i32> {
    entry
        .organism
        .as_ref()
        .and_then(|o| o.taxon_id)
        .and_then(|t| i32::try_from(t).ok())
        .filter(|t| *t > 0)
}

/// Organism of an entry; the scientific name falls back to the taxon id as text.
pub fn organism_info(entry: &UniProtEntry) -> Option<OrganismInfo> {
    let taxon_id = taxon_id(entry)?;
    let organism = entry.organism.as_ref();
    Some(OrganismInfo {
        taxon_id,
        scientific_name: organism
            .and_then(|o| non_empty(o.scientific_name.as_deref()))
            .unwrap_or_else(|| taxon_id.to_string()),
        common_name: organism.and_then(|o| non_empty(o.common_name.as_deref())),
    })
}
