//! `Organism_Organelle.csv` file naming convention

use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::features::organelles::commands::seed::ORGANELLE_CATALOG;

/// Labels recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameMetadata {
    pub organism: String,
    pub organelle: String,
}

/// Split a file name into organism and organelle labels.
///
/// Directories and the extension are ignored. The first underscore-separated
/// segment is the organism and the rest (rejoined with `_`) is the organelle,
/// except that a lowercase second segment is read as a species epithet when
/// something follows it: `Bos_taurus_Mitochondrion.csv` gives `Bos_taurus`
/// and `Mitochondrion`. Returns `None` when either label would be empty.
pub fn extract(filename: &str) -> Option<FilenameMetadata> {
    let name = Path::new(filename.trim())
        .file_name()
        .and_then(|n| n.to_str())?;
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => name,
    };

    let segments: Vec<&str> = stem.split('_').collect();
    if segments.len() < 2 {
        return None;
    }

    let binomial = segments.len() >= 3
        && segments[1].chars().next().is_some_and(|c| c.is_lowercase());
    let split_at = if binomial { 2 } else { 1 };

    let organism = segments[..split_at].join("_").trim().to_string();
    let organelle = segments[split_at..].join("_").trim().to_string();
    if organism.is_empty() || organelle.is_empty() {
        return None;
    }

    Some(FilenameMetadata { organism, organelle })
}

/// Maps common spellings of a compartment to catalog names.
pub struct OrganelleNames {
    patterns: Vec<(Regex, &'static str)>,
}

impl OrganelleNames {
    pub fn new() -> Result<Self, regex::Error> {
        // specific patterns before generic ones
        let table: [(&str, &'static str); 11] = [
            (r"cilia|cilium|ciliary|flagell", "Cilia and flagella"),
            (r"mito(chond(ri(a|on))?)?|(^|[^a-z])mt([^a-z]|$)", "Mitochondrion"),
            (r"chloroplast|plastid", "Chloroplasts"),
            (r"nucleus|nuclear", "Nucleus"),
            (r"peroxi", "Peroxisome"),
            (r"golgi", "Golgi apparatus"),
            (r"lysos", "Lysosome"),
            (r"\b(er|endoplasmic)\b", "Endoplasmic reticulum"),
            (r"vacuol", "Vacuole"),
            (r"cytosol|cytoplasm", "Cytoplasm"),
            (r"whole[-_\s]?cell|all[-_\s]?cell|cell[-_\s]?wide|lysate|total[-_\s]?cell", "Whole cell"),
        ];

        let patterns = table
            .into_iter()
            .map(|(pattern, name)| Ok((Regex::new(pattern)?, name)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { patterns })
    }

    /// Catalog name for `label`, or `None` when nothing matches.
    ///
    /// A label spelling out a catalog entry wins over the spelling patterns,
    /// so `Plastids` stays `Plastids` while `plastid_fraction` is read as
    /// `Chloroplasts`.
    pub fn canonical(&self, label: &str) -> Option<&'static str> {
        let label = label.trim().to_lowercase().replace('_', " ");
        if let Some(name) = ORGANELLE_CATALOG
            .iter()
            .find(|name| name.eq_ignore_ascii_case(&label))
        {
            return Some(*name);
        }
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(&label))
            .map(|(_, name)| *name)
    }

    /// Catalog name when recognized, otherwise the label as typed.
    pub fn resolve(&self, label: &str) -> String {
        self.canonical(label)
            .map(String::from)
            .unwrap_or_else(|| label.trim().to_string())
    }
}
