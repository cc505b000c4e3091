//! Parsers for uploaded files
//!
//! Everything in here is a pure function of its input: no I/O, no storage.
//!
//! - [`delimited`]: comma/semicolon crosslink tables
//! - [`normalize`]: turns parsed rows into [`NormalizedCrosslink`](crate::models::NormalizedCrosslink)s
//! - [`fasta`]: UniProt-style sequence archives
//! - [`filename`]: `Organism_Organelle.csv` naming convention

pub mod columns;
pub mod delimited;
pub mod fasta;
pub mod filename;
pub mod normalize;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use columns::Column;

/// A single cell after coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// The row had fewer fields than the header.
    Missing,
    /// The field was present but empty after trimming.
    Empty,
    Text(String),
    /// `None` when the text was not a number.
    Integer(Option<i64>),
    /// `None` when the text was not a finite number.
    Float(Option<f64>),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Missing | CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One data row keyed by (trimmed) header name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub cells: BTreeMap<String, CellValue>,
}

impl ParsedRow {
    /// First non-blank value among the headers that spell `column`, by alias priority.
    pub fn get(&self, column: Column) -> Option<&CellValue> {
        let mut candidates: Vec<(usize, &CellValue)> = self
            .cells
            .iter()
            .filter_map(|(header, value)| match columns::resolve(header) {
                Some((c, rank)) if c == column && !value.is_blank() => Some((rank, value)),
                _ => None,
            })
            .collect();
        candidates.sort_by_key(|(rank, _)| *rank);
        candidates.into_iter().next().map(|(_, value)| value)
    }

    /// Header currently holding `column`, if any spelling of it is present.
    fn header_for(&self, column: Column) -> Option<&str> {
        self.cells
            .keys()
            .filter_map(|header| match columns::resolve(header) {
                Some((c, rank)) if c == column => Some((rank, header.as_str())),
                _ => None,
            })
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, header)| header)
    }
}

/// Why a row did not make it into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// The first protein column was missing or empty.
    MissingProtein1,
    /// The first accession was a placeholder such as `NA` or `AMBIGUOUS`.
    InvalidProtein1,
    /// A residue position was absent or not a number.
    InvalidPosition { column: String },
    /// The tokenizer could not read the record.
    Unreadable { message: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingProtein1 => f.write_str("missing first protein accession"),
            DropReason::InvalidProtein1 => f.write_str("invalid first protein accession"),
            DropReason::InvalidPosition { column } => write!(f, "invalid position in {column}"),
            DropReason::Unreadable { message } => write!(f, "unreadable record: {message}"),
        }
    }
}

/// A dropped row and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDiagnostic {
    pub line: usize,
    #[serde(flatten)]
    pub reason: DropReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, CellValue)]) -> ParsedRow {
        ParsedRow {
            line: 2,
            cells: cells
                .iter()
                .map(|(h, v)| (h.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_get_prefers_higher_priority_alias() {
        let row = row(&[
            ("Protein1", CellValue::Text("P2".into())),
            ("uniprot1", CellValue::Text("P1".into())),
        ]);
        assert_eq!(row.get(Column::Protein1), Some(&CellValue::Text("P1".into())));
    }

    #[test]
    fn test_get_skips_blank_alias() {
        let row = row(&[
            ("uniprot1", CellValue::Empty),
            ("Protein1", CellValue::Text("P9".into())),
        ]);
        assert_eq!(row.get(Column::Protein1), Some(&CellValue::Text("P9".into())));
        assert_eq!(row.get(Column::Protein2), None);
    }
}
