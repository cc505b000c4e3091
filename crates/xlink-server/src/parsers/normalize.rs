//! Row normalization: parsed table rows to storable crosslinks

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::columns::Column;
use super::delimited::parse_integer;
use super::{CellValue, DropReason, ParsedRow, RowDiagnostic};
use crate::models::NormalizedCrosslink;

/// Literal placeholders search engines emit instead of an accession.
const PLACEHOLDER_ACCESSIONS: [&str; 5] = ["", "NA", "N/A", "NULL", "-"];

/// Whether `raw` is a placeholder rather than a real accession.
pub fn is_bad_accession(raw: &str) -> bool {
    let value = raw.trim();
    let upper = value.to_ascii_uppercase();
    PLACEHOLDER_ACCESSIONS.contains(&upper.as_str())
        || upper.contains("AMBIGUOUS")
        || (value.starts_with("__") && value.ends_with("__"))
}

/// Trimmed accession, or `None` for placeholders.
pub fn clean_accession(raw: &str) -> Option<String> {
    (!is_bad_accession(raw)).then(|| raw.trim().to_string())
}

/// Normalize one row.
pub fn normalize_row(row: &ParsedRow) -> Result<NormalizedCrosslink, DropReason> {
    let protein1 = row
        .get(Column::Protein1)
        .and_then(CellValue::as_text)
        .and_then(clean_accession)
        .ok_or(DropReason::InvalidProtein1)?;

    let protein2 = row
        .get(Column::Protein2)
        .and_then(CellValue::as_text)
        .and_then(clean_accession)
        .unwrap_or_else(|| protein1.clone());

    let pos1 = position(row, Column::Pos1)?;
    let pos2 = position(row, Column::Pos2)?;

    let score = match row.get(Column::Score) {
        Some(CellValue::Float(value)) => *value,
        Some(CellValue::Integer(value)) => value.map(|v| v as f64),
        Some(CellValue::Text(text)) => text.parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    };

    Ok(NormalizedCrosslink {
        protein1_accession: protein1,
        protein2_accession: protein2,
        pos1,
        pos2,
        score,
    })
}

fn position(row: &ParsedRow, column: Column) -> Result<i32, DropReason> {
    let value = match row.get(column) {
        Some(CellValue::Integer(value)) => *value,
        Some(CellValue::Float(value)) => value.map(|v| v.trunc() as i64),
        Some(CellValue::Text(text)) => parse_integer(text),
        _ => None,
    };
    value
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| DropReason::InvalidPosition {
            column: column.label().to_string(),
        })
}

/// Normalized rows of one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedRows {
    pub rows: Vec<NormalizedCrosslink>,
    pub dropped: Vec<RowDiagnostic>,
    /// Rows identical (same proteins and positions) to an earlier row of the same file.
    pub duplicates: usize,
}

impl NormalizedRows {
    /// Distinct accessions in first-seen order.
    pub fn accessions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .flat_map(|r| [&r.protein1_accession, &r.protein2_accession])
            .filter(|a| seen.insert(a.as_str()))
            .cloned()
            .collect()
    }
}

/// Normalize every row, dropping invalid ones and collapsing in-file duplicates.
pub fn normalize_rows(rows: &[ParsedRow]) -> NormalizedRows {
    let mut out = NormalizedRows::default();
    let mut seen = HashSet::new();

    for row in rows {
        match normalize_row(row) {
            Ok(crosslink) => {
                let key = (
                    crosslink.protein1_accession.clone(),
                    crosslink.protein2_accession.clone(),
                    crosslink.pos1,
                    crosslink.pos2,
                );
                if seen.insert(key) {
                    out.rows.push(crosslink);
                } else {
                    debug!(line = row.line, "Skipping duplicate crosslink");
                    out.duplicates += 1;
                }
            }
            Err(reason) => {
                warn!(line = row.line, %reason, "Dropping row");
                out.dropped.push(RowDiagnostic {
                    line: row.line,
                    reason,
                });
            }
        }
    }

    out
}
