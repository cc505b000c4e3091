//! Crosslink table parser
//!
//! Accepts the loosely formatted CSV exported by crosslink search engines:
//! optional UTF-8 BOM, comma or semicolon separators, stray whitespace, rows
//! whose width disagrees with the header. Parsing never fails; rows that
//! cannot be used are dropped and reported in [`DelimitedTable::dropped`].

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use super::columns::{self, Column, ValueKind};
use super::{CellValue, DropReason, ParsedRow, RowDiagnostic};

const BOM: char = '\u{feff}';

/// Result of parsing one table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DelimitedTable {
    /// Detected separator, `b','` or `b';'`.
    pub delimiter: u8,
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
    /// Expected columns with no matching header.
    pub missing_columns: Vec<Column>,
    pub dropped: Vec<RowDiagnostic>,
}

impl DelimitedTable {
    fn empty(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }
}

/// Semicolon if it occurs strictly more often than comma in `header_line`, comma otherwise.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Parse a crosslink table held in memory.
pub fn parse_delimited(input: &str) -> DelimitedTable {
    let text = input.strip_prefix(BOM).unwrap_or(input).trim();

    let mut lines = text.lines();
    let header_line = lines.next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);
    if lines.next().is_none() {
        return DelimitedTable::empty(delimiter);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(|h| h.trim_start_matches(BOM).trim().to_string()).collect(),
        Err(e) => {
            warn!(error = %e, "Unreadable header line");
            return DelimitedTable::empty(delimiter);
        }
    };
    let kinds: Vec<ValueKind> = headers.iter().map(|h| columns::kind_of(h)).collect();

    let missing_columns: Vec<Column> = columns::EXPECTED
        .into_iter()
        .filter(|column| !headers.iter().any(|h| matches!(columns::resolve(h), Some((c, _)) if c == *column)))
        .collect();
    for column in &missing_columns {
        warn!(column = column.label(), "Expected column missing from header");
    }

    let mut table = DelimitedTable {
        delimiter,
        headers,
        rows: Vec::new(),
        missing_columns,
        dropped: Vec::new(),
    };

    for (index, result) in reader.records().enumerate() {
        // header is line 1; used only when the reader has no position
        let fallback_line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line() as usize);
                warn!(line, error = %e, "Dropping unreadable record");
                table.dropped.push(RowDiagnostic {
                    line,
                    reason: DropReason::Unreadable {
                        message: e.to_string(),
                    },
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line() as usize);

        let mut row = build_row(line, &table.headers, &kinds, &record);

        let protein1 = match row.get(Column::Protein1) {
            Some(value) => value.clone(),
            None => {
                warn!(line, "Dropping row without a first protein accession");
                table.dropped.push(RowDiagnostic {
                    line,
                    reason: DropReason::MissingProtein1,
                });
                continue;
            }
        };

        if row.get(Column::Protein2).is_none() {
            let header = row
                .header_for(Column::Protein2)
                .unwrap_or(Column::Protein2.label())
                .to_string();
            row.cells.insert(header, protein1);
        }

        table.rows.push(row);
    }

    table
}

fn build_row(line: usize, headers: &[String], kinds: &[ValueKind], record: &StringRecord) -> ParsedRow {
    let mut cells = BTreeMap::new();
    for (position, header) in headers.iter().enumerate() {
        let value = match record.get(position) {
            None => CellValue::Missing,
            Some(raw) => coerce(raw.trim(), kinds[position]),
        };
        cells.insert(header.clone(), value);
    }
    ParsedRow { line, cells }
}

fn coerce(raw: &str, kind: ValueKind) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }
    match kind {
        ValueKind::Text => CellValue::Text(raw.to_string()),
        ValueKind::Integer => CellValue::Integer(parse_integer(raw)),
        ValueKind::Float => CellValue::Float(raw.parse::<f64>().ok().filter(|v| v.is_finite())),
    }
}

/// Integers may arrive as `12`, `12.0` or `12.7`; fractional parts are truncated.
pub(crate) fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?.trunc();
    (value >= i64::MIN as f64 && value <= i64::MAX as f64).then_some(value as i64)
}
