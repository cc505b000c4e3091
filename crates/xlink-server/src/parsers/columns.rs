//! Logical columns of a crosslink table and the header spellings accepted for each
//!
//! Files exported by different search engines name the same column differently
//! (`Protein1`, `uniprot1`, `AbsPos1`, `Position1`, ...). Every accepted spelling
//! lives in [`ALIASES`], in priority order, and headers are resolved through
//! [`resolve`] only.

use serde::Serialize;

/// A column the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Protein1,
    Protein2,
    Pos1,
    Pos2,
    Score,
    Index,
}

/// How a column's raw text is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
}

/// Accepted header spellings per column, matched case-insensitively, highest priority first.
pub const ALIASES: &[(Column, &[&str])] = &[
    (Column::Protein1, &["uniprot1", "protein1"]),
    (Column::Protein2, &["uniprot2", "protein2"]),
    (Column::Pos1, &["abspos1", "pos1", "position1"]),
    (Column::Pos2, &["abspos2", "pos2", "position2"]),
    (Column::Score, &["score"]),
    (Column::Index, &["index"]),
];

/// Columns whose absence from the header is reported.
pub const EXPECTED: [Column; 5] = [
    Column::Protein1,
    Column::Protein2,
    Column::Pos1,
    Column::Pos2,
    Column::Score,
];

impl Column {
    pub fn aliases(self) -> &'static [&'static str] {
        ALIASES
            .iter()
            .find(|(column, _)| *column == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// Canonical header name, used when a column has to be synthesized.
    pub fn label(self) -> &'static str {
        match self {
            Column::Protein1 => "Protein1",
            Column::Protein2 => "Protein2",
            Column::Pos1 => "AbsPos1",
            Column::Pos2 => "AbsPos2",
            Column::Score => "Score",
            Column::Index => "index",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            Column::Protein1 | Column::Protein2 => ValueKind::Text,
            Column::Pos1 | Column::Pos2 | Column::Index => ValueKind::Integer,
            Column::Score => ValueKind::Float,
        }
    }
}

/// Resolve a header to its logical column and the alias priority it matched.
pub fn resolve(header: &str) -> Option<(Column, usize)> {
    let header = header.trim();
    ALIASES.iter().find_map(|(column, aliases)| {
        aliases
            .iter()
            .position(|alias| alias.eq_ignore_ascii_case(header))
            .map(|rank| (*column, rank))
    })
}

/// Coercion for an arbitrary header; unknown headers stay text.
pub fn kind_of(header: &str) -> ValueKind {
    resolve(header).map_or(ValueKind::Text, |(column, _)| column.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve("Protein1"), Some((Column::Protein1, 1)));
        assert_eq!(resolve("UNIPROT1"), Some((Column::Protein1, 0)));
        assert_eq!(resolve(" AbsPos2 "), Some((Column::Pos2, 0)));
        assert_eq!(resolve("Position1"), Some((Column::Pos1, 2)));
        assert_eq!(resolve("score"), Some((Column::Score, 0)));
    }

    #[test]
    fn test_unknown_header_is_text() {
        assert_eq!(resolve("Peptide1"), None);
        assert_eq!(kind_of("Peptide1"), ValueKind::Text);
        assert_eq!(kind_of("index"), ValueKind::Integer);
        assert_eq!(kind_of("Score"), ValueKind::Float);
    }

    #[test]
    fn test_every_column_has_aliases() {
        for column in EXPECTED {
            assert!(!column.aliases().is_empty(), "{column:?} has no aliases");
            assert_eq!(resolve(column.label()).map(|(c, _)| c), Some(column));
        }
    }
}
