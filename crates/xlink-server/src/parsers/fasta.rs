//! UniProt-style FASTA parser
//!
//! Header layout:
//!
//! ```text
//! >sp|P02769|ALBU_BOVIN Albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
//!     |accession|entry name  description  organism  taxon   gene
//! ```
//!
//! Headers that do not follow the layout still produce a record; whatever
//! could not be recognized is left as `None`.

use regex::Regex;
use serde::Serialize;

/// One sequence entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastaRecord {
    /// Header line without the leading `>`.
    pub header: String,
    pub accession: Option<String>,
    pub entry_name: Option<String>,
    pub description: Option<String>,
    pub organism_name: Option<String>,
    pub taxon_id: Option<i32>,
    pub gene_name: Option<String>,
    /// Residues with all whitespace removed.
    pub sequence: String,
}

/// Compiled header patterns; build once and reuse for every file.
pub struct FastaParser {
    description: Regex,
    organism: Regex,
    taxon: Regex,
    gene: Regex,
}

impl FastaParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            description: Regex::new(r"^\S+\s+(.+?)\s+OS=")?,
            organism: Regex::new(r"OS=(.+?)(?:\s+(?:OX|GN|PE|SV)=|$)")?,
            taxon: Regex::new(r"OX=(\d+)")?,
            gene: Regex::new(r"GN=([\w\-]+)")?,
        })
    }

    /// Parse every record in `input`. Sequence lines before the first header are ignored.
    pub fn parse(&self, input: &str) -> Vec<FastaRecord> {
        let mut records = Vec::new();
        let mut current: Option<FastaRecord> = None;

        for line in input.lines() {
            let line = line.trim();
            if let Some(header) = line.strip_prefix('>') {
                records.extend(current.take());
                current = Some(self.parse_header(header));
            } else if let Some(record) = current.as_mut() {
                record
                    .sequence
                    .extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        }
        records.extend(current);

        records
    }

    fn parse_header(&self, header: &str) -> FastaRecord {
        let header = header.trim();
        let mut pipes = header.splitn(3, '|');
        let _database = pipes.next();
        let accession = pipes.next().map(str::trim).filter(|a| !a.is_empty());
        let rest = pipes.next();

        FastaRecord {
            header: header.to_string(),
            accession: accession.filter(|_| rest.is_some()).map(String::from),
            entry_name: rest
                .and_then(|r| r.split_whitespace().next())
                .map(String::from),
            description: rest.and_then(|r| capture(&self.description, r)),
            organism_name: capture(&self.organism, header),
            taxon_id: capture(&self.taxon, header).and_then(|t| t.parse().ok()),
            gene_name: capture(&self.gene, header),
            sequence: String::new(),
        }
    }
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fasta(input: &str) -> Vec<FastaRecord> {
        FastaParser::new().unwrap().parse(input)
    }

    const TWO_RECORDS: &str = "\
>sp|P02769|ALBU_BOVIN Albumin OS=Bos taurus OX=9913 GN=ALB PE=1 SV=4
MKWVTFISLL LLFSSAYS
RGVFRR

>tr|Q3T0P6|Q3T0P6_BOVIN Phosphoglycerate kinase OS=Bos taurus OX=9913 GN=PGK1 PE=2 SV=3
MSLSNKLTLD
KLDVKGKRVV
";

    #[test]
    fn test_two_records_are_isolated() {
        let records = parse_fasta(TWO_RECORDS);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].sequence, "MKWVTFISLLLLFSSAYSRGVFRR");
        assert_eq!(records[1].sequence, "MSLSNKLTLDKLDVKGKRVV");
        for record in &records {
            assert!(!record.sequence.contains(['\n', '\r', ' ']));
        }
    }

    #[test]
    fn test_header_fields() {
        let records = parse_fasta(TWO_RECORDS);
        let albumin = &records[0];
        assert_eq!(albumin.accession.as_deref(), Some("P02769"));
        assert_eq!(albumin.entry_name.as_deref(), Some("ALBU_BOVIN"));
        assert_eq!(albumin.description.as_deref(), Some("Albumin"));
        assert_eq!(albumin.organism_name.as_deref(), Some("Bos taurus"));
        assert_eq!(albumin.taxon_id, Some(9913));
        assert_eq!(albumin.gene_name.as_deref(), Some("ALB"));

        assert_eq!(records[1].description.as_deref(), Some("Phosphoglycerate kinase"));
        assert_eq!(records[1].gene_name.as_deref(), Some("PGK1"));
    }

    #[test]
    fn test_organism_runs_to_end_of_line() {
        let records = parse_fasta(">sp|P1|X_Y Thing OS=Homo sapiens\nAC\n");
        assert_eq!(records[0].organism_name.as_deref(), Some("Homo sapiens"));
        assert_eq!(records[0].taxon_id, None);
        assert_eq!(records[0].gene_name, None);
    }

    #[test]
    fn test_malformed_header_degrades_to_none() {
        let records = parse_fasta("ACGT\n>just some text\nAC GT\n\t\n>\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].accession, None);
        assert_eq!(records[0].description, None);
        assert_eq!(records[0].organism_name, None);
        assert_eq!(records[0].sequence, "ACGT");
        assert_eq!(records[1].header, "");
        assert!(records[1].sequence.is_empty());
    }

    #[test]
    fn test_hyphenated_gene_name() {
        let records = parse_fasta(">sp|P3|Z_Z Thing OS=Mus musculus OX=10090 GN=H2-K1 PE=1\nM\n");
        assert_eq!(records[0].gene_name.as_deref(), Some("H2-K1"));
        assert_eq!(records[0].taxon_id, Some(10090));
    }
}
