//! Proteins: metadata keyed by accession, filled in from the sequence database
//! or from FASTA archives.

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    EnrichmentReport, EnsureProteinsCommand, EnsureProteinsError, FastaImportReport,
    ImportFastaCommand, ImportFastaError,
};
pub use queries::{GetProteinError, GetProteinQuery, ListProteinsQuery};
pub use routes::proteins_routes;
