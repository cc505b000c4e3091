pub mod ensure_batch;
pub mod import_fasta;

pub use ensure_batch::{EnrichmentReport, EnsureProteinsCommand, EnsureProteinsError};
pub use import_fasta::{FastaImportReport, ImportFastaCommand, ImportFastaError};
