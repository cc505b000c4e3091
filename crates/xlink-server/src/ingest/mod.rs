//! Crosslink ingestion
//!
//! - [`pipeline`]: the two-step upload flow (prepare, then commit) plus the
//!   one-shot import used offline
//! - [`seed`]: bulk import of a directory of `Organism_Organelle.csv` files

pub mod pipeline;
pub mod seed;

pub use pipeline::{
    CommitMode, CommitOutcome, CommitRequest, CrosslinkImporter, ImportRequest, ImporterSettings,
    IngestError, IngestResult, PrepareOutcome, PrepareRequest, UploadAnalysis,
};
pub use seed::{seed_directory, SeedReport};
