//! Organisms: lazily created from sequence-database lookups, keyed by taxon id

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{EnsureOrganismCommand, EnsureOrganismError};
pub use queries::{GetOrganismError, GetOrganismQuery};
pub use routes::organisms_routes;
