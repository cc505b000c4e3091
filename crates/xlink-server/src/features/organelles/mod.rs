//! Organelles: a named catalog of compartments, only listed and ensured by name

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{normalize_organelle_name, EnsureOrganelleCommand, EnsureOrganelleError, ORGANELLE_CATALOG};
pub use routes::organelles_routes;
