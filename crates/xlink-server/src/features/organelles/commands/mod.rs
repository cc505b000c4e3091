pub mod ensure;
pub mod seed;

pub use ensure::{normalize_organelle_name, EnsureOrganelleCommand, EnsureOrganelleError};
pub use seed::ORGANELLE_CATALOG;
