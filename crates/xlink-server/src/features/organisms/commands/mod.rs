pub mod ensure;

pub use ensure::{EnsureOrganismCommand, EnsureOrganismError};
